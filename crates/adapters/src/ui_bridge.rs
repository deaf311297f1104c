// SPDX-License-Identifier: MIT

//! Desktop `UiBridge` (spec §6 "UI/system bridge"): `notify-rust` backed
//! implementation of `ShowNativeDialog`, carried near-verbatim from the
//! teacher's `DesktopNotifyAdapter` including its macOS bundle-id
//! pre-set workaround.

use async_trait::async_trait;
use mcpweaver_core::AppError;
use mcpweaver_notify::{DialogType, NativeDialogRequest, UiBridge};

/// Desktop notification bridge using `notify-rust`.
///
/// On macOS, `notify-rust` uses `mac-notification-sys` (Cocoa bindings) to
/// surface notifications via the Notification Center. The first
/// notification triggers `ensure_application_set()`, which runs an
/// AppleScript to look up a bundle identifier; in a desktop-shell process
/// without Automation permissions that AppleScript can block indefinitely.
/// We pre-set the bundle identifier at construction time to bypass the
/// lookup entirely.
#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopUiBridge;

impl DesktopUiBridge {
    pub fn new() -> Self {
        #[cfg(target_os = "macos")]
        {
            let _ = mac_notification_sys::set_application("com.mcpweaver.desktop");
        }
        Self
    }
}

#[async_trait]
impl UiBridge for DesktopUiBridge {
    async fn show_native_dialog(&self, request: NativeDialogRequest) -> Result<(), AppError> {
        let NativeDialogRequest { dialog_type, title, message } = request;
        // notify_rust::Notification::show() is synchronous on some platforms;
        // run it on tokio's bounded blocking pool so it never stalls the
        // async runtime, then fire-and-forget (spec §6 is a one-way call).
        tokio::task::spawn_blocking(move || {
            tracing::info!(%title, ?dialog_type, "showing native dialog");
            let result = notify_rust::Notification::new().summary(&title).body(&message).show();
            match result {
                Ok(_) => tracing::info!(%title, "native dialog shown"),
                Err(e) => tracing::warn!(%title, error = %e, "native dialog failed"),
            }
        });
        Ok(())
    }
}
