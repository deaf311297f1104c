// SPDX-License-Identifier: MIT

//! UI/system bridge (spec §6): the single method NS calls to surface a
//! system notification through the host's native dialog/notification
//! center. The `notify-rust` backed implementation lives in the adapters
//! crate; this crate only defines the seam.

use async_trait::async_trait;
use mcpweaver_core::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogType {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct NativeDialogRequest {
    pub dialog_type: DialogType,
    pub title: String,
    pub message: String,
}

#[async_trait]
pub trait UiBridge: Send + Sync + 'static {
    async fn show_native_dialog(&self, request: NativeDialogRequest) -> Result<(), AppError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    pub struct FakeUiBridge {
        pub calls: Arc<Mutex<Vec<NativeDialogRequest>>>,
    }

    impl FakeUiBridge {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl UiBridge for FakeUiBridge {
        async fn show_native_dialog(&self, request: NativeDialogRequest) -> Result<(), AppError> {
            self.calls.lock().push(request);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeUiBridge;
    use super::*;

    #[tokio::test]
    async fn fake_bridge_records_calls() {
        let bridge = FakeUiBridge::new();
        bridge
            .show_native_dialog(NativeDialogRequest { dialog_type: DialogType::Info, title: "t".to_string(), message: "m".to_string() })
            .await
            .unwrap();
        assert_eq!(bridge.count(), 1);
    }
}
