// SPDX-License-Identifier: MIT

//! Release feed collaborator (spec §6 "Release feed"): the external HTTP
//! surface the Update Service checks and downloads from. Concrete
//! implementations (reqwest-backed) live in `mcpweaver-adapters`; this
//! trait is the seam spec.md §1 calls out as "marketplace HTTP client"-
//! adjacent but in-scope for the update checker specifically.

use std::pin::Pin;

use async_trait::async_trait;
use mcpweaver_core::AppError;
use tokio::io::AsyncRead;

use crate::models::ReleaseFeedResponse;

/// An open download: declared content length (if the server sent one) plus
/// an async byte reader the Update Service streams in 32 KiB chunks (spec
/// §4.7 "DownloadUpdate").
pub struct Download {
    pub content_length: Option<u64>,
    pub reader: Pin<Box<dyn AsyncRead + Send>>,
}

#[async_trait]
pub trait ReleaseFeedClient: Send + Sync + 'static {
    /// GET the release feed with the configured User-Agent and custom
    /// headers (spec §4.7 "CheckForUpdates").
    async fn fetch_release(
        &self,
        feed_url: &str,
        user_agent: &str,
        headers: &[(String, String)],
    ) -> Result<ReleaseFeedResponse, AppError>;

    /// Fetch the checksum resource as text; the caller extracts the hex
    /// prefix (spec §6 "Checksum resource").
    async fn fetch_checksum(&self, checksum_url: &str) -> Result<String, AppError>;

    /// Open a streaming download of `url`.
    async fn open_download(&self, url: &str) -> Result<Download, AppError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    pub struct FakeReleaseFeedClient {
        pub release: Arc<Mutex<Option<Result<ReleaseFeedResponse, AppError>>>>,
        pub checksum: Arc<Mutex<Option<Result<String, AppError>>>>,
        pub download_bytes: Arc<Mutex<Option<Vec<u8>>>>,
        pub download_error: Arc<Mutex<Option<AppError>>>,
    }

    impl FakeReleaseFeedClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_release(&self, response: Result<ReleaseFeedResponse, AppError>) {
            *self.release.lock() = Some(response);
        }

        pub fn set_checksum(&self, checksum: Result<String, AppError>) {
            *self.checksum.lock() = Some(checksum);
        }

        pub fn set_download_bytes(&self, bytes: Vec<u8>) {
            *self.download_bytes.lock() = Some(bytes);
        }

        pub fn set_download_error(&self, err: AppError) {
            *self.download_error.lock() = Some(err);
        }
    }

    #[async_trait]
    impl ReleaseFeedClient for FakeReleaseFeedClient {
        async fn fetch_release(
            &self,
            _feed_url: &str,
            _user_agent: &str,
            _headers: &[(String, String)],
        ) -> Result<ReleaseFeedResponse, AppError> {
            self.release
                .lock()
                .clone()
                .unwrap_or_else(|| Err(AppError::network("feed.unconfigured", "no fake release configured")))
        }

        async fn fetch_checksum(&self, _checksum_url: &str) -> Result<String, AppError> {
            self.checksum
                .lock()
                .clone()
                .unwrap_or_else(|| Err(AppError::network("feed.unconfigured", "no fake checksum configured")))
        }

        async fn open_download(&self, _url: &str) -> Result<Download, AppError> {
            if let Some(err) = self.download_error.lock().clone() {
                return Err(err);
            }
            let bytes = self.download_bytes.lock().clone().unwrap_or_default();
            let len = bytes.len() as u64;
            Ok(Download { content_length: Some(len), reader: Box::pin(std::io::Cursor::new(bytes)) })
        }
    }
}
