// SPDX-License-Identifier: MIT

//! HTTP `ReleaseFeedClient` (spec §6 "Release feed"): `reqwest` backed GET
//! of the release feed and checksum resource, plus a streaming download
//! open. The feed and checksum responses are parsed into the shapes
//! `mcpweaver-update` already models.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::StreamExt;
use mcpweaver_core::AppError;
use mcpweaver_update::models::ReleaseFeedResponse;
use mcpweaver_update::release_feed::{Download, ReleaseFeedClient};
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

/// `reqwest`-backed release feed client. One `reqwest::Client` is shared
/// across calls so connection pooling and the configured timeout apply
/// uniformly (spec §5 "US network calls are bounded by the configured
/// timeout").
#[derive(Clone)]
pub struct HttpReleaseFeedClient {
    client: reqwest::Client,
}

impl HttpReleaseFeedClient {
    pub fn new(timeout: std::time::Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::configuration("update.http_client_build_failed", format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ReleaseFeedClient for HttpReleaseFeedClient {
    async fn fetch_release(
        &self,
        feed_url: &str,
        user_agent: &str,
        headers: &[(String, String)],
    ) -> Result<ReleaseFeedResponse, AppError> {
        let mut request = self.client.get(feed_url).header(reqwest::header::USER_AGENT, user_agent);
        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::network("update.feed_request_failed", format!("release feed request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::network(
                "update.feed_bad_status",
                format!("release feed returned status {status}"),
            ));
        }

        response
            .json::<ReleaseFeedResponse>()
            .await
            .map_err(|e| AppError::network("update.feed_parse_failed", format!("failed to parse release feed response: {e}")))
    }

    async fn fetch_checksum(&self, checksum_url: &str) -> Result<String, AppError> {
        let response = self
            .client
            .get(checksum_url)
            .send()
            .await
            .map_err(|e| AppError::network("update.checksum_request_failed", format!("checksum request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::network(
                "update.checksum_bad_status",
                format!("checksum endpoint returned status {}", response.status()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::network("update.checksum_read_failed", format!("failed to read checksum response body: {e}")))
    }

    async fn open_download(&self, url: &str) -> Result<Download, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::network("update.download_request_failed", format!("download request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::network(
                "update.download_bad_status",
                format!("download endpoint returned status {}", response.status()),
            ));
        }

        let content_length = response.content_length();
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)));
        let reader: Pin<Box<dyn AsyncRead + Send>> = Box::pin(StreamReader::new(stream));
        Ok(Download { content_length, reader })
    }
}
