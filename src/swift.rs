//! Swift object-store client.
//!
//! Every request carries the session token twice, as `X-Auth-Token` and
//! `X-Storage-Token`. Metadata requests are expected to be quick; uploads get a
//! much longer deadline because a single object can be large.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_LENGTH};
use reqwest::{Body, Client};
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::contract::{ObjectStore, Session};
use crate::error::{Error, Result, TransferError};

/// Timeout for `HEAD` requests.
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for a single object upload.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30 * 60);

pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";
pub const STORAGE_TOKEN_HEADER: &str = "x-storage-token";
pub const DELETE_AFTER_HEADER: &str = "x-delete-after";

/// Object-store client bound to one session token.
pub struct SwiftClient {
    http: Client,
    auth_headers: HeaderMap,
    metadata_timeout: Duration,
    upload_timeout: Duration,
    verbose: bool,
}

impl SwiftClient {
    /// Fails only if the token contains bytes that cannot go in a header.
    pub fn new(http: Client, session: &Session, verbose: bool) -> Result<Self> {
        let token = HeaderValue::from_str(&session.token).map_err(Error::InvalidToken)?;
        let mut auth_headers = HeaderMap::new();
        auth_headers.insert(AUTH_TOKEN_HEADER, token.clone());
        auth_headers.insert(STORAGE_TOKEN_HEADER, token);
        if verbose {
            println!("\nHeaders:\n  X-Auth-Token: ***\n  X-Storage-Token: ***\n");
        }
        Ok(Self {
            http,
            auth_headers,
            metadata_timeout: METADATA_TIMEOUT,
            upload_timeout: UPLOAD_TIMEOUT,
            verbose,
        })
    }

    /// Overrides the `HEAD` and `PUT` deadlines.
    pub fn with_timeouts(mut self, metadata: Duration, upload: Duration) -> Self {
        self.metadata_timeout = metadata;
        self.upload_timeout = upload;
        self
    }
}

/// Headers for an upload, beyond the auth headers.
pub fn upload_headers(content_length: u64, delete_after: Option<u64>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_LENGTH, HeaderValue::from(content_length));
    if let Some(seconds) = delete_after {
        headers.insert(DELETE_AFTER_HEADER, HeaderValue::from(seconds));
    }
    headers
}

#[async_trait]
impl ObjectStore for SwiftClient {
    async fn head(&self, url: &str) -> Result<u16, TransferError> {
        let response = self
            .http
            .head(url)
            .headers(self.auth_headers.clone())
            .timeout(self.metadata_timeout)
            .send()
            .await
            .map_err(|source| TransferError::Request {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        debug!(url, %status, "HEAD");
        if self.verbose {
            println!("  HEAD {url} -> {status}");
        }
        Ok(status.as_u16())
    }

    async fn put_file(
        &self,
        url: &str,
        local_path: &Path,
        delete_after: Option<u64>,
    ) -> Result<(), TransferError> {
        let io_err = |source| TransferError::Io {
            path: local_path.to_path_buf(),
            source,
        };
        let file = tokio::fs::File::open(local_path).await.map_err(io_err)?;
        let length = file.metadata().await.map_err(io_err)?.len();

        let response = self
            .http
            .put(url)
            .headers(self.auth_headers.clone())
            .headers(upload_headers(length, delete_after))
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .timeout(self.upload_timeout)
            .send()
            .await
            .map_err(|source| TransferError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        if self.verbose {
            println!("  PUT {url} -> {status}");
        }
        info!(url, bytes = length, ?delete_after, "Uploaded object");
        Ok(())
    }
}
