use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::keystone::AUTH_TIMEOUT;
use crate::swift::{METADATA_TIMEOUT, UPLOAD_TIMEOUT};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// One upload run: what to copy, where to, and for how long it should live.
#[derive(Debug, Clone)]
pub struct UploadJob {
    /// Local directory to walk.
    pub source: PathBuf,
    /// Remote path, starting with the container name.
    pub destination: String,
    /// Days before Swift deletes the uploaded objects. Zero disables expiry.
    pub ttl_days: u64,
    /// Print raw request/response detail.
    pub verbose: bool,
}

impl UploadJob {
    /// The container is the first segment of the destination path.
    pub fn container_name(&self) -> &str {
        self.destination.split('/').next().unwrap_or_default()
    }

    /// Value for the `X-Delete-After` header, if expiry is enabled.
    pub fn delete_after(&self) -> Option<u64> {
        match self.ttl_days {
            0 => None,
            days => Some(days * SECONDS_PER_DAY),
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            source = %self.source.display(),
            destination = %self.destination,
            container = self.container_name(),
            ttl_days = self.ttl_days,
            "Loaded upload job"
        );
        debug!(?self, "Upload job (full debug)");
    }
}

/// Per-request deadlines. A request that runs past its deadline is abandoned
/// and reported as a transport error; nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Keystone login.
    pub auth: Duration,
    /// `HEAD` on the container and on each object.
    pub metadata: Duration,
    /// `PUT` of a single file.
    pub upload: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            auth: AUTH_TIMEOUT,
            metadata: METADATA_TIMEOUT,
            upload: UPLOAD_TIMEOUT,
        }
    }
}
