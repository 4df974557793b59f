//! Error types for the upload pipeline.
//!
//! Every variant except [`Error::FileTransfer`] is fatal: the run stops and the
//! process exits non-zero. A `FileTransfer` error only fails the file it belongs
//! to; the walk logs it, counts it and moves on.

use std::path::PathBuf;

/// Result type alias for pipeline operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Names of the environment variables that hold the login info, in the order
/// they are reported to the user.
pub const CREDENTIAL_VARS: [&str; 6] = [
    "OS_USER_DOMAIN_NAME",
    "OS_USERNAME",
    "OS_PASSWORD",
    "OS_PROJECT_DOMAIN_NAME",
    "OS_PROJECT_NAME",
    "OS_AUTH_URL",
];

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One or more login variables are unset or blank.
    #[error(
        "These environment variables must be set with login info:\n  {}\n(missing: {})",
        CREDENTIAL_VARS.join(", "),
        .missing.join(", ")
    )]
    MissingCredentials { missing: Vec<&'static str> },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Keystone could not be reached, or the request timed out.
    #[error("Failed to log in to Openstack at {url}: {source}")]
    AuthRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Keystone answered with something other than `201 Created`.
    #[error("Failed to log in to Openstack at {url}: {status}\n{body}")]
    AuthRejected {
        url: String,
        status: String,
        body: String,
    },

    #[error("Failed to find X-Subject-Token in returned headers:\n  {}", .headers.join("\n  "))]
    MissingToken { headers: Vec<String> },

    #[error("session token cannot be sent as a header: {0}")]
    InvalidToken(#[source] reqwest::header::InvalidHeaderValue),

    #[error("Failed to find object-store public endpoint URL in returned JSON:\n{body}")]
    CatalogLookup { body: String },

    #[error("Failed to check container at {url}: {source}")]
    ContainerProbe {
        url: String,
        #[source]
        source: TransferError,
    },

    /// Existence check or upload of a single file failed.
    #[error("{}: {source}", .path.display())]
    FileTransfer {
        path: PathBuf,
        #[source]
        source: TransferError,
    },
}

impl Error {
    /// Whether the run can carry on after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::FileTransfer { .. })
    }
}

/// Failure of a single object-store request.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Transport failure, including hitting the request timeout.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}\n{body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
