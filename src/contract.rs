//! # contract: seams between the pipeline and the network
//!
//! The upload pipeline talks to two remote services, Keystone (identity) and
//! Swift (object storage). Each is reached through a trait defined here so the
//! orchestration in [`crate::synchronise`] can be driven by real HTTP clients in
//! production and by `mockall` mocks in tests.
//!
//! - [`Authenticator`] turns [`Credentials`] into a [`Session`].
//! - [`ObjectStore`] performs the `HEAD`/`PUT` calls against object URLs.
//!
//! Implementations must not retry. A timed-out or refused request is reported
//! as an error and the caller decides whether that is fatal.

use async_trait::async_trait;
use std::fmt;
use std::path::Path;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::{Result, TransferError};
use crate::load_config::Credentials;

/// An authenticated session: the Keystone token and the Swift endpoint it is valid for.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    /// Public object-store URL taken from the service catalog.
    pub object_store_url: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"***")
            .field("object_store_url", &self.object_store_url)
            .finish()
    }
}

/// Trait for obtaining a session from the identity service.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Log in with password credentials and locate the public object-store endpoint.
    async fn authenticate(&self, credentials: &Credentials) -> Result<Session>;
}

/// Trait for the object-store requests made while uploading.
///
/// URLs are absolute; the implementor attaches the auth token.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// `HEAD` a container or object URL and return the HTTP status code.
    ///
    /// Any status is a successful call; only transport failures are errors.
    async fn head(&self, url: &str) -> Result<u16, TransferError>;

    /// `PUT` a local file at `url`.
    ///
    /// `delete_after` is sent as `X-Delete-After` (seconds) when present.
    /// A non-2xx response is an error.
    async fn put_file(
        &self,
        url: &str,
        local_path: &Path,
        delete_after: Option<u64>,
    ) -> Result<(), TransferError>;
}
