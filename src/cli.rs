//! Command-line entry point: argument parsing and orchestration of one run.
//!
//! `run` is kept separate from `main` so integration tests can drive a whole
//! upload in-process. Mapping the outcome to an exit status happens in `main`.
//! [`run_with`] is the part after credential loading, generic over the
//! [`Authenticator`] and [`ObjectStore`] seams.

use anyhow::{bail, Result};
use clap::Parser;
use reqwest::Client;
use std::path::PathBuf;

use crate::config::{Timeouts, UploadJob};
use crate::contract::{Authenticator, ObjectStore, Session};
use crate::error::Error;
use crate::keystone::{KeystoneClient, AUTH_TIMEOUT};
use crate::load_config::{load_credentials, Credentials};
use crate::report::UploadReport;
use crate::swift::SwiftClient;
use crate::synchronise::synchronise;

pub const BANNER: &str = "This script uploads files to an OpenStack object store container";

/// CLI for swift-upload: copy a directory tree into a Swift container.
#[derive(Parser, Debug)]
#[clap(
    name = "swift-upload",
    version,
    about = "Upload a local directory tree to an OpenStack object store container, skipping existing objects"
)]
pub struct Cli {
    /// Source directory to copy from
    #[clap(short, long)]
    pub source: PathBuf,

    /// Destination path to copy to, starting with container name
    #[clap(short, long)]
    pub destination: String,

    /// Days to set TTL/Delete-After, 0 to disable
    #[clap(short, long, default_value_t = 0)]
    pub ttl_days: u64,

    /// Verbose logging output
    #[clap(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn job(&self) -> Result<UploadJob> {
        let job = UploadJob {
            source: self.source.clone(),
            destination: self.destination.clone(),
            ttl_days: self.ttl_days,
            verbose: self.verbose,
        };
        if job.container_name().is_empty() {
            bail!(
                "destination {:?} must start with a container name",
                self.destination
            );
        }
        Ok(job)
    }
}

/// Tracing filter used when `RUST_LOG` is unset.
pub fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "swift_upload=debug"
    } else {
        "swift_upload=info"
    }
}

/// HTTP client shared by the Keystone and Swift clients. Request timeouts are
/// set per call, and nothing is retried.
pub fn http_client() -> Result<Client, Error> {
    Client::builder()
        .connect_timeout(AUTH_TIMEOUT)
        .user_agent(concat!("swift-upload/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(Error::HttpClient)
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<UploadReport> {
    run_with_timeouts(cli, Timeouts::default()).await
}

/// [`run`] with explicit request deadlines.
pub async fn run_with_timeouts(cli: Cli, timeouts: Timeouts) -> Result<UploadReport> {
    println!("{BANNER}\n");
    let job = cli.job()?;

    let credentials = load_credentials()?;
    tracing::debug!(?credentials, ?timeouts, "Credentials loaded");

    let http = http_client()?;
    let keystone = KeystoneClient::new(http.clone(), job.verbose).with_timeout(timeouts.auth);
    run_with(&job, &credentials, &keystone, |session| {
        Ok(SwiftClient::new(http, session, job.verbose)?
            .with_timeouts(timeouts.metadata, timeouts.upload))
    })
    .await
}

/// Logs in, opens the object store for the new session and uploads.
///
/// `open_store` is only called once authentication has succeeded, so a failed
/// login never reaches the object store.
pub async fn run_with<A, S, F>(
    job: &UploadJob,
    credentials: &Credentials,
    authenticator: &A,
    open_store: F,
) -> Result<UploadReport>
where
    A: Authenticator + ?Sized,
    S: ObjectStore,
    F: FnOnce(&Session) -> crate::error::Result<S>,
{
    let session = authenticator.authenticate(credentials).await?;
    let store = open_store(&session)?;

    let report = synchronise(job, &session, &store).await?;
    report.print_summary();
    Ok(report)
}
