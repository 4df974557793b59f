//! Probe the container, walk the source tree and upload what is missing.
//!
//! The walk is strictly sequential: one `HEAD` and at most one `PUT` in flight
//! at a time. A file whose check or upload fails is counted and reported, and
//! the walk carries on with the next file. Only a failed container probe stops
//! the run.
//!
//! Object URLs are built by plain concatenation,
//! `<object store>/<destination>/<walk dir>/<file name>`, followed by
//! [`collapse_double_slashes`].

use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::config::UploadJob;
use crate::contract::{ObjectStore, Session};
use crate::error::{Error, Result, TransferError};
use crate::report::UploadReport;

const NOT_FOUND: u16 = 404;

/// Replaces each non-overlapping `//` with `/` in everything after the scheme.
///
/// This only tidies the naive concatenation; a run of three slashes becomes two.
pub fn collapse_double_slashes(url: &str) -> String {
    match url.split_once("://") {
        Some((scheme, rest)) => format!("{scheme}://{}", rest.replace("//", "/")),
        None => url.replace("//", "/"),
    }
}

/// Destination URL for `file_name` found in `dir` during the walk.
pub fn object_url(destination_url: &str, dir: &Path, file_name: &str) -> String {
    // Names are not percent-encoded, as with the curl-based uploader this
    // replaces: a `#` or `?` in a path ends the object name at that point.
    let dir = dir.to_string_lossy().replace(MAIN_SEPARATOR, "/");
    collapse_double_slashes(&format!("{destination_url}/{dir}/{file_name}"))
}

/// Runs the upload for `job` against the session's object store.
pub async fn synchronise<S>(job: &UploadJob, session: &Session, store: &S) -> Result<UploadReport>
where
    S: ObjectStore + ?Sized,
{
    job.trace_loaded();
    probe_container(job, session, store).await?;

    let cwd = working_dir(std::env::current_dir());
    let destination_url = format!("{}/{}", session.object_store_url, job.destination);
    let delete_after = job.delete_after();

    println!(
        "\nUploading\n  from: {}\n  to:   {destination_url}",
        cwd.join(&job.source).display()
    );
    match job.ttl_days {
        0 => println!("  ttl:  None\n"),
        days => println!("  ttl:  {days} day(s)\n"),
    }

    let mut report = UploadReport::default();

    for entry in WalkDir::new(&job.source).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if entry.file_type().is_dir() {
            if job.verbose {
                println!("\nEntering '{}'", cwd.join(entry.path()).display());
            }
            continue;
        }
        if entry.depth() == 0 {
            warn!(source = %job.source.display(), "Source is not a directory");
            continue;
        }
        // Symlinks are not followed; one pointing at a directory is not a file.
        if entry.path_is_symlink() && std::fs::metadata(entry.path()).is_ok_and(|m| m.is_dir()) {
            debug!(path = %entry.path().display(), "Not descending into symlinked directory");
            continue;
        }

        report.found += 1;

        let dir = entry.path().parent().unwrap_or(job.source.as_path());
        let file_name = entry.file_name().to_string_lossy();
        let url = object_url(&destination_url, dir, &file_name);
        let local_file = cwd.join(entry.path());

        if job.verbose {
            println!("\n{} ==> {url}\n", local_file.display());
        } else {
            println!("  {}", local_file.display());
        }

        match upload_if_missing(store, &url, entry.path(), delete_after, job.verbose).await {
            Ok(true) => report.uploaded += 1,
            Ok(false) => {}
            Err(source) => {
                let err = Error::FileTransfer {
                    path: local_file,
                    source,
                };
                error!(error = %err, url = %url, "File transfer failed");
                println!("ERROR: {err}");
                report.failed += 1;
            }
        }
    }

    info!(
        found = report.found,
        uploaded = report.uploaded,
        failed = report.failed,
        "Upload walk complete"
    );
    Ok(report)
}

/// The directory progress lines are shown relative to. Falls back to an empty
/// path, which leaves them relative to wherever the process was started.
fn working_dir(current_dir: std::io::Result<PathBuf>) -> PathBuf {
    current_dir.unwrap_or_else(|e| {
        warn!(error = %e, "Cannot resolve working directory, showing relative paths");
        PathBuf::new()
    })
}

async fn probe_container<S>(job: &UploadJob, session: &Session, store: &S) -> Result<()>
where
    S: ObjectStore + ?Sized,
{
    let container = job.container_name();
    let url = format!("{}/{container}", session.object_store_url);
    println!("Checking container: {container} ...");

    let status = store.head(&url).await.map_err(|source| {
        error!(error = %source, url = %url, "Container probe failed");
        Error::ContainerProbe {
            url: url.clone(),
            source,
        }
    })?;

    if !(200..300).contains(&status) {
        error!(status, url = %url, "Container probe returned non-success status");
        return Err(Error::ContainerProbe {
            url: url.clone(),
            source: TransferError::Status {
                url,
                status,
                body: String::new(),
            },
        });
    }

    println!("  HTTP {status}");
    info!(container, status, "Container is reachable");
    Ok(())
}

/// Returns `Ok(true)` if the file was uploaded, `Ok(false)` if it was skipped.
///
/// Only a 404 from the existence check leads to an upload. Any other status,
/// including server errors, is taken to mean the object is already there.
async fn upload_if_missing<S>(
    store: &S,
    url: &str,
    local_path: &Path,
    delete_after: Option<u64>,
    verbose: bool,
) -> Result<bool, TransferError>
where
    S: ObjectStore + ?Sized,
{
    let status = store.head(url).await?;
    if status != NOT_FOUND {
        if verbose {
            println!("  File found on server, not uploading.");
        }
        debug!(url, status, "Object present, skipping");
        return Ok(false);
    }

    println!("    Uploading ...");
    store.put_file(url, local_path, delete_after).await?;
    Ok(true)
}
