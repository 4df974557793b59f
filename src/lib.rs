//! swift-upload: copy a local directory tree into an OpenStack Swift container.
//!
//! One run authenticates against Keystone, finds the public object-store
//! endpoint in the service catalog, checks the target container, and then
//! uploads every file under the source directory that is not already present.
//! Per-file failures are counted without stopping the walk; the final tallies
//! decide the exit status (see [`report`]).

pub mod cli;
pub mod config;
pub mod contract;
pub mod error;
pub mod keystone;
pub mod load_config;
pub mod report;
pub mod swift;
pub mod synchronise;

pub use cli::{run, run_with, run_with_timeouts, Cli};
pub use error::{Error, Result};
