use clap::Parser;
use std::process::ExitCode;
use swift_upload::cli::{default_log_filter, run, Cli};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Login info may come from a .env file next to the invocation.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Progress goes to stdout; structured logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("CLI arguments parsed, invoking run");

    match run(cli).await {
        Ok(report) => {
            tracing::info!(?report, status = ?report.status(), "Upload finished");
            ExitCode::from(report.exit_code())
        }
        Err(e) => {
            tracing::error!(error = %e, "Upload aborted");
            eprintln!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}
