use anyhow::Result;
use verdict_cli::cli::cli;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = verdict_cli::logging::setup_logging() {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    cli().await
}
