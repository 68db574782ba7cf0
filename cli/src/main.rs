//! imgrelay CLI - upload an image, wait for the processed result

#![cfg_attr(test, allow(clippy::expect_used))]

use std::process::ExitCode;

use clap::Parser;
use imgrelay_cli::cli::Cli;
use imgrelay_cli::domain::WorkflowError;
use imgrelay_cli::output::OutputContext;
use imgrelay_cli::output::json::format_error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout stays parseable under --json.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let json = cli.json;
    let no_color = cli.no_color;
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            if json {
                let code = e
                    .downcast_ref::<WorkflowError>()
                    .map_or("ERROR", WorkflowError::code);
                match format_error(&format!("{e:#}"), code) {
                    Ok(out) => println!("{out}"),
                    Err(_) => eprintln!("Error: {e}"),
                }
            } else {
                OutputContext::new(no_color, false).error(&format!("Error: {e}"));
            }
            ExitCode::FAILURE
        }
    }
}
