//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Upload an image for processing and wait for the result
#[derive(Parser)]
#[command(
    name = "imgrelay",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Gateway base URL, overriding the config file
    #[arg(long, global = true, env = "IMGRELAY_GATEWAY")]
    pub gateway: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload an image and wait for the processed result
    Process(commands::process::ProcessArgs),

    /// Show the compute instance state
    Status,

    /// Wipe the input and output namespaces
    Clear,

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            gateway,
            command,
        } = self;
        let app = AppContext::new(AppFlags {
            no_color,
            quiet,
            json,
            gateway,
        });
        match command {
            Command::Version => {
                commands::version::run(json)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Process(args) => commands::process::run(&app, args).await,
            Command::Status => commands::status::run(&app).await,
            Command::Clear => commands::clear::run(&app).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
        }
    }
}
