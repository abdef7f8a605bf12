use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::args::Args;
use crate::commands::MjlCommand;

/// The main CLI structure that defines the command-line interface
#[derive(Parser)]
#[command(name = "mjl")]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: MjlCommand,

    #[command(flatten)]
    pub args: Args,
}

/// Parse CLI arguments and execute the chosen command
pub fn run(args: Vec<String>) -> Result<ExitCode> {
    let cli = Cli::try_parse_from(args).unwrap_or_else(|e| {
        e.exit();
    });

    crate::logging::init(&cli.args.global);

    let exit = cli.command.execute(&cli.args)?;
    Ok(exit.finish())
}
