pub mod check;

use anyhow::Result;
use clap::Subcommand;

use crate::args::Args;
use crate::exit::Exit;

pub trait Command {
    fn execute(&self, args: &Args) -> Result<Exit>;
}

#[derive(Debug, Subcommand)]
pub enum MjlCommand {
    /// Validate template and data files
    Check(self::check::Check),
}

impl MjlCommand {
    pub fn execute(&self, args: &Args) -> Result<Exit> {
        match self {
            Self::Check(cmd) => cmd.execute(args),
        }
    }
}
