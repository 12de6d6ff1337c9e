use clap::{Parser, Subcommand};

use self::{audit::AuditArg, default_config::DefaultConfigArg, score::ScoreArg};

mod audit;
mod default_config;
mod score;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Score run tables and judge every cohort
    Audit(#[clap(flatten)] AuditArg),
    /// Score a single run and print the breakdown
    Score(#[clap(flatten)] ScoreArg),
    /// Print the default audit configuration
    DefaultConfig(#[clap(flatten)] DefaultConfigArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Audit(arg) => audit::run(&arg)?,
        Mode::Score(arg) => score::run(&arg)?,
        Mode::DefaultConfig(arg) => default_config::run(&arg)?,
    }
    Ok(())
}
