use std::path::PathBuf;

use clap::Args;
use tripeaks_analysis::config::AuditConfig;

use crate::util::Output;

#[derive(Debug, Clone, Args)]
pub(crate) struct DefaultConfigArg {
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &DefaultConfigArg) -> anyhow::Result<()> {
    Output::save_json(&AuditConfig::default(), arg.output.as_deref())
}
