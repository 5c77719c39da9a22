//! List command
//!
//! Usage: reportpage list --catalogue <FILE>

use super::SourceArgs;
use clap::Args;

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Execute list command
pub fn execute(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (_config, registry) = args.source.load()?;

    for name in registry.list_names() {
        let mode = registry.cache_mode(name).map_err(reportpage_core::ExError::from)?;
        println!("{}\t{}", name, mode.as_str());
    }

    Ok(())
}
