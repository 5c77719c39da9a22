//! Describe command
//!
//! Usage: reportpage describe --catalogue <FILE>

use super::SourceArgs;
use clap::Args;
use reportpage_core::params::describe;

#[derive(Debug, Args)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Execute describe command
pub fn execute(args: DescribeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (config, registry) = args.source.load()?;
    let description = describe(&registry, &config.limits);
    println!("{}", serde_json::to_string_pretty(&description)?);
    Ok(())
}
