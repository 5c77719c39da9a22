pub mod describe;
pub mod list;
pub mod run;

use clap::Args;
use reportpage_core::catalogue::Catalogue;
use reportpage_core::{ExError, Registry, ReportPageConfig};
use std::path::PathBuf;

/// Where reports and settings come from.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Report catalogue (TOML)
    #[arg(short, long)]
    pub catalogue: PathBuf,

    /// Runtime configuration (TOML); defaults apply when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl SourceArgs {
    /// Load the configuration and build the registry from the catalogue.
    pub fn load(&self) -> Result<(ReportPageConfig, Registry), ExError> {
        let config = match &self.config {
            Some(path) => ReportPageConfig::from_path(path)?,
            None => ReportPageConfig::default(),
        };
        let catalogue = Catalogue::from_path(&self.catalogue)?;
        let registry = Registry::build(catalogue.registrations()?, &config.excluded_reports);
        Ok((config, registry))
    }
}
