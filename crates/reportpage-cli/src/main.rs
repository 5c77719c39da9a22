//! reportpage CLI
//!
//! Command-line interface for browsing and paging static report catalogues

use clap::{Parser, Subcommand};
use reportpage_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "reportpage")]
#[command(about = "reportpage - Paged access to named reports", long_about = None)]
struct Cli {
    /// Logging profile (development, production, test)
    #[arg(long, global = true, default_value = "development")]
    log_profile: Profile,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List registered reports and their cache mode
    List(commands::list::ListArgs),
    /// Describe accepted request parameters
    Describe(commands::describe::DescribeArgs),
    /// Run one page of a report
    Run(commands::run::RunArgs),
}

fn main() {
    let cli = Cli::parse();
    init(cli.log_profile);

    let result = match cli.command {
        Commands::List(args) => commands::list::execute(args),
        Commands::Describe(args) => commands::describe::execute(args),
        Commands::Run(args) => commands::run::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
