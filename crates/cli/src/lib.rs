#![deny(warnings)]

pub mod commands;
pub mod dataset;
pub mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[clap(name = "agriwatch")]
#[clap(about = "Trend, yield validation and weather risk analysis for agricultural parcels")]
#[clap(version)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Trend(commands::trend::TrendArgs),
    Validate(commands::validate::ValidateArgs),
    Risk(commands::risk::RiskArgs),
    Parcels(commands::parcels::ParcelsArgs),
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Trend(args) => commands::trend::run(args),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Risk(args) => commands::risk::run(args),
        Commands::Parcels(args) => commands::parcels::run(args),
    }
}
