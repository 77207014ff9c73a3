use crate::dataset::{self, Dataset};
use crate::render;
use analytics::risk::{self, RiskThresholds};
use anyhow::{Context, Result};
use clap::Args;
use common::config;
use logging::*;
use std::path::PathBuf;

#[derive(Debug, Args)]
#[clap(about = "Classify weather rows into low/moderate/high disease risk")]
pub struct RiskArgs {
    #[clap(short, long, help = "Dataset file (JSON); defaults to DATASET_PATH")]
    pub data: Option<PathBuf>,

    #[clap(
        short,
        long,
        help = "Temperature threshold in °C; defaults to RISK_TEMPERATURE_THRESHOLD"
    )]
    pub temperature: Option<f64>,

    #[clap(
        short = 'H',
        long,
        help = "Relative humidity threshold in %; defaults to RISK_HUMIDITY_THRESHOLD"
    )]
    pub humidity: Option<f64>,

    #[clap(long, help = "Print as JSON")]
    pub json: bool,
}

impl RiskArgs {
    fn thresholds(&self) -> RiskThresholds {
        let defaults = RiskThresholds::default();
        RiskThresholds {
            temperature: self.temperature.unwrap_or_else(|| {
                config::get_or("RISK_TEMPERATURE_THRESHOLD", defaults.temperature)
            }),
            humidity: self
                .humidity
                .unwrap_or_else(|| config::get_or("RISK_HUMIDITY_THRESHOLD", defaults.humidity)),
        }
    }
}

pub fn run(args: RiskArgs) -> Result<()> {
    let log = DEFAULT.new(o!("function" => "commands::risk::run"));

    let thresholds = args.thresholds();
    let path = dataset::resolve_path(args.data);
    let dataset = Dataset::load(&path)?;
    info!(log, "classifying weather risk";
        "path" => %path.display(),
        "rows" => dataset.weather.len(),
    );

    let assessment =
        risk::classify_risk(&dataset.weather, thresholds).context("Risk classification failed")?;

    if args.json {
        return super::print_json(&assessment);
    }
    println!("{}", render::risk(&assessment));
    Ok(())
}
