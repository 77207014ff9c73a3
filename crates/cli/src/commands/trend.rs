use crate::dataset::{self, Dataset};
use crate::render;
use analytics::trend::{self, DEFAULT_WINDOW_SIZE};
use anyhow::{Context, Result};
use clap::Args;
use common::config;
use common::types::{Indicator, ParcelId};
use logging::*;
use std::path::PathBuf;

#[derive(Debug, Args)]
#[clap(about = "Moving-average trend of an indicator over time")]
pub struct TrendArgs {
    #[clap(short, long, help = "Dataset file (JSON); defaults to DATASET_PATH")]
    pub data: Option<PathBuf>,

    #[clap(
        short,
        long,
        help = "Indicator (ndvi|lai|water_stress|biomass); defaults to TREND_INDICATOR"
    )]
    pub indicator: Option<Indicator>,

    #[clap(short, long, help = "Restrict the analysis to one parcel")]
    pub parcel: Option<ParcelId>,

    #[clap(
        short,
        long,
        help = "Moving-average window in observations; defaults to TREND_WINDOW_SIZE"
    )]
    pub window: Option<usize>,

    #[clap(long, help = "Print as JSON")]
    pub json: bool,
}

pub fn run(args: TrendArgs) -> Result<()> {
    let log = DEFAULT.new(o!("function" => "commands::trend::run"));

    let indicator = args
        .indicator
        .unwrap_or_else(|| config::get_or("TREND_INDICATOR", Indicator::Ndvi));
    let window = args
        .window
        .unwrap_or_else(|| config::get_or("TREND_WINDOW_SIZE", DEFAULT_WINDOW_SIZE));

    let path = dataset::resolve_path(args.data);
    let dataset = Dataset::load(&path)?;
    info!(log, "analyzing trend";
        "path" => %path.display(),
        "indicator" => %indicator,
        "window" => window,
        "rows" => dataset.observations.len(),
    );

    let result = trend::analyze_trend(
        &dataset.observations,
        indicator,
        args.parcel.as_ref(),
        window,
    )
    .with_context(|| format!("Trend analysis of {} failed", indicator))?;

    if args.json {
        return super::print_json(&result);
    }
    println!("{}", render::trend(&result));
    Ok(())
}
