use crate::dataset::{self, Dataset};
use crate::render;
use anyhow::Result;
use clap::Args;
use logging::*;
use std::path::PathBuf;

#[derive(Debug, Args)]
#[clap(about = "List parcel ids found in the dataset")]
pub struct ParcelsArgs {
    #[clap(short, long, help = "Dataset file (JSON); defaults to DATASET_PATH")]
    pub data: Option<PathBuf>,

    #[clap(long, help = "Print as JSON")]
    pub json: bool,
}

pub fn run(args: ParcelsArgs) -> Result<()> {
    let log = DEFAULT.new(o!("function" => "commands::parcels::run"));

    let path = dataset::resolve_path(args.data);
    let dataset = Dataset::load(&path)?;
    let ids = dataset.parcel_ids();
    debug!(log, "parcels listed"; "path" => %path.display(), "count" => ids.len());

    if args.json {
        return super::print_json(&ids);
    }
    if !ids.is_empty() {
        println!("{}", render::parcels(&ids));
    }
    Ok(())
}
