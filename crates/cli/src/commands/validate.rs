use crate::dataset::{self, Dataset};
use crate::render;
use analytics::validation::{
    RecommendationValidator, Suggestion, ValidationMetrics, YieldSource, suggest_improvements,
};
use anyhow::{Result, bail};
use clap::Args;
use common::types::ParcelId;
use logging::*;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Args)]
#[clap(about = "Compare predicted and actual yields per parcel")]
pub struct ValidateArgs {
    #[clap(short, long, help = "Dataset file (JSON); defaults to DATASET_PATH")]
    pub data: Option<PathBuf>,

    #[clap(
        short,
        long = "parcel",
        help = "Parcel to validate (repeatable); defaults to every parcel in the yield history"
    )]
    pub parcels: Vec<ParcelId>,

    #[clap(long, help = "Store each parcel's accuracy as its confidence factor")]
    pub confidence: bool,

    #[clap(long, help = "Print as JSON")]
    pub json: bool,
}

/// 圃場1件分の検証結果
#[derive(Debug, Serialize)]
pub struct ParcelReport {
    pub parcel: ParcelId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ValidationMetrics>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 指定された圃場を順に検証する。失敗した圃場はエラーとして記録し、残りを続ける
pub fn validate_parcels<S: YieldSource>(
    source: S,
    parcels: &[ParcelId],
    with_confidence: bool,
) -> Vec<(ParcelReport, Option<analytics::Error>)> {
    let log = DEFAULT.new(o!("function" => "commands::validate::validate_parcels"));

    let mut validator = RecommendationValidator::new(source);
    let results = validator.validate_all(parcels);

    results
        .into_iter()
        .map(|(parcel, result)| {
            let outcome = result.and_then(|metrics| {
                if with_confidence {
                    validator.update_confidence(&parcel, metrics.accuracy)?;
                }
                validator.generate_report(&parcel).cloned()
            });
            match outcome {
                Ok(metrics) => {
                    let suggestions = suggest_improvements(&metrics);
                    let report = ParcelReport {
                        parcel,
                        metrics: Some(metrics),
                        suggestions,
                        error: None,
                    };
                    (report, None)
                }
                Err(e) => {
                    warn!(log, "parcel skipped"; "parcel" => %parcel, "error" => %e);
                    let report = ParcelReport {
                        parcel,
                        metrics: None,
                        suggestions: Vec::new(),
                        error: Some(e.to_string()),
                    };
                    (report, Some(e))
                }
            }
        })
        .collect()
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let log = DEFAULT.new(o!("function" => "commands::validate::run"));

    let path = dataset::resolve_path(args.data);
    let dataset = Dataset::load(&path)?;

    let parcels = if args.parcels.is_empty() {
        dataset.yield_parcel_ids()
    } else {
        args.parcels
    };
    if parcels.is_empty() {
        bail!("The yield_history table is empty: nothing to validate");
    }
    info!(log, "validating yield predictions";
        "path" => %path.display(),
        "parcels" => parcels.len(),
        "confidence" => args.confidence,
    );

    let outcomes = validate_parcels(&dataset.yield_history, &parcels, args.confidence);
    let failed = outcomes.iter().filter(|(_, e)| e.is_some()).count();

    if args.json {
        let reports: Vec<&ParcelReport> = outcomes.iter().map(|(r, _)| r).collect();
        super::print_json(&reports)?;
    } else {
        for (report, error) in &outcomes {
            match (&report.metrics, error) {
                (Some(metrics), _) => {
                    println!(
                        "{}",
                        render::validation(&report.parcel, metrics, &report.suggestions)
                    );
                }
                (None, Some(e)) => eprintln!("{}", render::validation_failure(&report.parcel, e)),
                (None, None) => {}
            }
        }
    }

    if failed == outcomes.len() {
        bail!("No parcel could be validated ({} failed)", failed);
    }
    Ok(())
}
