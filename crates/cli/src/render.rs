//! 解析結果のテキスト表示

use analytics::risk::{RiskAssessment, RiskLevel};
use analytics::trend::TrendResult;
use analytics::validation::{Suggestion, ValidationMetrics};
use common::types::ParcelId;

const RULE_WIDTH: usize = 50;
const DATE_FORMAT: &str = "%Y-%m-%d";

fn heavy_rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn light_rule() -> String {
    "-".repeat(RULE_WIDTH)
}

fn signed(value: f64, precision: usize) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{}{:.*}", sign, precision, value)
}

pub fn trend(result: &TrendResult) -> String {
    let scope = result
        .parcel
        .as_ref()
        .map_or_else(|| "all parcels".to_string(), |p| format!("parcel {}", p));

    let mut lines = vec![
        heavy_rule(),
        format!("Trend of {} ({})", result.indicator, scope),
        light_rule(),
        format!("  Window size : {} observations", result.window_size),
        format!("  Points      : {}", result.moving_average.len()),
    ];
    if let (Some(first), Some(last)) = (result.moving_average.first(), result.moving_average.last())
    {
        lines.push(format!(
            "  Period      : {} to {}",
            first.date.format(DATE_FORMAT),
            last.date.format(DATE_FORMAT)
        ));
    }
    lines.extend([
        format!("  Slope       : {} per day", signed(result.slope, 5)),
        format!("  Intercept   : {:.2}", result.intercept),
        format!("  Direction   : {}", result.direction),
        light_rule(),
    ]);
    lines.extend(result.moving_average.iter().map(|p| {
        format!("  {}  {:.4}", p.date.format(DATE_FORMAT), p.value)
    }));
    lines.push(heavy_rule());
    lines.join("\n")
}

pub fn validation(
    parcel: &ParcelId,
    metrics: &ValidationMetrics,
    suggestions: &[Suggestion],
) -> String {
    let mut lines = vec![
        heavy_rule(),
        format!("Validation for parcel {}", parcel),
        light_rule(),
        format!("  Samples                : {}", metrics.samples),
        format!("  Mean predicted yield   : {:.2} t/ha", metrics.mean_predicted),
        format!("  Mean actual yield      : {:.2} t/ha", metrics.mean_actual),
        format!("  MAE                    : {:.2}", metrics.mae),
        format!("  MSE                    : {:.2}", metrics.mse),
        format!("  RMSE                   : {:.2}", metrics.rmse),
        format!("  Accuracy               : {:.2}%", metrics.accuracy * 100.0),
    ];
    if let Some(confidence) = metrics.confidence {
        lines.push(format!("  Confidence factor      : {:.2}%", confidence * 100.0));
    }
    lines.push(light_rule());
    lines.push("Suggestions:".to_string());
    lines.extend(suggestions.iter().map(|s| format!("  - {}", s)));
    lines.push(heavy_rule());
    lines.join("\n")
}

pub fn validation_failure(parcel: &ParcelId, error: &analytics::Error) -> String {
    format!("Validation for parcel {} skipped: {}", parcel, error)
}

pub fn risk(assessment: &RiskAssessment) -> String {
    let mut lines = vec![
        heavy_rule(),
        format!(
            "Weather risk (temperature > {}°C, humidity > {}%)",
            assessment.thresholds.temperature, assessment.thresholds.humidity
        ),
        light_rule(),
    ];
    lines.extend(assessment.rows.iter().map(|r| {
        format!(
            "  {}  {:>6.1}°C  {:>5.1}%  {}",
            r.date.format(DATE_FORMAT),
            r.temperature,
            r.humidity,
            r.risk
        )
    }));
    lines.push(light_rule());
    lines.extend(
        [RiskLevel::Low, RiskLevel::Moderate, RiskLevel::High]
            .into_iter()
            .map(|level| {
                let count = assessment.summary.count(level);
                format!("  {:<9}: {}", level.to_string(), count)
            }),
    );
    lines.push(heavy_rule());
    lines.join("\n")
}

pub fn parcels(ids: &[ParcelId]) -> String {
    ids.iter()
        .map(ParcelId::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::risk::{RiskThresholds, classify_risk};
    use analytics::trend::analyze_trend;
    use analytics::validation::suggest_improvements;
    use chrono::NaiveDate;
    use common::types::{Indicator, Observation, WeatherRecord};

    fn at(day: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_render_trend() {
        let rows: Vec<Observation> = (1..=4)
            .map(|d| Observation::new("P001", at(d)).with(Indicator::Ndvi, 0.1 * d as f64))
            .collect();
        let parcel = ParcelId::from("P001");
        let result = analyze_trend(&rows, Indicator::Ndvi, Some(&parcel), 2).unwrap();
        let text = trend(&result);

        assert!(text.contains("Trend of ndvi (parcel P001)"));
        assert!(text.contains("Period      : 2024-05-02 to 2024-05-04"));
        assert!(text.contains("Slope       : +0.10000 per day"));
        assert!(text.contains("Direction   : increasing"));
    }

    #[test]
    fn test_render_validation() {
        let metrics = ValidationMetrics {
            samples: 2,
            mean_predicted: 6.5,
            mean_actual: 6.0,
            mae: 0.5,
            mse: 0.25,
            rmse: 0.5,
            accuracy: 0.9167,
            confidence: Some(0.9167),
        };
        let text = validation(
            &ParcelId::from("P002"),
            &metrics,
            &suggest_improvements(&metrics),
        );

        assert!(text.contains("Validation for parcel P002"));
        assert!(text.contains("Accuracy               : 91.67%"));
        assert!(text.contains("Confidence factor      : 91.67%"));
        assert!(text.contains("  - Performance is satisfactory."));
    }

    #[test]
    fn test_render_risk() {
        let rows = vec![
            WeatherRecord::new(at(1), 30.0, 90.0),
            WeatherRecord::new(at(2), 12.0, 40.0),
        ];
        let assessment = classify_risk(&rows, RiskThresholds::default()).unwrap();
        let text = risk(&assessment);

        assert!(text.contains("2024-05-01"));
        assert!(text.contains("high"));
        assert!(text.contains("  low      : 1"));
        assert!(text.contains("  moderate : 0"));
        assert!(text.contains("  high     : 1"));
    }

    #[test]
    fn test_render_parcels() {
        let ids = vec![ParcelId::from("P001"), ParcelId::from("P002")];
        assert_eq!(parcels(&ids), "P001\nP002");
        assert_eq!(parcels(&[]), "");
    }
}
