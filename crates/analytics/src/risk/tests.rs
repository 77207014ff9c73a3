use super::*;
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

fn day(n: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::days(n)
}

fn weather(readings: &[(f64, f64)]) -> Vec<WeatherRecord> {
    readings
        .iter()
        .enumerate()
        .map(|(i, (t, h))| WeatherRecord::new(day(i as i64), *t, *h))
        .collect()
}

#[test]
fn test_classify_examples() {
    let thresholds = RiskThresholds::default();
    assert_eq!(RiskLevel::classify(30.0, 90.0, &thresholds), RiskLevel::High);
    assert_eq!(RiskLevel::classify(30.0, 50.0, &thresholds), RiskLevel::Moderate);
    assert_eq!(RiskLevel::classify(20.0, 85.0, &thresholds), RiskLevel::Moderate);
    assert_eq!(RiskLevel::classify(10.0, 20.0, &thresholds), RiskLevel::Low);
}

#[test]
fn test_thresholds_are_strict() {
    let thresholds = RiskThresholds::default();
    assert_eq!(RiskLevel::classify(25.0, 80.0, &thresholds), RiskLevel::Low);
    assert_eq!(RiskLevel::classify(25.0, 80.1, &thresholds), RiskLevel::Moderate);
    assert_eq!(RiskLevel::classify(25.1, 80.1, &thresholds), RiskLevel::High);
}

#[test]
fn test_default_thresholds() {
    let thresholds = RiskThresholds::default();
    assert_eq!(thresholds.temperature, 25.0);
    assert_eq!(thresholds.humidity, 80.0);
}

#[test]
fn test_classify_risk_preserves_order_and_counts() {
    let rows = weather(&[(30.0, 90.0), (10.0, 20.0), (30.0, 50.0), (31.0, 95.0)]);
    let assessment = classify_risk(&rows, RiskThresholds::default()).unwrap();

    let levels: Vec<_> = assessment.rows.iter().map(|r| r.risk).collect();
    assert_eq!(
        levels,
        vec![
            RiskLevel::High,
            RiskLevel::Low,
            RiskLevel::Moderate,
            RiskLevel::High
        ]
    );
    let dates: Vec<_> = assessment.rows.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![day(0), day(1), day(2), day(3)]);

    assert_eq!(
        assessment.summary,
        RiskSummary {
            low: 1,
            moderate: 1,
            high: 2
        }
    );
    assert_eq!(assessment.summary.count(RiskLevel::High), 2);
    assert_eq!(assessment.summary.total(), rows.len());
}

#[test]
fn test_custom_thresholds() {
    let rows = weather(&[(22.0, 70.0)]);
    let thresholds = RiskThresholds {
        temperature: 20.0,
        humidity: 60.0,
    };
    let assessment = classify_risk(&rows, thresholds).unwrap();
    assert_eq!(assessment.rows[0].risk, RiskLevel::High);
    assert_eq!(assessment.thresholds, thresholds);
}

#[test]
fn test_empty_table() {
    let err = classify_risk(&[], RiskThresholds::default()).unwrap_err();
    assert_eq!(err, Error::EmptyTable { table: "weather" });
}

#[test]
fn test_missing_humidity_column() {
    let mut rows = weather(&[(30.0, 90.0), (20.0, 40.0)]);
    for row in &mut rows {
        row.humidity = None;
    }
    let err = classify_risk(&rows, RiskThresholds::default()).unwrap_err();
    assert_eq!(
        err,
        Error::MissingField {
            table: "weather",
            field: "humidity"
        }
    );
}

#[test]
fn test_missing_date_column() {
    let mut rows = weather(&[(30.0, 90.0)]);
    rows[0].date = None;
    let err = classify_risk(&rows, RiskThresholds::default()).unwrap_err();
    assert_eq!(
        err,
        Error::MissingField {
            table: "weather",
            field: "date"
        }
    );
}

#[test]
fn test_partially_missing_temperature() {
    let mut rows = weather(&[(30.0, 90.0), (20.0, 40.0), (26.0, 81.0)]);
    rows[1].temperature = None;
    rows[2].temperature = Some(f64::NAN);
    let err = classify_risk(&rows, RiskThresholds::default()).unwrap_err();
    assert_eq!(
        err,
        Error::IncompleteData {
            table: "weather",
            field: "temperature",
            missing: 2
        }
    );
}

#[test]
fn test_rejects_nan_threshold() {
    let rows = weather(&[(30.0, 90.0)]);
    let thresholds = RiskThresholds {
        temperature: f64::NAN,
        humidity: 80.0,
    };
    assert!(matches!(
        classify_risk(&rows, thresholds),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_risk_level_serialization() {
    assert_eq!(serde_json::to_value(RiskLevel::Moderate).unwrap(), "moderate");
    assert_eq!(RiskLevel::High.to_string(), "high");

    let rows = weather(&[(30.0, 90.0)]);
    let assessment = classify_risk(&rows, RiskThresholds::default()).unwrap();
    let json = serde_json::to_value(&assessment).unwrap();
    assert_eq!(json["rows"][0]["risk"], "high");
    assert_eq!(json["summary"]["high"], 1);
}

proptest! {
    #[test]
    fn test_rows_are_classified_independently(
        readings in prop::collection::vec((-10.0..45.0_f64, 0.0..100.0_f64), 1..40),
        rotate in any::<prop::sample::Index>(),
    ) {
        let thresholds = RiskThresholds::default();
        let rows = weather(&readings);
        let assessment = classify_risk(&rows, thresholds).unwrap();

        // 並べ替えても各行の判定は変わらない
        let mut rotated = readings.clone();
        let k = rotate.index(rotated.len());
        rotated.rotate_left(k);
        let rotated_assessment = classify_risk(&weather(&rotated), thresholds).unwrap();

        for (i, (t, h)) in readings.iter().enumerate() {
            let expected = RiskLevel::classify(*t, *h, &thresholds);
            prop_assert_eq!(assessment.rows[i].risk, expected);
            let j = (i + readings.len() - k) % readings.len();
            prop_assert_eq!(rotated_assessment.rows[j].risk, expected);
        }
        prop_assert_eq!(assessment.summary, rotated_assessment.summary);
        prop_assert_eq!(assessment.summary.total(), readings.len());
    }
}
