use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use common::types::WeatherRecord;
use logging::*;
use serde::{Deserialize, Serialize};

const TABLE: &str = "weather";

pub const DEFAULT_TEMPERATURE_THRESHOLD: f64 = 25.0;
pub const DEFAULT_HUMIDITY_THRESHOLD: f64 = 80.0;

/// 病害リスクの判定閾値（どちらも「超えた」場合にのみ該当）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// 気温 (°C)
    pub temperature: f64,
    /// 相対湿度 (%)
    pub humidity: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE_THRESHOLD,
            humidity: DEFAULT_HUMIDITY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// 行単位の判定。他の行に依存しない
    pub fn classify(temperature: f64, humidity: f64, thresholds: &RiskThresholds) -> Self {
        let hot = temperature > thresholds.temperature;
        let humid = humidity > thresholds.humidity;
        match (hot, humid) {
            (true, true) => RiskLevel::High,
            (true, false) | (false, true) => RiskLevel::Moderate,
            (false, false) => RiskLevel::Low,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        };
        f.write_str(s)
    }
}

/// リスク判定済みの気象行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessedWeather {
    pub date: NaiveDateTime,
    pub temperature: f64,
    pub humidity: f64,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
}

impl RiskSummary {
    fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Low => self.low += 1,
            RiskLevel::Moderate => self.moderate += 1,
            RiskLevel::High => self.high += 1,
        }
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Moderate => self.moderate,
            RiskLevel::High => self.high,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.moderate + self.high
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// 入力と同じ順序
    pub rows: Vec<AssessedWeather>,
    pub summary: RiskSummary,
    pub thresholds: RiskThresholds,
}

/// 気象データの各行にリスク水準を付与し、水準ごとの件数を集計する。
///
/// 日付・気温・湿度のいずれかが欠けた行があれば判定しない。
pub fn classify_risk(rows: &[WeatherRecord], thresholds: RiskThresholds) -> Result<RiskAssessment> {
    let log = DEFAULT.new(o!(
        "function" => "classify_risk",
        "temperature_threshold" => thresholds.temperature,
        "humidity_threshold" => thresholds.humidity,
    ));

    if !thresholds.temperature.is_finite() || !thresholds.humidity.is_finite() {
        return Err(Error::InvalidArgument(format!(
            "thresholds must be finite, got temperature={} humidity={}",
            thresholds.temperature, thresholds.humidity
        )));
    }

    if rows.is_empty() {
        warn!(log, "weather table is empty");
        return Err(Error::EmptyTable { table: TABLE });
    }

    let report = |e: &Error| {
        warn!(log, "weather table rejected"; "error" => %e);
    };
    check_column(rows, "date", |r| r.date.is_some()).inspect_err(&report)?;
    check_column(rows, "temperature", |r| r.temperature.is_some_and(f64::is_finite))
        .inspect_err(&report)?;
    check_column(rows, "humidity", |r| r.humidity.is_some_and(f64::is_finite))
        .inspect_err(&report)?;

    let mut summary = RiskSummary::default();
    let assessed: Vec<AssessedWeather> = rows
        .iter()
        .filter_map(|r| {
            let (date, temperature, humidity) = (r.date?, r.temperature?, r.humidity?);
            let risk = RiskLevel::classify(temperature, humidity, &thresholds);
            summary.record(risk);
            Some(AssessedWeather {
                date,
                temperature,
                humidity,
                risk,
            })
        })
        .collect();

    info!(log, "weather risk classified";
        "rows" => assessed.len(),
        "low" => summary.low,
        "moderate" => summary.moderate,
        "high" => summary.high,
    );

    Ok(RiskAssessment {
        rows: assessed,
        summary,
        thresholds,
    })
}

fn check_column<F>(rows: &[WeatherRecord], field: &'static str, present: F) -> Result<()>
where
    F: Fn(&WeatherRecord) -> bool,
{
    let missing = rows.iter().filter(|&r| !present(r)).count();
    if missing == rows.len() {
        return Err(Error::MissingField {
            table: TABLE,
            field,
        });
    }
    if missing > 0 {
        return Err(Error::IncompleteData {
            table: TABLE,
            field,
            missing,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests;
