use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use super::ParcelId;

// ==================== 観測指標 ====================

/// 観測テーブルの数値指標
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Ndvi,
    Lai,
    WaterStress,
    Biomass,
}

impl Indicator {
    pub const ALL: [Indicator; 4] = [
        Indicator::Ndvi,
        Indicator::Lai,
        Indicator::WaterStress,
        Indicator::Biomass,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Indicator::Ndvi => "ndvi",
            Indicator::Lai => "lai",
            Indicator::WaterStress => "water_stress",
            Indicator::Biomass => "biomass",
        }
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown indicator: {0} (expected one of ndvi, lai, water_stress, biomass)")]
pub struct ParseIndicatorError(pub String);

impl FromStr for Indicator {
    type Err = ParseIndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ndvi" => Ok(Indicator::Ndvi),
            "lai" => Ok(Indicator::Lai),
            "water_stress" | "stress_hydrique" => Ok(Indicator::WaterStress),
            "biomass" | "biomasse_estimee" => Ok(Indicator::Biomass),
            _ => Err(ParseIndicatorError(s.to_string())),
        }
    }
}

// ==================== テーブル行 ====================

/// 時系列観測（衛星指標）の1行
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Observation {
    #[serde(alias = "parcelle_id")]
    pub parcel_id: ParcelId,
    #[serde(default, with = "flexible_date")]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub ndvi: Option<f64>,
    #[serde(default)]
    pub lai: Option<f64>,
    #[serde(default, alias = "stress_hydrique")]
    pub water_stress: Option<f64>,
    #[serde(default, alias = "biomasse_estimee")]
    pub biomass: Option<f64>,
}

impl Observation {
    pub fn new(parcel_id: impl Into<ParcelId>, date: NaiveDateTime) -> Self {
        Self {
            parcel_id: parcel_id.into(),
            date: Some(date),
            ndvi: None,
            lai: None,
            water_stress: None,
            biomass: None,
        }
    }

    /// 指定した指標の値を設定する（ビルダー形式）
    pub fn with(mut self, indicator: Indicator, value: f64) -> Self {
        *self.slot(indicator) = Some(value);
        self
    }

    /// 指定した指標の値。欠損および非有限値は `None`
    pub fn value(&self, indicator: Indicator) -> Option<f64> {
        let v = match indicator {
            Indicator::Ndvi => self.ndvi,
            Indicator::Lai => self.lai,
            Indicator::WaterStress => self.water_stress,
            Indicator::Biomass => self.biomass,
        };
        v.filter(|v| v.is_finite())
    }

    fn slot(&mut self, indicator: Indicator) -> &mut Option<f64> {
        match indicator {
            Indicator::Ndvi => &mut self.ndvi,
            Indicator::Lai => &mut self.lai,
            Indicator::WaterStress => &mut self.water_stress,
            Indicator::Biomass => &mut self.biomass,
        }
    }
}

/// 収量履歴の1行（予測収量と実収量、t/ha）
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct YieldRecord {
    #[serde(alias = "parcelle_id")]
    pub parcel_id: ParcelId,
    #[serde(default, alias = "annee")]
    pub year: Option<i32>,
    #[serde(default, alias = "rendement_estime")]
    pub predicted: Option<f64>,
    #[serde(default, alias = "rendement_final")]
    pub actual: Option<f64>,
}

impl YieldRecord {
    pub fn new(parcel_id: impl Into<ParcelId>, predicted: f64, actual: f64) -> Self {
        Self {
            parcel_id: parcel_id.into(),
            year: None,
            predicted: Some(predicted),
            actual: Some(actual),
        }
    }
}

/// 気象観測の1行
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeatherRecord {
    #[serde(default, with = "flexible_date")]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default, alias = "humidite")]
    pub humidity: Option<f64>,
}

impl WeatherRecord {
    pub fn new(date: NaiveDateTime, temperature: f64, humidity: f64) -> Self {
        Self {
            date: Some(date),
            temperature: Some(temperature),
            humidity: Some(humidity),
        }
    }
}

// ==================== 日付のパース ====================

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// `YYYY-MM-DD`、`YYYY-MM-DD[T ]HH:MM[:SS[.f]]`、または RFC 3339 を日時として解釈する。
///
/// オフセット付き（`Z`、`+02:00` など）は UTC に換算してオフセットを落とす。
/// 日付のみの場合は 00:00:00 とみなす。
pub fn parse_date(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map(|d| d.and_time(NaiveTime::MIN))
}

mod flexible_date {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            super::parse_date(&s)
                .map_err(|e| serde::de::Error::custom(format!("invalid date '{s}': {e}")))
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests;
