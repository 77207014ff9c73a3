use crate::error::{Error, Result};
use crate::stats;
use common::types::{ParcelId, YieldRecord};
use logging::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TABLE: &str = "yield_history";
const METRICS_TABLE: &str = "validation_metrics";

/// 相対精度がこれ未満ならデータと気候条件の見直しを提案
pub const ACCURACY_THRESHOLD: f64 = 0.80;

/// RMSE (t/ha) がこれを超えるならモデル仮定の見直しを提案
pub const RMSE_THRESHOLD: f64 = 0.50;

/// 予測収量と実収量の比較結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    pub samples: usize,
    pub mean_predicted: f64,
    pub mean_actual: f64,
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    /// 1 - MAE / mean(actual)。符号付きのまま保持する（負になり得る）
    pub accuracy: f64,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// 収量履歴の提供元
pub trait YieldSource {
    fn yield_records<'a>(&'a self, parcel: &ParcelId) -> Vec<&'a YieldRecord>;
}

impl YieldSource for [YieldRecord] {
    fn yield_records<'a>(&'a self, parcel: &ParcelId) -> Vec<&'a YieldRecord> {
        self.iter().filter(|r| &r.parcel_id == parcel).collect()
    }
}

impl YieldSource for Vec<YieldRecord> {
    fn yield_records<'a>(&'a self, parcel: &ParcelId) -> Vec<&'a YieldRecord> {
        self.as_slice().yield_records(parcel)
    }
}

impl<T: YieldSource + ?Sized> YieldSource for &T {
    fn yield_records<'a>(&'a self, parcel: &ParcelId) -> Vec<&'a YieldRecord> {
        (**self).yield_records(parcel)
    }
}

/// 圃場ごとの検証結果。同じ圃場を再検証すると上書きされる
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsStore(BTreeMap<ParcelId, ValidationMetrics>);

impl MetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, parcel: &ParcelId) -> Option<&ValidationMetrics> {
        self.0.get(parcel)
    }

    fn get_mut(&mut self, parcel: &ParcelId) -> Option<&mut ValidationMetrics> {
        self.0.get_mut(parcel)
    }

    /// 既存の値があれば置き換えて返す
    pub fn insert(
        &mut self,
        parcel: ParcelId,
        metrics: ValidationMetrics,
    ) -> Option<ValidationMetrics> {
        self.0.insert(parcel, metrics)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParcelId, &ValidationMetrics)> {
        self.0.iter()
    }
}

/// 改善提案
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suggestion {
    IncreaseDataGranularity,
    CheckLocalClimate,
    ReexamineModelAssumptions,
    PerformanceSatisfactory,
}

impl Suggestion {
    pub fn message(&self) -> &'static str {
        match self {
            Suggestion::IncreaseDataGranularity => "Increase data granularity.",
            Suggestion::CheckLocalClimate => "Check local climate conditions.",
            Suggestion::ReexamineModelAssumptions => "Re-examine model assumptions.",
            Suggestion::PerformanceSatisfactory => "Performance is satisfactory.",
        }
    }
}

impl std::fmt::Display for Suggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// 検証指標から改善提案を生成する。
///
/// 順序は固定: 精度が低ければ粒度・気候の2件、RMSE が大きければ仮定の見直し、
/// どれにも該当しなければ「問題なし」の1件のみ。
pub fn suggest_improvements(metrics: &ValidationMetrics) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    if metrics.accuracy < ACCURACY_THRESHOLD {
        suggestions.push(Suggestion::IncreaseDataGranularity);
        suggestions.push(Suggestion::CheckLocalClimate);
    }
    if metrics.rmse > RMSE_THRESHOLD {
        suggestions.push(Suggestion::ReexamineModelAssumptions);
    }
    if suggestions.is_empty() {
        suggestions.push(Suggestion::PerformanceSatisfactory);
    }
    suggestions
}

/// 予測値と実績値の相対精度 `1 - MAE / mean(actual)` を計算
pub fn prediction_accuracy(predicted: &[f64], actual: &[f64]) -> Result<f64> {
    compute_metrics(predicted, actual).map(|m| m.accuracy)
}

fn compute_metrics(predicted: &[f64], actual: &[f64]) -> Result<ValidationMetrics> {
    if predicted.len() != actual.len() {
        return Err(Error::InvalidArgument(format!(
            "predicted and actual lengths differ: {} and {}",
            predicted.len(),
            actual.len()
        )));
    }

    let (Some(mean_predicted), Some(mean_actual)) = (stats::mean(predicted), stats::mean(actual))
    else {
        return Err(Error::InvalidArgument("no values to compare".to_string()));
    };

    let n = actual.len() as f64;
    let (abs_sum, sq_sum) = predicted
        .iter()
        .zip(actual)
        .fold((0.0, 0.0), |(abs_sum, sq_sum), (p, a)| {
            let diff = p - a;
            (abs_sum + diff.abs(), sq_sum + diff * diff)
        });
    let mae = abs_sum / n;
    let mse = sq_sum / n;

    if mean_actual == 0.0 || !mean_actual.is_finite() {
        return Err(Error::UndefinedAccuracy { mean_actual });
    }

    Ok(ValidationMetrics {
        samples: actual.len(),
        mean_predicted,
        mean_actual,
        mae,
        mse,
        rmse: mse.sqrt(),
        accuracy: 1.0 - mae / mean_actual,
        confidence: None,
    })
}

/// 収量予測（推奨）の検証器
///
/// 検証結果は自身の `MetricsStore` に保持する。ストアは外から渡して共有範囲を決められる。
pub struct RecommendationValidator<S> {
    source: S,
    store: MetricsStore,
}

impl<S: YieldSource> RecommendationValidator<S> {
    pub fn new(source: S) -> Self {
        Self::with_store(source, MetricsStore::new())
    }

    pub fn with_store(source: S, store: MetricsStore) -> Self {
        Self { source, store }
    }

    pub fn store(&self) -> &MetricsStore {
        &self.store
    }

    pub fn into_store(self) -> MetricsStore {
        self.store
    }

    /// 圃場の予測収量と実収量を比較し、指標をストアに保存する。
    ///
    /// 欠損値が1つでもあれば計算しない（補完もしない）。
    pub fn validate(&mut self, parcel: &ParcelId) -> Result<ValidationMetrics> {
        let log = DEFAULT.new(o!(
            "function" => "validate",
            "parcel" => parcel.to_string(),
        ));

        let records = self.source.yield_records(parcel);
        if records.is_empty() {
            warn!(log, "no yield history for parcel");
            return Err(Error::NotFound {
                table: TABLE,
                parcel: parcel.clone(),
            });
        }

        let report = |e: &Error| {
            warn!(log, "validation aborted"; "error" => %e);
        };
        let predicted =
            complete_column(&records, "predicted", |r| r.predicted).inspect_err(&report)?;
        let actual = complete_column(&records, "actual", |r| r.actual).inspect_err(&report)?;
        let metrics = compute_metrics(&predicted, &actual).inspect_err(&report)?;

        info!(log, "validation metrics computed";
            "samples" => metrics.samples,
            "mean_predicted" => format!("{:.2}", metrics.mean_predicted),
            "mean_actual" => format!("{:.2}", metrics.mean_actual),
            "mae" => format!("{:.2}", metrics.mae),
            "rmse" => format!("{:.2}", metrics.rmse),
            "accuracy" => format!("{:.2}%", metrics.accuracy * 100.0),
        );

        if let Some(previous) = self.store.insert(parcel.clone(), metrics.clone()) {
            debug!(log, "replaced previous metrics"; "previous_accuracy" => previous.accuracy);
        }
        Ok(metrics)
    }

    /// 複数の圃場を検証する。1件の失敗で残りを止めない
    pub fn validate_all<'p, I>(&mut self, parcels: I) -> Vec<(ParcelId, Result<ValidationMetrics>)>
    where
        I: IntoIterator<Item = &'p ParcelId>,
    {
        parcels
            .into_iter()
            .map(|parcel| (parcel.clone(), self.validate(parcel)))
            .collect()
    }

    /// 保存済みの指標に信頼度係数を設定する
    pub fn update_confidence(&mut self, parcel: &ParcelId, confidence: f64) -> Result<()> {
        let log = DEFAULT.new(o!(
            "function" => "update_confidence",
            "parcel" => parcel.to_string(),
        ));

        if !confidence.is_finite() {
            return Err(Error::InvalidArgument(format!(
                "confidence must be finite, got {confidence}"
            )));
        }

        let Some(metrics) = self.store.get_mut(parcel) else {
            warn!(log, "no validation metrics to update");
            return Err(Error::NotFound {
                table: METRICS_TABLE,
                parcel: parcel.clone(),
            });
        };
        metrics.confidence = Some(confidence);

        info!(log, "confidence factor updated";
            "confidence" => format!("{:.2}%", confidence * 100.0),
        );
        Ok(())
    }

    /// 保存済みの指標を返す
    pub fn generate_report(&self, parcel: &ParcelId) -> Result<&ValidationMetrics> {
        self.store.get(parcel).ok_or_else(|| Error::NotFound {
            table: METRICS_TABLE,
            parcel: parcel.clone(),
        })
    }
}

fn complete_column<F>(records: &[&YieldRecord], field: &'static str, get: F) -> Result<Vec<f64>>
where
    F: Fn(&YieldRecord) -> Option<f64>,
{
    let values: Vec<f64> = records
        .iter()
        .filter_map(|&r| get(r).filter(|v| v.is_finite()))
        .collect();
    if values.len() < records.len() {
        return Err(Error::IncompleteData {
            table: TABLE,
            field,
            missing: records.len() - values.len(),
        });
    }
    Ok(values)
}
