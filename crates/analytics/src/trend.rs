use crate::error::{Error, Result};
use crate::stats;
use chrono::NaiveDateTime;
use common::types::{Indicator, Observation, ParcelId};
use logging::*;
use serde::{Deserialize, Serialize};

const TABLE: &str = "observations";

/// 移動平均の窓幅のデフォルト値（日数ではなく観測数）
pub const DEFAULT_WINDOW_SIZE: usize = 7;

/// これ以下の傾きは浮動小数点誤差として横ばい扱い
const STABLE_SLOPE_EPSILON: f64 = 1e-12;

/// トレンドの方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    /// 傾きの符号で方向を決める。
    ///
    /// 一定値の系列でも窓内の合計の丸め誤差で 1e-16 程度の傾きが出るため、
    /// `|slope| <= STABLE_SLOPE_EPSILON` は横ばいとする。
    pub fn from_slope(slope: f64) -> Self {
        if slope > STABLE_SLOPE_EPSILON {
            TrendDirection::Increasing
        } else if slope < -STABLE_SLOPE_EPSILON {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAveragePoint {
    pub date: NaiveDateTime,
    pub value: f64,
}

/// トレンド分析の結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub indicator: Indicator,
    pub parcel: Option<ParcelId>,
    pub window_size: usize,
    pub moving_average: Vec<MovingAveragePoint>,
    /// 1日あたりの変化量
    pub slope: f64,
    pub intercept: f64,
    pub direction: TrendDirection,
}

/// 指標の移動平均を取り、経過日数に対する線形トレンドを求める。
///
/// - `parcel` を指定した場合はその圃場の行のみを対象にする
/// - 行は日付の昇順に並べ替えてから窓を計算する
/// - 窓が埋まらない行と、窓内に欠損値を含む行は回帰から除外する
/// - x は最初に残った点からの経過日数（端数切り捨て）
pub fn analyze_trend(
    rows: &[Observation],
    indicator: Indicator,
    parcel: Option<&ParcelId>,
    window_size: usize,
) -> Result<TrendResult> {
    let log = DEFAULT.new(o!(
        "function" => "analyze_trend",
        "indicator" => indicator.name(),
        "parcel" => parcel.map(|p| p.to_string()),
    ));

    if window_size == 0 {
        return Err(Error::InvalidArgument("window_size must be at least 1".to_string()));
    }

    if rows.is_empty() {
        warn!(log, "observation table is empty");
        return Err(Error::EmptyTable { table: TABLE });
    }

    let filtered: Vec<&Observation> = match parcel {
        Some(id) => {
            let filtered: Vec<&Observation> =
                rows.iter().filter(|r| &r.parcel_id == id).collect();
            if filtered.is_empty() {
                warn!(log, "no observations for parcel");
                return Err(Error::NotFound {
                    table: TABLE,
                    parcel: id.clone(),
                });
            }
            filtered
        }
        None => rows.iter().collect(),
    };

    if filtered.iter().all(|r| r.value(indicator).is_none()) {
        warn!(log, "indicator column is absent");
        return Err(Error::MissingField {
            table: TABLE,
            field: indicator.name(),
        });
    }

    let mut dated: Vec<(NaiveDateTime, Option<f64>)> = filtered
        .iter()
        .filter_map(|r| r.date.map(|d| (d, r.value(indicator))))
        .collect();

    if dated.is_empty() {
        warn!(log, "date column is absent");
        return Err(Error::MissingField {
            table: TABLE,
            field: "date",
        });
    }
    if dated.len() < filtered.len() {
        let missing = filtered.len() - dated.len();
        warn!(log, "observations without a date"; "missing" => missing);
        return Err(Error::IncompleteData {
            table: TABLE,
            field: "date",
            missing,
        });
    }

    dated.sort_by_key(|(date, _)| *date);

    let values: Vec<Option<f64>> = dated.iter().map(|(_, v)| *v).collect();
    let moving_average: Vec<MovingAveragePoint> = stats::moving_average(&values, window_size)
        .into_iter()
        .zip(dated.iter())
        .filter_map(|(avg, (date, _))| {
            avg.map(|value| MovingAveragePoint { date: *date, value })
        })
        .collect();

    let Some(origin) = moving_average.first().map(|p| p.date) else {
        warn!(log, "not enough observations for the moving average";
            "window_size" => window_size, "available" => dated.len());
        return Err(Error::InsufficientWindow {
            window: window_size,
            available: dated.len(),
        });
    };

    let points: Vec<(f64, f64)> = moving_average
        .iter()
        .map(|p| ((p.date - origin).num_days() as f64, p.value))
        .collect();

    let fit = stats::linear_fit(&points).ok_or(Error::InsufficientWindow {
        window: window_size,
        available: dated.len(),
    })?;
    let direction = TrendDirection::from_slope(fit.slope);

    debug!(log, "trend computed";
        "points" => moving_average.len(),
        "slope" => format!("{:.5}", fit.slope),
        "intercept" => format!("{:.2}", fit.intercept),
        "direction" => %direction,
    );

    Ok(TrendResult {
        indicator,
        parcel: parcel.cloned(),
        window_size,
        moving_average,
        slope: fit.slope,
        intercept: fit.intercept,
        direction,
    })
}
