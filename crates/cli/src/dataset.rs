use anyhow::{Context, Result};
use common::config;
use common::types::{Observation, ParcelId, WeatherRecord, YieldRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// 解析対象のデータ一式。どのテーブルも省略可能（空として扱う）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub observations: Vec<Observation>,
    #[serde(default)]
    pub yield_history: Vec<YieldRecord>,
    #[serde(default)]
    pub weather: Vec<WeatherRecord>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse dataset: {}", path.display()))
    }

    /// 観測・収量履歴のいずれかに現れる圃場ID（昇順、重複なし）
    pub fn parcel_ids(&self) -> Vec<ParcelId> {
        let ids: BTreeSet<&ParcelId> = self
            .observations
            .iter()
            .map(|r| &r.parcel_id)
            .chain(self.yield_history.iter().map(|r| &r.parcel_id))
            .collect();
        ids.into_iter().cloned().collect()
    }

    /// 収量履歴に現れる圃場ID（出現順、重複なし）
    pub fn yield_parcel_ids(&self) -> Vec<ParcelId> {
        let mut seen = BTreeSet::new();
        self.yield_history
            .iter()
            .filter(|r| seen.insert(&r.parcel_id))
            .map(|r| r.parcel_id.clone())
            .collect()
    }
}

/// `--data` 未指定時は設定の `DATASET_PATH` を使う
pub fn resolve_path(data: Option<PathBuf>) -> PathBuf {
    data.unwrap_or_else(|| {
        PathBuf::from(config::get_or(
            "DATASET_PATH",
            config::config().data.dataset_path.clone(),
        ))
    })
}
