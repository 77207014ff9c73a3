use serde::{Deserialize, Serialize};

/// 算術平均。空の場合は `None`
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// 末尾揃えの単純移動平均を計算
///
/// 戻り値は入力と同じ長さ。窓が埋まっていない位置と、窓内に欠損を含む位置は `None`。
pub fn moving_average(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let sum: f64 = values[i + 1 - period..=i].iter().copied().sum::<Option<f64>>()?;
            Some(sum / period as f64)
        })
        .collect()
}

/// 最小二乗法による直線 `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// 線形回帰（通常最小二乗法）
///
/// 点が無ければ `None`。x の分散が 0（1点のみ、または全点が同じ x）の場合は
/// 傾き 0、切片は y の平均とする。
pub fn linear_fit(points: &[(f64, f64)]) -> Option<LinearFit> {
    let n = points.len() as f64;
    if points.is_empty() {
        return None;
    }

    let x_mean = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let y_mean = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
        let dx = x - x_mean;
        (sxy + dx * (y - y_mean), sxx + dx * dx)
    });

    if sxx == 0.0 {
        return Some(LinearFit {
            slope: 0.0,
            intercept: y_mean,
        });
    }

    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}
