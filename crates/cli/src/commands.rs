pub mod parcels;
pub mod risk;
pub mod trend;
pub mod validate;

use anyhow::Result;
use serde::Serialize;

/// `--json` 指定時の出力（整形済み JSON を標準出力へ）
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
