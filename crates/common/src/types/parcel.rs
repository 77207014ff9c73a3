use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;

/// 圃場（parcelle）の識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ParcelId(String);

impl ParcelId {
    pub fn new(id: impl Into<String>) -> Self {
        ParcelId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParcelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ParcelId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ParcelId(s.to_string()))
    }
}

impl From<&str> for ParcelId {
    fn from(value: &str) -> Self {
        ParcelId(value.to_string())
    }
}

impl From<String> for ParcelId {
    fn from(value: String) -> Self {
        ParcelId(value)
    }
}

impl From<ParcelId> for String {
    fn from(value: ParcelId) -> Self {
        value.0
    }
}
