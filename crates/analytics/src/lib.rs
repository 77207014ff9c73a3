#![deny(warnings)]

pub mod error;
pub mod risk;
pub mod stats;
pub mod trend;
pub mod validation;

pub use error::{Error, Result};
pub use risk::{RiskAssessment, RiskLevel, RiskSummary, RiskThresholds, classify_risk};
pub use trend::{TrendDirection, TrendResult, analyze_trend};
pub use validation::{
    MetricsStore, RecommendationValidator, Suggestion, ValidationMetrics, YieldSource,
    prediction_accuracy, suggest_improvements,
};
