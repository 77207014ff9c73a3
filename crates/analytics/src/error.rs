use common::types::ParcelId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("The {table} table is empty")]
    EmptyTable { table: &'static str },
    #[error("No {table} rows for parcel {parcel}")]
    NotFound {
        table: &'static str,
        parcel: ParcelId,
    },
    #[error("Column '{field}' is missing from the {table} table")]
    MissingField {
        table: &'static str,
        field: &'static str,
    },
    #[error("Column '{field}' of the {table} table has {missing} missing value(s)")]
    IncompleteData {
        table: &'static str,
        field: &'static str,
        missing: usize,
    },
    #[error(
        "Insufficient data: a moving average over {window} observations needs at least {window} consecutive values, got {available} row(s)"
    )]
    InsufficientWindow { window: usize, available: usize },
    #[error("Relative accuracy is undefined: mean realized value is {mean_actual}")]
    UndefinedAccuracy { mean_actual: f64 },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;
