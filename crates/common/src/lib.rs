pub mod config;
pub mod types;

type Result<T> = anyhow::Result<T>;
