pub mod config;
pub mod gpx_util;
mod replay;
mod run_store;

pub use replay::*;
pub use run_store::*;

pub const DEFAULT_API_URL: &str = "http://localhost:1337/api";
pub const RUNS_PATH: &str = "/runs";

#[derive(Debug, thiserror::Error)]
pub enum DataManagerError {
    #[error("failed to read {0}")]
    Io(String),
    #[error("invalid GPX: {0}")]
    Gpx(String),
}
