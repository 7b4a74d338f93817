//! Error types for manipulator node operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArmdError>;

#[derive(Error, Debug)]
pub enum ArmdError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Planner protocol error: {0}")]
    Protocol(String),

    #[error("Planning request failed: {0}")]
    Planning(String),

    #[error("Tokio task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
