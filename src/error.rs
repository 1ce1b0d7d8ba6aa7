use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanvasError {
    /// The model call failed or its reply was not usable JSON.
    #[error("generation failed: {0}")]
    UpstreamGeneration(String),
    #[error("path escapes the vault root: {}", .0.display())]
    PathTraversal(PathBuf),
    #[error("file already exists: {0}")]
    ArtifactExists(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CanvasError>;
