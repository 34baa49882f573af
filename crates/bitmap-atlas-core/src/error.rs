use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Malformed authored structure; `item` names the offending root item.
    #[error("Invalid item `{item}`: {reason}")]
    Validation { item: String, reason: String },
    /// Every candidate ordering failed to place at least one block.
    #[error("No ordering placed all {blocks} blocks ({attempts} attempts)")]
    PackingExhausted { blocks: usize, attempts: usize },
    #[error("Invalid atlas dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Encoding error: {0}")]
    Encode(String),
}

impl AtlasError {
    pub(crate) fn validation(item: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            item: item.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AtlasError>;
