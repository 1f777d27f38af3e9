use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the generator
pub type Result<T> = std::result::Result<T, GenError>;

/// Errors that abort a generation run
#[derive(Debug, Error)]
pub enum GenError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("download failed for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse icon index: {0}")]
    Index(#[from] serde_json::Error),

    /// An icon name would produce an identifier starting with a digit.
    #[error("An icon can't have a number as the first character (icon: `{name}`)")]
    DataIntegrity { name: String },

    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    #[error("`{name}` still invalid after {attempts} forced downloads")]
    RetriesExhausted { name: String, attempts: u32 },

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("could not resolve project root: {0}")]
    ProjectRoot(String),
}

impl GenError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}
