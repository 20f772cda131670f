use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot read docset directory {}: {source}", path.display())]
    DocsetDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("docset '{docset}' has no entry index at {}", path.display())]
    MissingIndex { docset: String, path: PathBuf },

    #[error("docset '{docset}' has an unreadable entry index: {reason}")]
    CorruptIndex { docset: String, reason: String },

    #[error("no usable docsets to search")]
    NoDocsetsAvailable,

    #[error(
        "entry '{name}' ({docset}) points to a missing file: {}",
        path.display()
    )]
    UnresolvedEntry {
        name: String,
        docset: String,
        path: PathBuf,
    },

    #[error("finder failed: {0}")]
    Finder(String),

    #[error("viewer failed: {0}")]
    Viewer(String),
}

