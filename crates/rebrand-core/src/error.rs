use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum RebrandError {
    #[error("{} not found.", path.display())]
    MissingMetadataFile { path: PathBuf },
    #[error(
        "App name not found in {}. Please ensure \"name\" key exists in your app.json file.",
        path.display()
    )]
    MissingAppKey { path: PathBuf },
    #[error("{} not found.", path.display())]
    TargetNotFound { path: PathBuf },
    #[error("Invalid bundle id '{bundle_id}': {reason}")]
    InvalidBundleId { bundle_id: String, reason: String },
    #[error("Aborted: {message}")]
    Aborted { message: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to parse XML in {}: {message}", path.display())]
    Xml { path: PathBuf, message: String },
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Glob error: {0}")]
    Glob(#[from] globset::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, RebrandError>;
