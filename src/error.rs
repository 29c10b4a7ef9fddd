//! Error types for Lectern.

use thiserror::Error;

/// Library-level error type for Lectern operations.
#[derive(Error, Debug)]
pub enum LecternError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Download failed: HTTP {status}")]
    Download { status: u16 },

    #[error("Redirect not followed: HTTP {status}. Use a direct URL.")]
    RedirectNotFollowed { status: u16 },

    #[error("Downloaded file too small: {bytes} bytes")]
    TooSmall { bytes: u64 },

    #[error("Audio encoding failed: {0}")]
    Encoding(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Notes generation failed: {0}")]
    Generation(String),

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for Lectern operations.
pub type Result<T> = std::result::Result<T, LecternError>;

/// Pipeline stage labels, attached to failures for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Intake,
    Download,
    Segment,
    Transcribe,
    Summarize,
    Save,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Stage::Intake => "intake",
            Stage::Download => "download",
            Stage::Segment => "segment",
            Stage::Transcribe => "transcribe",
            Stage::Summarize => "summarize",
            Stage::Save => "save",
        };
        write!(f, "{}", label)
    }
}

/// A pipeline failure tagged with the stage it originated from.
///
/// The queue layer receives exactly one of these per failed job and applies
/// its own retry policy; the stage label is purely diagnostic.
#[derive(Error, Debug)]
#[error("stage={stage}: {source}")]
pub struct PipelineFailure {
    pub stage: Stage,
    #[source]
    pub source: LecternError,
}

impl PipelineFailure {
    pub fn new(stage: Stage, source: LecternError) -> Self {
        Self { stage, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels() {
        assert_eq!(Stage::Download.to_string(), "download");
        assert_eq!(Stage::Save.to_string(), "save");
    }

    #[test]
    fn test_failure_display_carries_stage() {
        let failure = PipelineFailure::new(
            Stage::Transcribe,
            LecternError::Transcription("chunk 2 failed".into()),
        );
        let msg = failure.to_string();
        assert!(msg.contains("stage=transcribe"));
        assert!(msg.contains("chunk 2 failed"));
    }
}
