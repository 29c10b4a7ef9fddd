//! Job payload delivered by the queue layer.

use crate::error::{LecternError, Result};
use serde::{Deserialize, Serialize};

/// One unit of pipeline work: a single lecture recording to process.
///
/// Immutable once accepted; `lecture_id` identifies exactly one pipeline run.
/// The wire shape matches the intake payload (camelCase, with the legacy
/// `fileUrl`/`userId` key spellings still accepted).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureJob {
    /// Caller-supplied unique identifier for this lecture.
    pub lecture_id: String,
    /// Direct URL of the source audio file.
    #[serde(alias = "fileUrl")]
    pub source_url: String,
    /// Optional owner of the resulting notes.
    #[serde(default, alias = "userId")]
    pub owner_id: Option<String>,
    /// Whether to run the topic-map extraction pass and enforce coverage.
    #[serde(default)]
    pub strict_coverage: bool,
}

impl LectureJob {
    pub fn new(lecture_id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            lecture_id: lecture_id.into(),
            source_url: source_url.into(),
            owner_id: None,
            strict_coverage: false,
        }
    }

    /// Validate that the required fields are present.
    ///
    /// The queue layer should never deliver a job without them, but a
    /// malformed payload must not start a pipeline run.
    pub fn validate(&self) -> Result<()> {
        if self.lecture_id.trim().is_empty() {
            return Err(LecternError::InvalidInput("lectureId is required".into()));
        }
        if self.source_url.trim().is_empty() {
            return Err(LecternError::InvalidInput("sourceUrl is required".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "lectureId": "lec-1",
            "sourceUrl": "https://example.com/a.mp3",
            "ownerId": "user-9",
            "strictCoverage": true
        }"#;

        let job: LectureJob = serde_json::from_str(json).unwrap();
        assert_eq!(job.lecture_id, "lec-1");
        assert_eq!(job.owner_id.as_deref(), Some("user-9"));
        assert!(job.strict_coverage);
    }

    #[test]
    fn test_deserialize_legacy_aliases() {
        let json = r#"{
            "lectureId": "lec-2",
            "fileUrl": "https://example.com/b.mp3",
            "userId": "user-3"
        }"#;

        let job: LectureJob = serde_json::from_str(json).unwrap();
        assert_eq!(job.source_url, "https://example.com/b.mp3");
        assert_eq!(job.owner_id.as_deref(), Some("user-3"));
        assert!(!job.strict_coverage);
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let job = LectureJob::new("", "https://example.com/a.mp3");
        assert!(job.validate().is_err());

        let job = LectureJob::new("lec-1", "  ");
        assert!(job.validate().is_err());

        let job = LectureJob::new("lec-1", "https://example.com/a.mp3");
        assert!(job.validate().is_ok());
    }
}
