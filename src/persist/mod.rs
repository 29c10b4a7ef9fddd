//! Result persistence.
//!
//! The pipeline only writes; no read path is used by a run.

mod sqlite;

pub use sqlite::SqliteResultStore;

use crate::error::Result;
use crate::notes::LectureNotes;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The unit handed to persistence at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResultInput {
    pub lecture_id: String,
    pub owner_id: Option<String>,
    pub transcript: String,
    pub notes: LectureNotes,
}

/// Trait for the persistence collaborator.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist one pipeline result.
    async fn save_result(&self, input: &SaveResultInput) -> Result<()>;
}
