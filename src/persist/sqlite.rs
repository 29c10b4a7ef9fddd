//! SQLite-backed result store.

use super::{ResultStore, SaveResultInput};
use crate::error::{LecternError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, instrument};

/// SQLite-backed implementation of [`ResultStore`].
pub struct SqliteResultStore {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS lecture_results (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        lecture_id TEXT NOT NULL,
        owner_id TEXT,
        transcript TEXT NOT NULL,
        title TEXT NOT NULL,
        summary TEXT NOT NULL,
        outline TEXT NOT NULL,
        keywords TEXT NOT NULL,
        sections TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_lecture_results_lecture_id
        ON lecture_results(lecture_id);
"#;

impl SqliteResultStore {
    /// Open (or create) the results database at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized results store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    #[cfg(test)]
    fn count_rows(&self, lecture_id: &str) -> Result<i64> {
        let conn = self.conn.lock().expect("results store mutex poisoned");
        let count = conn.query_row(
            "SELECT COUNT(*) FROM lecture_results WHERE lecture_id = ?1",
            params![lecture_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[async_trait]
impl ResultStore for SqliteResultStore {
    #[instrument(skip_all, fields(lecture_id = %input.lecture_id))]
    async fn save_result(&self, input: &SaveResultInput) -> Result<()> {
        let outline = serde_json::to_string(&input.notes.outline)?;
        let keywords = serde_json::to_string(&input.notes.keywords)?;
        let sections = serde_json::to_string(&input.notes.sections)?;

        let conn = self
            .conn
            .lock()
            .map_err(|_| LecternError::Persistence("results store mutex poisoned".into()))?;

        conn.execute(
            r#"
            INSERT INTO lecture_results
                (lecture_id, owner_id, transcript, title, summary, outline, keywords, sections, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                input.lecture_id,
                input.owner_id,
                input.transcript,
                input.notes.title,
                input.notes.summary,
                outline,
                keywords,
                sections,
                Utc::now().to_rfc3339(),
            ],
        )?;

        info!("Saved lecture result");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::{LectureNotes, NoteSection};

    fn sample_input() -> SaveResultInput {
        SaveResultInput {
            lecture_id: "lec-7".to_string(),
            owner_id: Some("user-1".to_string()),
            transcript: "full transcript text".to_string(),
            notes: LectureNotes {
                title: "Intro to Entropy".to_string(),
                summary: "Overview text".to_string(),
                outline: vec!["One".to_string(), "Two".to_string()],
                keywords: vec!["entropy".to_string()],
                sections: vec![NoteSection {
                    title: "One".to_string(),
                    content: "Body".to_string(),
                    bullets: Some(vec!["point".to_string()]),
                }],
            },
        }
    }

    #[tokio::test]
    async fn test_save_result_inserts_row() {
        let store = SqliteResultStore::in_memory().unwrap();
        store.save_result(&sample_input()).await.unwrap();
        assert_eq!(store.count_rows("lec-7").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_saved_arrays_round_trip_as_json() {
        let store = SqliteResultStore::in_memory().unwrap();
        store.save_result(&sample_input()).await.unwrap();

        let conn = store.conn.lock().unwrap();
        let (outline_json, sections_json): (String, String) = conn
            .query_row(
                "SELECT outline, sections FROM lecture_results WHERE lecture_id = 'lec-7'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();

        let outline: Vec<String> = serde_json::from_str(&outline_json).unwrap();
        assert_eq!(outline, vec!["One", "Two"]);

        let sections: Vec<NoteSection> = serde_json::from_str(&sections_json).unwrap();
        assert_eq!(sections[0].title, "One");
    }
}
