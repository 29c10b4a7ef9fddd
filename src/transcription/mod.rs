//! Transcription module for Lectern.
//!
//! Defines the speech-to-text service boundary and the chunk fan-out that
//! turns an ordered list of audio chunks into one transcript.

mod whisper;

pub use whisper::WhisperTranscriber;

use crate::audio::AudioChunk;
use crate::error::{LecternError, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{info, instrument};

/// Trait for speech-to-text services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a single audio file to plain text.
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}

/// Transcribe all chunks concurrently and join the texts in sequence order.
///
/// Results are collected positionally (slot index == chunk sequence index),
/// never by completion order. The first chunk failure aborts the whole
/// fan-out; there is no partial-result degradation.
#[instrument(skip_all, fields(chunks = chunks.len()))]
pub async fn transcribe_chunks(
    transcriber: &dyn Transcriber,
    chunks: &[AudioChunk],
    max_concurrent: usize,
) -> Result<String> {
    if chunks.is_empty() {
        return Ok(String::new());
    }

    info!("Transcribing {} chunk(s)", chunks.len());

    let pb = ProgressBar::new(chunks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {spinner:.green} Transcribe [{bar:30.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );

    let mut texts: Vec<Option<String>> = vec![None; chunks.len()];

    let mut in_flight = stream::iter(chunks.iter())
        .map(|chunk| async move {
            let result = transcriber.transcribe(&chunk.path).await;
            (chunk.sequence_index, result)
        })
        .buffer_unordered(max_concurrent.max(1));

    while let Some((idx, result)) = in_flight.next().await {
        pb.inc(1);
        match result {
            Ok(text) => match texts.get_mut(idx) {
                Some(slot) => *slot = Some(text),
                None => {
                    pb.finish_and_clear();
                    return Err(LecternError::Transcription(format!(
                        "chunk index {} out of range",
                        idx
                    )));
                }
            },
            Err(e) => {
                pb.finish_and_clear();
                return Err(LecternError::Transcription(format!(
                    "chunk {} failed: {}",
                    idx, e
                )));
            }
        }
    }

    pb.finish_and_clear();

    let joined = texts
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    /// Transcriber that answers from a fixed table, with per-chunk delays so
    /// completion order differs from submission order.
    struct ScriptedTranscriber;

    #[async_trait]
    impl Transcriber for ScriptedTranscriber {
        async fn transcribe(&self, audio_path: &Path) -> Result<String> {
            let name = audio_path.file_name().unwrap().to_string_lossy().to_string();
            // Later chunks finish first.
            let (delay_ms, text) = match name.as_str() {
                "part-000.mp3" => (30, "alpha"),
                "part-001.mp3" => (20, "beta"),
                "part-002.mp3" => (5, "gamma"),
                _ => return Err(LecternError::Transcription("unknown chunk".into())),
            };
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok(text.to_string())
        }
    }

    struct FailingTranscriber;

    #[async_trait]
    impl Transcriber for FailingTranscriber {
        async fn transcribe(&self, audio_path: &Path) -> Result<String> {
            let name = audio_path.file_name().unwrap().to_string_lossy().to_string();
            if name == "part-001.mp3" {
                Err(LecternError::Transcription("service unavailable".into()))
            } else {
                Ok("ok".to_string())
            }
        }
    }

    fn chunks() -> Vec<AudioChunk> {
        (0..3)
            .map(|i| AudioChunk::new(PathBuf::from(format!("part-{:03}.mp3", i)), i))
            .collect()
    }

    #[tokio::test]
    async fn test_out_of_order_completion_preserves_sequence() {
        let transcript = transcribe_chunks(&ScriptedTranscriber, &chunks(), 3)
            .await
            .unwrap();
        assert_eq!(transcript, "alpha beta gamma");
    }

    #[tokio::test]
    async fn test_single_failure_fails_fan_out() {
        let err = transcribe_chunks(&FailingTranscriber, &chunks(), 3)
            .await
            .unwrap_err();
        match err {
            LecternError::Transcription(msg) => {
                assert!(msg.contains("chunk 1"));
                assert!(msg.contains("service unavailable"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_chunk_list() {
        let transcript = transcribe_chunks(&ScriptedTranscriber, &[], 3).await.unwrap();
        assert_eq!(transcript, "");
    }

    #[tokio::test]
    async fn test_concurrency_of_one_still_ordered() {
        let transcript = transcribe_chunks(&ScriptedTranscriber, &chunks(), 1)
            .await
            .unwrap();
        assert_eq!(transcript, "alpha beta gamma");
    }
}
