//! Pipeline orchestrator for Lectern.
//!
//! Runs the five stages of one lecture job in order: download, segment,
//! transcribe, summarize, save. Scratch files registered along the way are
//! released after the run finishes, whether it succeeded or not.

use crate::audio::{download_audio, split_audio};
use crate::config::Settings;
use crate::error::{PipelineFailure, Stage};
use crate::job::LectureJob;
use crate::notes::{GenerationMode, NotesGenerator};
use crate::persist::{ResultStore, SaveResultInput, SqliteResultStore};
use crate::scratch::ScratchSet;
use crate::transcription::{transcribe_chunks, Transcriber, WhisperTranscriber};
use std::sync::Arc;
use tracing::{info, instrument};

/// The main orchestrator for the Lectern pipeline.
///
/// One `run` call consumes exactly one job. Whether multiple jobs run
/// concurrently is the queue layer's business, not this type's.
pub struct Pipeline {
    settings: Settings,
    transcriber: Arc<dyn Transcriber>,
    generator: NotesGenerator,
    store: Arc<dyn ResultStore>,
}

impl Pipeline {
    /// Create a pipeline with default collaborators wired from settings.
    pub fn new(settings: Settings) -> crate::error::Result<Self> {
        let transcriber: Arc<dyn Transcriber> =
            Arc::new(WhisperTranscriber::with_model(&settings.transcription.model));
        let store: Arc<dyn ResultStore> =
            Arc::new(SqliteResultStore::new(&settings.database_path())?);
        let generator = NotesGenerator::new(settings.generation.clone());

        std::fs::create_dir_all(settings.scratch_dir())?;

        Ok(Self {
            settings,
            transcriber,
            generator,
            store,
        })
    }

    /// Create a pipeline with custom collaborators (used in tests and by
    /// embedders that bring their own services).
    pub fn with_components(
        settings: Settings,
        transcriber: Arc<dyn Transcriber>,
        generator: NotesGenerator,
        store: Arc<dyn ResultStore>,
    ) -> crate::error::Result<Self> {
        std::fs::create_dir_all(settings.scratch_dir())?;

        Ok(Self {
            settings,
            transcriber,
            generator,
            store,
        })
    }

    /// Run the pipeline for one job.
    ///
    /// Cleanup of every scratch file the run created happens on every exit
    /// path; the operator `keep_scratch` override is the only exception.
    #[instrument(skip(self, job), fields(lecture_id = %job.lecture_id))]
    pub async fn run(&self, job: &LectureJob) -> std::result::Result<RunSummary, PipelineFailure> {
        let mut scratch = ScratchSet::new(self.settings.general.keep_scratch);
        let result = self.run_stages(job, &mut scratch).await;
        scratch.release_all();

        match &result {
            Ok(summary) => info!(
                "Run complete: {} chunk(s), {} transcript word(s), degraded={}",
                summary.chunk_count, summary.transcript_words, summary.degraded
            ),
            Err(failure) => info!("Run failed at stage={}", failure.stage),
        }

        result
    }

    async fn run_stages(
        &self,
        job: &LectureJob,
        scratch: &mut ScratchSet,
    ) -> std::result::Result<RunSummary, PipelineFailure> {
        job.validate()
            .map_err(|e| PipelineFailure::new(Stage::Intake, e))?;

        info!("stage=download");
        let source = download_audio(&job.source_url, &self.settings.scratch_dir())
            .await
            .map_err(|e| PipelineFailure::new(Stage::Download, e))?;
        scratch.register(&source);

        info!("stage=segment");
        let chunks = split_audio(&source, &self.settings.audio)
            .await
            .map_err(|e| PipelineFailure::new(Stage::Segment, e))?;
        // Registered after the call returns; the fan-out below never
        // mutates the scratch set.
        for chunk in &chunks {
            scratch.register(&chunk.path);
        }

        info!("stage=transcribe");
        let transcript = transcribe_chunks(
            self.transcriber.as_ref(),
            &chunks,
            self.settings.transcription.max_concurrent_chunks,
        )
        .await
        .map_err(|e| PipelineFailure::new(Stage::Transcribe, e))?;

        info!("stage=summarize");
        let mode = if job.strict_coverage {
            GenerationMode::TopicMapGuided(self.generator.extract_topic_map(&transcript).await)
        } else {
            GenerationMode::Direct
        };

        let outcome = self
            .generator
            .generate(&transcript, mode)
            .await
            .map_err(|e| PipelineFailure::new(Stage::Summarize, e))?;
        let degraded = outcome.is_degraded();

        info!("stage=save");
        let transcript_words = transcript.split_whitespace().count();
        self.store
            .save_result(&SaveResultInput {
                lecture_id: job.lecture_id.clone(),
                owner_id: job.owner_id.clone(),
                transcript,
                notes: outcome.into_notes(),
            })
            .await
            .map_err(|e| PipelineFailure::new(Stage::Save, e))?;

        Ok(RunSummary {
            lecture_id: job.lecture_id.clone(),
            chunk_count: chunks.len(),
            transcript_words,
            degraded,
        })
    }
}

/// Result of one pipeline run.
#[derive(Debug)]
pub struct RunSummary {
    pub lecture_id: String,
    /// Number of audio chunks transcribed.
    pub chunk_count: usize,
    /// Word count of the assembled transcript.
    pub transcript_words: usize,
    /// Whether the notes artifact is a degraded (empty) fallback.
    pub degraded: bool,
}
