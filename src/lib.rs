//! Lectern - Lecture Notes Pipeline
//!
//! A worker crate that turns long-form lecture recordings into structured,
//! study-ready notes.
//!
//! # Overview
//!
//! Given a job naming a remote audio file, Lectern:
//! - downloads the recording to scratch storage
//! - re-encodes and splits it into size-bounded chunks with ffmpeg
//! - transcribes all chunks concurrently via the OpenAI Whisper API
//! - generates structured notes with an optional topic-coverage pass
//! - persists the result and releases every scratch file, success or not
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings and prompt templates
//! - `job` - Job payload delivered by the queue layer
//! - `audio` - Audio acquisition and segmentation
//! - `transcription` - Speech-to-text fan-out
//! - `notes` - Two-pass notes generation
//! - `persist` - Result persistence
//! - `scratch` - Scratch-file ownership tracking
//! - `pipeline` - Pipeline orchestration
//!
//! # Example
//!
//! ```rust,no_run
//! use lectern::config::Settings;
//! use lectern::job::LectureJob;
//! use lectern::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     let job = LectureJob::new("lec-042", "https://example.com/lecture.mp3");
//!     let summary = pipeline.run(&job).await?;
//!     println!("Transcribed {} chunks", summary.chunk_count);
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod job;
pub mod notes;
pub mod openai;
pub mod persist;
pub mod pipeline;
pub mod scratch;
pub mod transcription;

pub use error::{LecternError, PipelineFailure, Result, Stage};
