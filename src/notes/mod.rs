//! Two-pass notes generation.
//!
//! # Generation modes
//!
//! - **Direct** (default): one schema-locked generation call over the
//!   transcript.
//! - **TopicMapGuided**: a low-temperature extraction pass first builds a
//!   topic map, and the main call must address every item in it.

mod generator;
mod model;
mod topic_map;

pub use generator::{GenerationMode, NotesGenerator};
pub use model::{target_section_count, GenerationOutcome, LectureNotes, NoteSection};
pub use topic_map::{TopicExample, TopicExperiment, TopicMap};
