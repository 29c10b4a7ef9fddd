//! Configuration module for Lectern.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ExtractionPrompts, NotesPrompts, Prompts};
pub use settings::{
    AudioSettings, GenerationSettings, GeneralSettings, Settings, TranscriptionSettings,
};
