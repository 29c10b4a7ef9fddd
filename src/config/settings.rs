//! Configuration settings for Lectern.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub audio: AudioSettings,
    pub transcription: TranscriptionSettings,
    pub generation: GenerationSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for scratch files (downloaded audio, chunks).
    pub scratch_dir: String,
    /// Path to the SQLite results database.
    pub database_path: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Leave scratch files on disk after a run (debugging override).
    pub keep_scratch: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            scratch_dir: "/tmp/lectern".to_string(),
            database_path: "~/.lectern/results.db".to_string(),
            log_level: "info".to_string(),
            keep_scratch: false,
        }
    }
}

/// Audio segmentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Maximum size of a single chunk submitted to transcription.
    pub max_chunk_bytes: u64,
    /// Override for the computed segment duration, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_seconds: Option<u32>,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            max_chunk_bytes: 15 * 1024 * 1024,
            segment_seconds: None,
        }
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Speech-to-text model to use.
    pub model: String,
    /// Maximum concurrent chunk transcriptions.
    pub max_concurrent_chunks: usize,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            max_concurrent_chunks: 3,
        }
    }
}

/// Notes generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Model for the main notes-generation call.
    pub model: String,
    /// Model for the topic-map extraction call.
    pub extraction_model: String,
    /// Temperature for the main generation call.
    pub temperature: f32,
    /// Temperature for the extraction call (kept low for schema fidelity).
    pub extraction_temperature: f32,
    /// Token budget for the main generation call.
    pub max_tokens: u32,
    /// Transcript prefix length submitted to the model, in characters.
    pub max_transcript_chars: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            extraction_model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            extraction_temperature: 0.1,
            max_tokens: 16384,
            max_transcript_chars: 120_000,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment overrides (`AUDIO_MAX_BYTES`, `LECTERN_TMP_DIR`,
    /// `KEEP_TMP`, `OPENAI_MODEL`) are applied after the file is read so
    /// operators can tune a deployed worker without editing its config.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Apply environment-variable overrides for the operational tunables.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var("AUDIO_MAX_BYTES") {
            if let Ok(bytes) = raw.parse::<u64>() {
                self.audio.max_chunk_bytes = bytes;
            }
        }
        if let Ok(dir) = std::env::var("LECTERN_TMP_DIR") {
            self.general.scratch_dir = dir;
        }
        if std::env::var("KEEP_TMP").is_ok_and(|v| !v.is_empty() && v != "0") {
            self.general.keep_scratch = true;
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            self.generation.model = model;
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lectern")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded scratch directory path.
    pub fn scratch_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.scratch_dir)
    }

    /// Get the expanded database path.
    pub fn database_path(&self) -> PathBuf {
        Self::expand_path(&self.general.database_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.audio.max_chunk_bytes, 15 * 1024 * 1024);
        assert_eq!(settings.audio.segment_seconds, None);
        assert_eq!(settings.transcription.max_concurrent_chunks, 3);
        assert_eq!(settings.generation.max_transcript_chars, 120_000);
        assert!(!settings.general.keep_scratch);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml = r#"
            [audio]
            max_chunk_bytes = 1048576

            [generation]
            model = "gpt-4o-mini"
        "#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.audio.max_chunk_bytes, 1_048_576);
        assert_eq!(settings.generation.model, "gpt-4o-mini");
        assert_eq!(settings.transcription.model, "whisper-1");
    }

    #[test]
    fn test_settings_round_trip() {
        let settings = Settings::default();
        let serialized = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.generation.max_tokens, settings.generation.max_tokens);
    }
}
