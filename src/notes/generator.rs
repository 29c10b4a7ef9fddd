//! Two-pass notes generation.
//!
//! The optional first pass extracts a topic map with a low-temperature,
//! schema-locked call; failures there degrade to an empty map. The main
//! pass generates the notes themselves and is the only call whose transport
//! errors abort the run - its *parse* errors degrade instead.

use super::{target_section_count, GenerationOutcome, LectureNotes, TopicMap};
use crate::config::{GenerationSettings, Prompts};
use crate::error::{LecternError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

const TOP_P: f32 = 0.95;

/// How the main generation call is constrained.
///
/// Selected once, before the call; the two passes are never concurrent.
#[derive(Debug, Clone)]
pub enum GenerationMode {
    Direct,
    TopicMapGuided(TopicMap),
}

/// Drives the text-generation service to produce structured notes.
pub struct NotesGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    settings: GenerationSettings,
    prompts: Prompts,
}

impl NotesGenerator {
    pub fn new(settings: GenerationSettings) -> Self {
        Self {
            client: create_client(),
            settings,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts.
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// First pass: extract a topic map from the transcript.
    ///
    /// Never fails the run: any API or parse problem degrades to an empty
    /// map with a warning, and generation proceeds unguided.
    #[instrument(skip_all)]
    pub async fn extract_topic_map(&self, transcript: &str) -> TopicMap {
        match self.try_extract(transcript).await {
            Ok(map) => {
                info!(
                    "Extracted topic map: {} topic(s), {} example(s), {} entity(ies)",
                    map.topics.len(),
                    map.examples.len(),
                    map.entities.len()
                );
                map
            }
            Err(e) => {
                warn!("Topic map extraction failed, continuing without coverage: {}", e);
                TopicMap::default()
            }
        }
    }

    async fn try_extract(&self, transcript: &str) -> Result<TopicMap> {
        let mut vars = HashMap::new();
        vars.insert(
            "transcript".to_string(),
            truncate_chars(transcript, self.settings.max_transcript_chars).to_string(),
        );
        let user = Prompts::render(&self.prompts.extraction.user, &vars);

        let content = self
            .chat(
                &self.settings.extraction_model,
                &self.prompts.extraction.system,
                &user,
                self.settings.extraction_temperature,
                None,
            )
            .await?;

        Ok(serde_json::from_str(&content)?)
    }

    /// Main pass: generate the structured notes.
    ///
    /// Unparsable output degrades to an empty artifact; transport errors
    /// propagate.
    #[instrument(skip_all)]
    pub async fn generate(
        &self,
        transcript: &str,
        mode: GenerationMode,
    ) -> Result<GenerationOutcome> {
        let word_count = transcript.split_whitespace().count();
        let target_sections = target_section_count(word_count);
        debug!(
            "Transcript has {} words, targeting {} sections",
            word_count, target_sections
        );

        let coverage = match &mode {
            GenerationMode::Direct => String::new(),
            GenerationMode::TopicMapGuided(map) => map.coverage_instruction(),
        };

        let mut vars = HashMap::new();
        vars.insert("word_count".to_string(), word_count.to_string());
        vars.insert("target_sections".to_string(), target_sections.to_string());
        vars.insert("coverage".to_string(), coverage);
        vars.insert(
            "transcript".to_string(),
            truncate_chars(transcript, self.settings.max_transcript_chars).to_string(),
        );
        let user = Prompts::render(&self.prompts.notes.user, &vars);

        let content = self
            .chat(
                &self.settings.model,
                &self.prompts.notes.system,
                &user,
                self.settings.temperature,
                Some(self.settings.max_tokens),
            )
            .await?;

        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(value) => Ok(GenerationOutcome::Parsed(LectureNotes::from_response_value(
                &value,
            ))),
            Err(e) => {
                warn!("Generation response was not valid JSON, degrading: {}", e);
                Ok(GenerationOutcome::Degraded(LectureNotes::empty()))
            }
        }
    }

    /// Issue one JSON-object chat completion and return the raw content.
    async fn chat(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system.to_string())
                .build()
                .map_err(|e| LecternError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user.to_string())
                .build()
                .map_err(|e| LecternError::Generation(e.to_string()))?
                .into(),
        ];

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(model)
            .messages(messages)
            .temperature(temperature)
            .top_p(TOP_P)
            .response_format(ResponseFormat::JsonObject);
        if let Some(tokens) = max_tokens {
            builder.max_tokens(tokens);
        }

        let request = builder
            .build()
            .map_err(|e| LecternError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LecternError::Generation(format!("completion request failed: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_else(|| "{}".to_string());

        Ok(content)
    }
}

/// Truncate to at most `max_chars` characters on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
