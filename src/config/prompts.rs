//! Prompt templates for Lectern.
//!
//! Templates use `{{variable}}` placeholders rendered at call time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub notes: NotesPrompts,
    pub extraction: ExtractionPrompts,
}

/// Prompts for the main notes-generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesPrompts {
    pub system: String,
    pub user: String,
}

impl Default for NotesPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an academic assistant producing comprehensive, detailed study notes for students.

CRITICAL: These notes must be COMPLETE and DESCRIPTIVE enough that students can learn the material entirely from the notes alone, without needing the original source material. DO NOT SUMMARIZE - you are creating complete teaching material that replaces the original lecture.

Requirements:
- Output strictly valid JSON (no markdown). If unsure, make a best effort.
- Fields:
  - title: A concise, descriptive lecture title (5-10 words, in title case)
  - overview: 5-7 sentence executive overview of the entire lecture
  - sections: array of objects. Each has:
    - title: clear, descriptive topic heading
    - content: COMPLETE and DETAILED teaching explanation (a single string with paragraphs separated by \n\n). Preserve every worked example with all steps shown, explain the reasoning behind every concept, and note common mistakes or pitfalls if mentioned.
    - bullets: 6-12 key takeaways, formulas, definitions, or worked example references
  - outline: string[] of section titles in order
  - keywords: 15-25 domain terms, concepts, or entities

Formatting rules:
- Inline mathematics in \( ... \), displayed mathematics in \[ ... \].
- Code in fenced blocks with a language tag.

Constraints:
- Be faithful to the transcript; do not hallucinate or omit important details.
- Prioritize COMPLETENESS over brevity.
- Write in clear, educational prose with full sentences and paragraphs.
- When the user provides numeric targets (e.g., desired section count), follow those targets.
- Prefer more sections with thorough coverage over fewer shallow sections.
- Adapt your writing style and terminology to match the subject matter."#
                .to_string(),

            user: r#"Transcript length: ~{{word_count}} words. Produce approximately {{target_sections}} sections (split logically by topic/concept).

Each section must teach its topic completely: define terms, show every step of every worked example, and explain why each step is taken. Sections that merely reference an example without showing it are unacceptable.
{{coverage}}
Transcript follows:

{{transcript}}"#
                .to_string(),
        }
    }
}

/// Prompts for the topic-map extraction call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionPrompts {
    pub system: String,
    pub user: String,
}

impl Default for ExtractionPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a content analyst extracting a structured topic map from a lecture transcript.

Output strictly valid JSON with EXACTLY this shape (every field present, empty arrays/objects where nothing applies):
{
  "topics": ["..."],
  "subtopics": {"topic": ["..."]},
  "examples": [{"title": "...", "context": "..."}],
  "experiments": [{"title": "...", "purpose": "..."}],
  "entities": ["..."],
  "formulas": ["..."],
  "key_terms": ["..."]
}

Rules:
- topics: every distinct subject the lecture covers, in order of appearance
- subtopics: finer-grained points grouped under their topic
- examples: every worked example, case study, or illustration
- experiments: every experiment or demonstration described
- entities: named people, places, works, organizations, or systems
- formulas: every formula or equation stated, in plain notation
- key_terms: domain vocabulary a student must know
- Do not invent content. Omissions are acceptable; inventions are not."#
                .to_string(),

            user: "Extract the topic map from this lecture transcript:\n\n{{transcript}}".to_string(),
        }
    }
}

impl Prompts {
    /// Render a template, substituting `{{name}}` placeholders.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut rendered = template.to_string();
        for (name, value) in vars {
            rendered = rendered.replace(&format!("{{{{{}}}}}", name), value);
        }
        rendered
    }
}
