//! Lecture notes data model and response mapping.
//!
//! The generation model returns JSON that is close to, but not reliably,
//! the requested schema. Mapping is therefore permissive: known key aliases
//! are accepted, scalars are coerced to strings, and missing arrays default
//! to empty. A response that is not JSON at all degrades to an empty,
//! well-formed result rather than failing the run.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One section of the generated notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSection {
    pub title: String,
    /// Teaching prose for the section, paragraphs separated by blank lines.
    pub content: String,
    /// Key takeaways; absent when the model returned none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullets: Option<Vec<String>>,
}

/// The final structured notes artifact.
///
/// `outline` is expected to mirror the section titles but this is not
/// enforced; a mismatch is a generation defect, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LectureNotes {
    pub title: String,
    pub summary: String,
    pub outline: Vec<String>,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub sections: Vec<NoteSection>,
}

impl LectureNotes {
    /// Empty but well-formed notes, used when generation output is unusable.
    pub fn empty() -> Self {
        Self {
            title: String::new(),
            summary: String::new(),
            outline: Vec::new(),
            keywords: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// Map a parsed generation response into notes, permissively.
    pub fn from_response_value(value: &Value) -> Self {
        let summary = value
            .get("overview")
            .or_else(|| value.get("summary"))
            .map(coerce_string)
            .unwrap_or_default();

        let sections = value
            .get("sections")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(map_section).collect())
            .unwrap_or_default();

        Self {
            title: value.get("title").map(coerce_string).unwrap_or_default(),
            summary,
            outline: string_array(value.get("outline")),
            keywords: string_array(value.get("keywords")),
            sections,
        }
    }
}

fn map_section(value: &Value) -> NoteSection {
    let content = value
        .get("content")
        .or_else(|| value.get("summary"))
        .map(coerce_string)
        .unwrap_or_default();

    let bullets = value
        .get("bullets")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(coerce_string).collect());

    NoteSection {
        title: value.get("title").map(coerce_string).unwrap_or_default(),
        content,
        bullets,
    }
}

/// Coerce any scalar JSON value to a string; non-scalars become empty.
fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn string_array(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().map(coerce_string).collect())
        .unwrap_or_default()
}

/// Compute the target section count for a transcript of `word_count` words.
///
/// One section per ~400 words, floored at 4 and capped at 15 so notes
/// density scales with content length without unbounded growth.
pub fn target_section_count(word_count: usize) -> usize {
    ((word_count as f64 / 400.0).round() as usize).clamp(4, 15)
}

/// Outcome of a generation call.
///
/// `Degraded` means the response could not be parsed and the run continued
/// with an empty artifact; it is logged but never treated as failure.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Parsed(LectureNotes),
    Degraded(LectureNotes),
}

impl GenerationOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, GenerationOutcome::Degraded(_))
    }

    pub fn into_notes(self) -> LectureNotes {
        match self {
            GenerationOutcome::Parsed(notes) | GenerationOutcome::Degraded(notes) => notes,
        }
    }
}
