//! Topic map extraction model.
//!
//! A topic map is a structured inventory of everything the lecture covers,
//! used in strict-coverage mode to stop the generation model from dropping
//! content. All fields are always present; an empty map is a valid map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A worked example or case study mentioned in the lecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TopicExample {
    pub title: String,
    pub context: String,
}

/// An experiment or demonstration described in the lecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TopicExperiment {
    pub title: String,
    pub purpose: String,
}

/// Structured extraction of distinct content elements from a transcript.
///
/// BTreeMap keeps subtopic enumeration deterministic across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TopicMap {
    pub topics: Vec<String>,
    pub subtopics: BTreeMap<String, Vec<String>>,
    pub examples: Vec<TopicExample>,
    pub experiments: Vec<TopicExperiment>,
    pub entities: Vec<String>,
    pub formulas: Vec<String>,
    pub key_terms: Vec<String>,
}

impl TopicMap {
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
            && self.subtopics.is_empty()
            && self.examples.is_empty()
            && self.experiments.is_empty()
            && self.entities.is_empty()
            && self.formulas.is_empty()
            && self.key_terms.is_empty()
    }

    /// Build the coverage-obligations block for the generation prompt.
    ///
    /// Every item enumerated here must be addressed in the final notes;
    /// repeated mentions may be consolidated but no distinct item dropped.
    pub fn coverage_instruction(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut out = String::from(
            "\nCOVERAGE OBLIGATIONS (strict): the following items were extracted from the \
             transcript. Every single one must be addressed somewhere in the notes. Repeated \
             mentions may be consolidated into one place, but no distinct item may be dropped. \
             You may exceed the target section count if needed to cover everything.\n",
        );

        push_list(&mut out, "Topics", &self.topics);
        if !self.subtopics.is_empty() {
            out.push_str("Subtopics:\n");
            for (topic, subs) in &self.subtopics {
                out.push_str(&format!("- {}: {}\n", topic, subs.join(", ")));
            }
        }
        if !self.examples.is_empty() {
            out.push_str("Examples:\n");
            for ex in &self.examples {
                out.push_str(&format!("- {} ({})\n", ex.title, ex.context));
            }
        }
        if !self.experiments.is_empty() {
            out.push_str("Experiments:\n");
            for ex in &self.experiments {
                out.push_str(&format!("- {} ({})\n", ex.title, ex.purpose));
            }
        }
        push_list(&mut out, "Entities", &self.entities);
        push_list(&mut out, "Formulas", &self.formulas);
        push_list(&mut out, "Key terms", &self.key_terms);

        out
    }
}

fn push_list(out: &mut String, label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(label);
    out.push_str(":\n");
    for item in items {
        out.push_str(&format!("- {}\n", item));
    }
}
