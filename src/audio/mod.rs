//! Audio acquisition and segmentation.
//!
//! Downloading is done over plain HTTP(S) with reqwest; segmentation shells
//! out to ffmpeg the same way the transcription chunking does elsewhere in
//! the ecosystem.

mod download;
mod segment;

pub use download::download_audio;
pub use segment::{safe_segment_seconds, split_audio};

use std::path::PathBuf;

/// A bounded-size slice of the source audio, transcribed independently.
///
/// `sequence_index` is the sole ordering key; chunks may complete
/// transcription in any order but are always reassembled by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    pub path: PathBuf,
    pub sequence_index: usize,
}

impl AudioChunk {
    pub fn new(path: impl Into<PathBuf>, sequence_index: usize) -> Self {
        Self {
            path: path.into(),
            sequence_index,
        }
    }
}
