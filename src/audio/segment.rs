//! Audio segmentation.
//!
//! Re-encodes the source recording into chunks small enough for the
//! transcription service. Even a file under the size limit is re-encoded
//! once so every chunk reaches the service with the same codec and format.

use super::AudioChunk;
use crate::config::AudioSettings;
use crate::error::{LecternError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Approximate output byte rate at 128 kbps mono CBR.
const ASSUMED_BYTES_PER_SECOND: u64 = 16_000;

/// Lower bound on segment duration, seconds.
const MIN_SEGMENT_SECONDS: u32 = 30;

/// Upper bound on segment duration, seconds.
const MAX_SEGMENT_SECONDS: u32 = 600;

/// Split a source audio file into ordered, size-bounded MP3 chunks.
///
/// Files at or under `max_chunk_bytes` are re-encoded to a single chunk;
/// larger files are segmented at a duration that keeps each chunk under the
/// limit at the target bitrate. Chunk order follows the zero-padded part
/// number in the file name.
#[instrument(skip(settings), fields(input = %input.display()))]
pub async fn split_audio(input: &Path, settings: &AudioSettings) -> Result<Vec<AudioChunk>> {
    let dir = input
        .parent()
        .ok_or_else(|| LecternError::Encoding("input file has no parent directory".into()))?;
    let base = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio")
        .to_string();

    let size = std::fs::metadata(input)?.len();

    if size <= settings.max_chunk_bytes {
        debug!("File is {} bytes, single-chunk re-encode", size);
        let out = dir.join(format!("{}-part-001.mp3", base));
        encode_single(input, &out).await?;
        return Ok(vec![AudioChunk::new(out, 0)]);
    }

    let segment_seconds = settings
        .segment_seconds
        .unwrap_or_else(|| safe_segment_seconds(settings.max_chunk_bytes));
    info!(
        "File is {} bytes, segmenting at {}s per chunk",
        size, segment_seconds
    );

    let pattern = dir.join(format!("{}-part-%03d.mp3", base));
    encode_segments(input, &pattern, segment_seconds).await?;

    let mut files = collect_chunk_files(dir, &base)?;

    if files.is_empty() {
        // Degenerate encoder outcome; fall back to the single-chunk path.
        warn!("Segmentation produced no files, falling back to single chunk");
        let out = dir.join(format!("{}-part-001.mp3", base));
        encode_single(input, &out).await?;
        files = vec![out];
    }

    let chunks = files
        .into_iter()
        .enumerate()
        .map(|(idx, path)| AudioChunk::new(path, idx))
        .collect::<Vec<_>>();

    info!("Created {} audio chunk(s)", chunks.len());
    Ok(chunks)
}

/// Compute a segment duration that keeps each chunk under `max_bytes` at
/// the target bitrate, clamped to [30, 600] seconds with a 2-second margin.
pub fn safe_segment_seconds(max_bytes: u64) -> u32 {
    let raw = (max_bytes / ASSUMED_BYTES_PER_SECOND).saturating_sub(2);
    (raw as u32).clamp(MIN_SEGMENT_SECONDS, MAX_SEGMENT_SECONDS)
}

/// List generated chunk files in sequence order.
///
/// File names carry zero-padded part numbers, so lexicographic order equals
/// numeric order.
fn collect_chunk_files(dir: &Path, base: &str) -> Result<Vec<PathBuf>> {
    let prefix = format!("{}-part-", base);
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with(&prefix) && name.ends_with(".mp3")
        })
        .map(|entry| entry.path())
        .collect();
    files.sort();
    Ok(files)
}

/// Normalization arguments shared by every encode: audio-only, MP3,
/// 128 kbps CBR, mono, 16 kHz.
fn normalize_args(cmd: &mut Command) {
    cmd.arg("-vn")
        .arg("-codec:a")
        .arg("libmp3lame")
        .arg("-b:a")
        .arg("128k")
        .arg("-ac")
        .arg("1")
        .arg("-ar")
        .arg("16000");
}

/// Re-encode the whole input to one normalized MP3.
async fn encode_single(input: &Path, dest: &Path) -> Result<()> {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-i").arg(input);
    normalize_args(&mut cmd);
    cmd.arg("-y").arg("-loglevel").arg("error").arg(dest);
    run_ffmpeg(cmd).await
}

/// Re-encode and split into fixed-duration segments.
///
/// Timestamps are reset per segment so each chunk is independently
/// decodable, and only the first audio stream is kept.
async fn encode_segments(input: &Path, pattern: &Path, segment_seconds: u32) -> Result<()> {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-i").arg(input);
    normalize_args(&mut cmd);
    cmd.arg("-f")
        .arg("segment")
        .arg("-segment_time")
        .arg(segment_seconds.to_string())
        .arg("-reset_timestamps")
        .arg("1")
        .arg("-map")
        .arg("0:a:0")
        .arg("-y")
        .arg("-loglevel")
        .arg("error")
        .arg(pattern);
    run_ffmpeg(cmd).await
}

async fn run_ffmpeg(mut cmd: Command) -> Result<()> {
    let result = cmd
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let stderr = String::from_utf8_lossy(&out.stderr);
            Err(LecternError::Encoding(format!("ffmpeg failed: {}", stderr)))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(LecternError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(LecternError::Encoding(format!("ffmpeg error: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_segment_seconds_default_limit() {
        // 15 MiB / 16 000 B/s - 2 = 981s, clamped to the 600s ceiling.
        assert_eq!(safe_segment_seconds(15 * 1024 * 1024), 600);
    }

    #[test]
    fn test_safe_segment_seconds_small_limit() {
        // 1 MiB / 16 000 B/s - 2 = 63s, within bounds.
        assert_eq!(safe_segment_seconds(1024 * 1024), 63);
    }

    #[test]
    fn test_safe_segment_seconds_floor() {
        // Tiny limits clamp to the 30s floor.
        assert_eq!(safe_segment_seconds(0), 30);
        assert_eq!(safe_segment_seconds(100_000), 30);
    }

    #[test]
    fn test_collect_chunk_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "talk-part-002.mp3",
            "talk-part-000.mp3",
            "talk-part-010.mp3",
            "talk-part-001.mp3",
            "other-part-000.mp3",
            "talk-part-003.txt",
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let files = collect_chunk_files(dir.path(), "talk").unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(
            names,
            vec![
                "talk-part-000.mp3",
                "talk-part-001.mp3",
                "talk-part-002.mp3",
                "talk-part-010.mp3",
            ]
        );
    }

    #[test]
    fn test_chunk_indexes_follow_sort_order() {
        let paths = vec![
            PathBuf::from("/tmp/a-part-000.mp3"),
            PathBuf::from("/tmp/a-part-001.mp3"),
        ];
        let chunks: Vec<AudioChunk> = paths
            .into_iter()
            .enumerate()
            .map(|(idx, p)| AudioChunk::new(p, idx))
            .collect();
        assert_eq!(chunks[0].sequence_index, 0);
        assert_eq!(chunks[1].sequence_index, 1);
    }
}
