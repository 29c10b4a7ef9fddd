//! Audio acquisition.
//!
//! Fetches the source recording to scratch storage. Redirects are
//! intentionally not followed: callers must supply a direct resource URL, so
//! a 3xx answer is treated as caller error rather than silently chased.

use crate::error::{LecternError, Result};
use futures::StreamExt;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Minimum plausible size for a real recording. Anything smaller is treated
/// as a corrupt or empty transfer.
const MIN_DOWNLOAD_BYTES: u64 = 1024;

/// Download the audio at `url` into `scratch_dir`.
///
/// Returns the path of the downloaded file. The file name is derived from
/// the URL path, sanitized, and prefixed with a millisecond timestamp so
/// concurrent runs never collide.
#[instrument(skip(scratch_dir), fields(url = %url))]
pub async fn download_audio(url: &str, scratch_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(scratch_dir)?;

    let file_name = derive_file_name(url);
    let dest = scratch_dir.join(format!(
        "{}-{}",
        chrono::Utc::now().timestamp_millis(),
        file_name
    ));

    info!("Downloading audio to {:?}", dest);

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    let response = client.get(url).send().await?;
    let status = response.status();

    if status.is_redirection() {
        return Err(LecternError::RedirectNotFollowed {
            status: status.as_u16(),
        });
    }
    if status.as_u16() >= 400 {
        return Err(LecternError::Download {
            status: status.as_u16(),
        });
    }

    let mut file = tokio::fs::File::create(&dest).await?;
    let mut stream = response.bytes_stream();
    let written = async {
        while let Some(bytes) = stream.next().await {
            file.write_all(&bytes?).await?;
        }
        file.flush().await?;
        Ok::<(), LecternError>(())
    }
    .await;
    drop(file);

    if let Err(e) = written {
        // A truncated transfer must not leave a partial file behind.
        let _ = tokio::fs::remove_file(&dest).await;
        return Err(e);
    }

    let size = tokio::fs::metadata(&dest).await?.len();
    if size < MIN_DOWNLOAD_BYTES {
        // Partial or empty transfer; remove it immediately rather than
        // leaving it to the run-level cleanup.
        let _ = tokio::fs::remove_file(&dest).await;
        return Err(LecternError::TooSmall { bytes: size });
    }

    debug!("Downloaded {} bytes", size);
    Ok(dest)
}

/// Derive a filesystem-safe name from the URL path.
///
/// Decodes percent-encoding, then replaces everything outside
/// `[A-Za-z0-9._-]` with underscores. Falls back to `audio.mp3` when the
/// URL has no usable path segment.
fn derive_file_name(url: &str) -> String {
    let segment = url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segments| segments.last().map(|s| s.to_string()))
        })
        .filter(|s| !s.is_empty());

    let raw = match segment {
        Some(s) => percent_decode_str(&s).decode_utf8_lossy().to_string(),
        None => return "audio.mp3".to_string(),
    };

    let sanitized: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        "audio.mp3".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response on an ephemeral port.
    async fn serve_once(response: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(&response).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn http_response(status_line: &str, extra_headers: &str, body: &[u8]) -> Vec<u8> {
        let mut response = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
            status_line,
            body.len(),
            extra_headers
        )
        .into_bytes();
        response.extend_from_slice(body);
        response
    }

    #[test]
    fn test_derive_file_name_decodes_and_sanitizes() {
        assert_eq!(
            derive_file_name("https://example.com/media/My%20Lecture%20(1).mp3"),
            "My_Lecture__1_.mp3"
        );
        assert_eq!(
            derive_file_name("https://example.com/audio/intro-week_2.mp3"),
            "intro-week_2.mp3"
        );
    }

    #[test]
    fn test_derive_file_name_fallback() {
        assert_eq!(derive_file_name("https://example.com/"), "audio.mp3");
        assert_eq!(derive_file_name("not a url"), "audio.mp3");
    }

    #[tokio::test]
    async fn test_download_success() {
        let body = vec![0x55u8; 4096];
        let base = serve_once(http_response("200 OK", "", &body)).await;
        let dir = tempfile::tempdir().unwrap();

        let path = download_audio(&format!("{}/lecture.mp3", base), dir.path())
            .await
            .unwrap();

        assert!(path.exists());
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 4096);
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.ends_with("-lecture.mp3"));
    }

    #[tokio::test]
    async fn test_download_rejects_redirect() {
        let base = serve_once(http_response(
            "301 Moved Permanently",
            "Location: https://elsewhere.example/\r\n",
            b"",
        ))
        .await;
        let dir = tempfile::tempdir().unwrap();

        let err = download_audio(&format!("{}/a.mp3", base), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LecternError::RedirectNotFollowed { status: 301 }
        ));
    }

    #[tokio::test]
    async fn test_download_rejects_error_status() {
        let base = serve_once(http_response("404 Not Found", "", b"missing")).await;
        let dir = tempfile::tempdir().unwrap();

        let err = download_audio(&format!("{}/a.mp3", base), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, LecternError::Download { status: 404 }));
    }

    #[tokio::test]
    async fn test_download_too_small_removes_partial() {
        let base = serve_once(http_response("200 OK", "", b"tiny")).await;
        let dir = tempfile::tempdir().unwrap();

        let err = download_audio(&format!("{}/a.mp3", base), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, LecternError::TooSmall { bytes: 4 }));

        // The partial file must not be left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_interrupted_transfer_removes_partial() {
        // Advertise 5000 bytes but close the connection after 2000.
        let mut response =
            b"HTTP/1.1 200 OK\r\nContent-Length: 5000\r\nConnection: close\r\n\r\n".to_vec();
        response.extend_from_slice(&[0x55u8; 2000]);
        let base = serve_once(response).await;
        let dir = tempfile::tempdir().unwrap();

        let err = download_audio(&format!("{}/a.mp3", base), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, LecternError::Http(_)));

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
