use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::ProbeError;

/// Reads a clip's duration in seconds with `ffprobe`.
pub fn probe_duration(path: &Path) -> Result<f64, ProbeError> {
    let output = Command::new("ffprobe")
        .stdin(Stdio::null())
        .args(["-v", "error"])
        .args(["-show_entries", "format=duration"])
        .args(["-of", "default=noprint_wrappers=1:nokey=1"])
        .arg(path)
        .output()?;

    if !output.status.success() {
        return Err(ProbeError::Failed {
            path: path.display().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let duration = parse_duration(&String::from_utf8_lossy(&output.stdout))?;
    debug!(path = %path.display(), duration, "probed clip");
    Ok(duration)
}

/// Parses ffprobe's bare `format=duration` output.
pub fn parse_duration(output: &str) -> Result<f64, ProbeError> {
    let trimmed = output.trim();
    match trimmed.lines().next().map(str::trim).map(str::parse::<f64>) {
        Some(Ok(value)) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(ProbeError::Unparseable { output: trimmed.to_string() }),
    }
}

/// Maps a clip URI from the slide config onto a file under `media_root`.
/// Site-absolute URIs (`/video/a.mp4`) are taken relative to the root.
pub fn resolve_clip(media_root: &Path, uri: &str) -> PathBuf {
    media_root.join(uri.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_duration() {
        assert_eq!(parse_duration("12.480000\n").unwrap(), 12.48);
    }

    #[test]
    fn rejects_na_and_empty() {
        assert!(matches!(parse_duration("N/A\n"), Err(ProbeError::Unparseable { .. })));
        assert!(matches!(parse_duration(""), Err(ProbeError::Unparseable { .. })));
        assert!(matches!(parse_duration("0.0"), Err(ProbeError::Unparseable { .. })));
    }

    #[test]
    fn resolves_site_absolute_uris() {
        let root = Path::new("/srv/site/public");
        assert_eq!(resolve_clip(root, "/video/a.mp4"), PathBuf::from("/srv/site/public/video/a.mp4"));
        assert_eq!(resolve_clip(root, "video/b.mp4"), PathBuf::from("/srv/site/public/video/b.mp4"));
    }
}
