// FFprobe wrapper for embedded tag extraction

use std::path::Path;
use std::process::Command;

use serde::Deserialize;

use crate::error::{EduscanError, Result};
use crate::metadata::{non_empty, FieldValues};

#[derive(Debug, Deserialize)]
struct FFprobeOutput {
    format: Option<FFprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FFprobeFormat {
    duration: Option<String>,
    tags: Option<FFprobeTags>,
}

#[derive(Debug, Deserialize)]
struct FFprobeTags {
    title: Option<String>,
    comment: Option<String>,
    description: Option<String>,
}

/// Run ffprobe on a video file and extract container-level metadata.
///
/// Only the format section is requested: duration plus any descriptive tags
/// the container carries. Failures (missing binary, unreadable file, bad
/// JSON) are reported as `EduscanError::FFprobe`; the scanner treats them as
/// an empty source.
pub fn probe(path: &Path) -> Result<FieldValues> {
    let output = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .map_err(|e| EduscanError::FFprobe(format!("Failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EduscanError::FFprobe(format!(
            "ffprobe failed on {}: {}",
            path.display(),
            stderr.trim()
        )));
    }

    let probe_output: FFprobeOutput = serde_json::from_slice(&output.stdout)
        .map_err(|e| EduscanError::FFprobe(format!("Failed to parse ffprobe output: {}", e)))?;

    let mut values = FieldValues::default();

    if let Some(format) = probe_output.format {
        values.duration_seconds = parse_duration_seconds(format.duration.as_deref());

        if let Some(tags) = format.tags {
            values.title = tags.title.as_deref().and_then(non_empty);
            // Containers disagree on which tag carries descriptive text
            values.description = tags
                .description
                .as_deref()
                .and_then(non_empty)
                .or_else(|| tags.comment.as_deref().and_then(non_empty));
        }
    }

    Ok(values)
}

/// Parse ffprobe's fractional-seconds duration string to whole seconds.
fn parse_duration_seconds(duration_str: Option<&str>) -> Option<i64> {
    let duration_str = duration_str?;
    let seconds: f64 = duration_str.parse().ok()?;
    if seconds < 0.0 {
        return None;
    }
    Some(seconds as i64)
}

/// Check if ffprobe is available on PATH.
pub fn is_available() -> bool {
    Command::new("ffprobe")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
