// NFO descriptor file reader
// Course descriptors carry title/plot/director/year; lesson descriptors carry
// title/plot/runtime (minutes). Malformed files surface as DescriptorParse so
// the scanner can warn and fall through to lower-priority sources.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;

use crate::constants::{DESCRIPTOR_EXTENSION, RUNTIME_MINUTES_TO_SECONDS};
use crate::error::{EduscanError, Result};
use crate::metadata::{non_empty, FieldValues};
use crate::scan::discover::is_video_file;

/// Find the course-level descriptor: the first .nfo file (sorted by name)
/// directly inside the course directory.
pub fn find_course_descriptor(dir: &Path) -> Option<PathBuf> {
    let mut candidates = descriptor_files_in(dir);
    candidates.sort();
    candidates.into_iter().next()
}

/// Find the descriptor for a lesson file.
///
/// An exact stem match (`<video stem>.nfo` next to the video) always wins.
/// With flexible matching enabled, the first descriptor in the lesson's
/// directory not already claimed by another lesson is used instead; a
/// descriptor whose stem exact-matches a sibling video is reserved for that
/// video and never enters the flexible pool.
pub fn find_lesson_descriptor(
    video_path: &Path,
    flexible: bool,
    claimed: &HashSet<PathBuf>,
) -> Option<PathBuf> {
    let parent = video_path.parent()?;
    let stem = video_path.file_stem()?.to_str()?;

    for ext in [DESCRIPTOR_EXTENSION, "NFO"] {
        let exact = parent.join(format!("{}.{}", stem, ext));
        if exact.exists() {
            return Some(exact);
        }
    }

    if !flexible {
        return None;
    }

    let reserved = video_stems_in(parent);
    let mut candidates = descriptor_files_in(parent);
    candidates.sort();
    candidates.into_iter().find(|p| {
        let reserved_for_sibling = p
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| reserved.contains(s));
        !reserved_for_sibling && !claimed.contains(p)
    })
}

fn video_stems_in(dir: &Path) -> HashSet<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return HashSet::new(),
    };

    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_video_file(p))
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
        .collect()
}

fn descriptor_files_in(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(DESCRIPTOR_EXTENSION))
        })
        .collect()
}

enum DescriptorKind {
    Course,
    Lesson,
}

/// Parse a course-level descriptor (tvshow.nfo schema).
pub fn parse_course_nfo(path: &Path) -> Result<FieldValues> {
    parse_nfo(path, DescriptorKind::Course)
}

/// Parse a lesson-level descriptor (episode.nfo schema).
pub fn parse_lesson_nfo(path: &Path) -> Result<FieldValues> {
    parse_nfo(path, DescriptorKind::Lesson)
}

fn parse_nfo(path: &Path, kind: DescriptorKind) -> Result<FieldValues> {
    let content = std::fs::read_to_string(path)?;

    let mut reader = quick_xml::Reader::from_str(&content);
    let mut values = FieldValues::default();
    let mut current_field: Option<&'static str> = None;
    let mut saw_element = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                saw_element = true;
                current_field = match (&kind, e.name().as_ref()) {
                    (_, b"title") => Some("title"),
                    (_, b"plot") => Some("plot"),
                    (DescriptorKind::Course, b"director") => Some("director"),
                    (DescriptorKind::Course, b"year") => Some("year"),
                    (DescriptorKind::Lesson, b"runtime") => Some("runtime"),
                    _ => None,
                };
            }
            Ok(Event::Text(e)) => {
                if let Some(field) = current_field {
                    let text = e.unescape().map_err(|err| parse_error(path, err))?;
                    apply_field(&mut values, field, &text);
                }
            }
            Ok(Event::CData(e)) => {
                // CDATA content is literal, no unescaping
                if let Some(field) = current_field {
                    let inner = e.into_inner();
                    let text = String::from_utf8_lossy(&inner);
                    apply_field(&mut values, field, &text);
                }
            }
            Ok(Event::Empty(_)) => {
                saw_element = true;
                current_field = None;
            }
            Ok(Event::End(_)) => {
                current_field = None;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(parse_error(path, err)),
        }
        buf.clear();
    }

    // A descriptor with no XML elements at all is not structured content
    if !saw_element {
        return Err(EduscanError::DescriptorParse {
            path: path.to_path_buf(),
            message: "no XML elements found".to_string(),
        });
    }

    Ok(values)
}

fn apply_field(values: &mut FieldValues, field: &str, text: &str) {
    match field {
        "title" => values.title = non_empty(text),
        "plot" => values.description = non_empty(text),
        "director" => values.instructor = non_empty(text),
        "year" => values.year = non_empty(text),
        "runtime" => {
            // Runtime is minutes; unparsable values are ignored
            if let Ok(minutes) = text.trim().parse::<i64>() {
                values.duration_seconds = Some(minutes * RUNTIME_MINUTES_TO_SECONDS);
            }
        }
        _ => {}
    }
}

fn parse_error(path: &Path, err: impl std::fmt::Display) -> EduscanError {
    EduscanError::DescriptorParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
