// Library scanning module

pub mod discover;
pub mod filename;
pub mod resolve;

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ScanConfig;
use crate::db::schema::{self, NewCourse, NewLesson};
use crate::error::{EduscanError, Result};
use crate::metadata::{ffprobe, nfo, FieldValues};
use crate::scan::resolve::{Course, Lesson};

/// A non-fatal problem encountered during a scan, tied to the path that
/// produced it. Collected in order and surfaced to the caller at the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub message: String,
}

impl ScanWarning {
    pub fn new(path: &Path, message: String) -> Self {
        ScanWarning { path: path.to_path_buf(), message }
    }
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Everything a scan pass produced: resolved courses with lessons and
/// per-field provenance, plus accumulated warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub courses: Vec<Course>,
    pub warnings: Vec<ScanWarning>,
}

impl ScanOutcome {
    pub fn total_lessons(&self) -> usize {
        self.courses.iter().map(|c| c.lessons.len()).sum()
    }

    pub fn complete_lessons(&self) -> usize {
        self.courses.iter().map(|c| c.lessons_complete()).sum()
    }

    pub fn complete_courses(&self) -> usize {
        self.courses.iter().filter(|c| c.is_complete()).count()
    }
}

/// Sequential library scanner. One instance per scan pass; all configuration
/// is explicit, nothing is read from ambient state.
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Scanner { config }
    }

    /// Run a full scan over the configured library roots.
    ///
    /// Individual directory, descriptor, and probe failures degrade to
    /// warnings; the only fatal condition is a root list with no usable
    /// entry at all.
    pub fn run(&self) -> Result<ScanOutcome> {
        let mut courses = Vec::new();
        let mut warnings = Vec::new();
        let mut usable_roots = 0;

        for root in &self.config.library_roots {
            if !root.is_dir() {
                warn!("Library root does not exist: {}", root.display());
                warnings.push(ScanWarning::new(root, "Library root does not exist".to_string()));
                continue;
            }
            usable_roots += 1;

            info!("Scanning library root {}", root.display());
            let course_dirs = discover::discover_courses(root, &mut warnings);
            if course_dirs.is_empty() {
                info!("No video files found under {}", root.display());
            }

            for course_dir in course_dirs {
                courses.push(self.scan_course(&course_dir, &mut warnings));
            }
        }

        if usable_roots == 0 {
            let listed = self
                .config
                .library_roots
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(EduscanError::NoUsableRoots(listed));
        }

        for warning in &warnings {
            warn!("{}", warning);
        }

        Ok(ScanOutcome { courses, warnings })
    }

    fn scan_course(&self, course_dir: &Path, warnings: &mut Vec<ScanWarning>) -> Course {
        let mut claimed: HashSet<PathBuf> = HashSet::new();

        // The course descriptor is claimed up front so flexible lesson
        // matching cannot consume it.
        let descriptor_path = nfo::find_course_descriptor(course_dir);
        if let Some(ref path) = descriptor_path {
            claimed.insert(path.clone());
        }
        let descriptor = descriptor_path.and_then(|path| match nfo::parse_course_nfo(&path) {
            Ok(values) => Some(values),
            Err(e) => {
                warnings.push(ScanWarning::new(&path, e.to_string()));
                None
            }
        });

        let mut course = resolve::resolve_course(course_dir, descriptor.as_ref());

        let videos = discover::collect_videos(course_dir, warnings);

        for video_path in videos {
            let lesson = self.scan_lesson(&video_path, &mut claimed, warnings);
            course.lessons.push(lesson);
        }

        course
    }

    fn scan_lesson(
        &self,
        video_path: &Path,
        claimed: &mut HashSet<PathBuf>,
        warnings: &mut Vec<ScanWarning>,
    ) -> Lesson {
        let descriptor = self.read_lesson_descriptor(video_path, claimed, warnings);
        let tags = self.read_embedded_tags(video_path, warnings);
        resolve::resolve_lesson(video_path, descriptor.as_ref(), tags.as_ref())
    }

    fn read_lesson_descriptor(
        &self,
        video_path: &Path,
        claimed: &mut HashSet<PathBuf>,
        warnings: &mut Vec<ScanWarning>,
    ) -> Option<FieldValues> {
        let path =
            nfo::find_lesson_descriptor(video_path, self.config.flexible_descriptors, claimed)?;
        claimed.insert(path.clone());
        match nfo::parse_lesson_nfo(&path) {
            Ok(values) => Some(values),
            Err(e) => {
                warnings.push(ScanWarning::new(&path, e.to_string()));
                None
            }
        }
    }

    fn read_embedded_tags(
        &self,
        video_path: &Path,
        warnings: &mut Vec<ScanWarning>,
    ) -> Option<FieldValues> {
        if self.config.skip_embedded_tags {
            return None;
        }
        match ffprobe::probe(video_path) {
            Ok(values) => Some(values),
            Err(e) => {
                warnings.push(ScanWarning::new(video_path, e.to_string()));
                None
            }
        }
    }
}

/// Persist a scan outcome into the catalog. Courses upsert by directory
/// path, lessons by file path; provenance rows are replaced wholesale so a
/// re-scan leaves no stale audit entries.
pub fn store_outcome(conn: &Connection, outcome: &ScanOutcome) -> Result<usize> {
    let mut stored = 0;

    for course in &outcome.courses {
        let course_id = schema::upsert_course(
            conn,
            &NewCourse {
                name: course.title.value.clone().unwrap_or_default(),
                directory_path: course.dir_path.to_string_lossy().to_string(),
                description: course.description.value.clone(),
                instructor: course.instructor.value.clone(),
                year: course.year.value.clone(),
                metadata_source: course.coarse_source().as_str().to_string(),
            },
        )?;
        schema::replace_course_provenance(conn, course_id, &course.provenance_entries())?;

        for lesson in &course.lessons {
            let lesson_id = schema::upsert_lesson(
                conn,
                course_id,
                &NewLesson {
                    title: lesson.title.value.clone(),
                    file_path: lesson.file_path.to_string_lossy().to_string(),
                    file_name: lesson.file_name.clone(),
                    duration_seconds: lesson.duration_seconds.value,
                    description: lesson.description.value.clone(),
                    metadata_source: lesson.coarse_source().as_str().to_string(),
                },
            )?;
            schema::replace_lesson_provenance(conn, lesson_id, &lesson.provenance_entries())?;
        }

        stored += 1;
    }

    Ok(stored)
}
