// Course directory discovery

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::constants::VIDEO_EXTENSIONS;
use crate::scan::ScanWarning;

/// Check if a file is a video file based on extension.
pub fn is_video_file(path: &Path) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(e) => e.to_lowercase(),
        None => return false,
    };
    VIDEO_EXTENSIONS.contains(&ext.as_str())
}

/// Course-boundary predicate: does this directory's subtree contain at least
/// one video file (directly or in any subdirectory)?
pub fn subtree_has_video(dir: &Path) -> bool {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .any(|e| e.path().is_file() && is_video_file(e.path()))
}

/// Discover course directories under a library root.
///
/// The outermost directory on each path whose subtree contains a video file
/// becomes a course unit; descent stops at that boundary, so video-bearing
/// subdirectories ("season" folders) belong to the outer course. Video files
/// sitting directly in the root itself belong to no course and are ignored.
pub fn discover_courses(root: &Path, warnings: &mut Vec<ScanWarning>) -> Vec<PathBuf> {
    let mut courses = Vec::new();
    collect_course_dirs(root, warnings, &mut courses);
    courses.sort();
    courses
}

fn collect_course_dirs(dir: &Path, warnings: &mut Vec<ScanWarning>, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warnings.push(ScanWarning::new(dir, format!("Failed to read directory: {}", e)));
            return;
        }
    };

    let mut children: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    children.sort();

    for child in children {
        if subtree_has_video(&child) {
            out.push(child);
        } else {
            collect_course_dirs(&child, warnings, out);
        }
    }
}

/// Enumerate all video files under a course directory, sorted by path for
/// deterministic lesson ordering.
pub fn collect_videos(course_dir: &Path, warnings: &mut Vec<ScanWarning>) -> Vec<PathBuf> {
    let mut videos = Vec::new();

    for entry in WalkDir::new(course_dir) {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() && is_video_file(path) {
                    videos.push(path.to_path_buf());
                }
            }
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| course_dir.to_path_buf());
                warnings.push(ScanWarning::new(&path, format!("Failed to access: {}", err)));
            }
        }
    }

    videos.sort();
    videos
}
