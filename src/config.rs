// Scan configuration
// Passed explicitly into the scanner; nothing here is ambient process state.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Library roots to scan, in order.
    pub library_roots: Vec<PathBuf>,
    /// Skip ffprobe tag extraction (faster on slow/network storage).
    /// When set, the embedded-tags tier contributes nothing for any lesson.
    pub skip_embedded_tags: bool,
    /// When a lesson has no exact-stem descriptor, allow any unclaimed
    /// descriptor file in the lesson's directory to match.
    pub flexible_descriptors: bool,
}

impl ScanConfig {
    pub fn new(library_roots: Vec<PathBuf>) -> Self {
        ScanConfig {
            library_roots,
            skip_embedded_tags: false,
            flexible_descriptors: false,
        }
    }
}
