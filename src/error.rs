// EduScan error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EduscanError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Descriptor parse error in {path}: {message}")]
    DescriptorParse { path: PathBuf, message: String },

    #[error("FFprobe error: {0}")]
    FFprobe(String),

    #[error("Course not found: {0}")]
    CourseNotFound(i64),

    #[error("No usable library roots: {0}")]
    NoUsableRoots(String),
}

pub type Result<T> = std::result::Result<T, EduscanError>;
