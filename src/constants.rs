// EduScan constants

/// Recognized video container extensions, matched case-insensitively.
pub const VIDEO_EXTENSIONS: [&str; 8] = ["mp4", "mkv", "avi", "mov", "flv", "wmv", "webm", "m4v"];

/// Sidecar descriptor file extension.
pub const DESCRIPTOR_EXTENSION: &str = "nfo";

/// Default catalog database filename.
pub const DB_FILENAME: &str = "library.db";

/// NFO runtime values are stored in minutes.
pub const RUNTIME_MINUTES_TO_SECONDS: i64 = 60;

/// Provenance tags persisted to the field_provenance table.
pub const SOURCE_DESCRIPTOR_FILE: &str = "descriptor-file";
pub const SOURCE_EMBEDDED_TAGS: &str = "embedded-tags";
pub const SOURCE_FILENAME: &str = "filename";
pub const SOURCE_DIRECTORY_NAME: &str = "directory-name";
pub const SOURCE_NONE: &str = "none";
