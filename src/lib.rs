// EduScan - library entry point

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod metadata;
pub mod report;
pub mod scan;

pub use config::ScanConfig;
pub use error::{EduscanError, Result};
pub use scan::{ScanOutcome, ScanWarning, Scanner};
