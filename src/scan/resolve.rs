// Metadata resolver
// Per-field, first-match-wins reduction over prioritized candidate sources.
// Each resolved field carries the provenance tag of the source that supplied
// it; resolution is per field, never per entity.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    SOURCE_DESCRIPTOR_FILE, SOURCE_DIRECTORY_NAME, SOURCE_EMBEDDED_TAGS, SOURCE_FILENAME,
    SOURCE_NONE,
};
use crate::metadata::FieldValues;
use crate::scan::filename::parse_lesson_title;

/// Which source tier supplied a resolved field. Ordered by priority:
/// a lower discriminant always beats a higher one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Provenance {
    DescriptorFile,
    EmbeddedTags,
    Filename,
    DirectoryName,
    None,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::DescriptorFile => SOURCE_DESCRIPTOR_FILE,
            Provenance::EmbeddedTags => SOURCE_EMBEDDED_TAGS,
            Provenance::Filename => SOURCE_FILENAME,
            Provenance::DirectoryName => SOURCE_DIRECTORY_NAME,
            Provenance::None => SOURCE_NONE,
        }
    }
}

/// A resolved value plus the provenance of the source that supplied it.
/// Null values always carry `Provenance::None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field<T> {
    pub value: Option<T>,
    pub source: Provenance,
}

impl<T> Field<T> {
    pub fn empty() -> Self {
        Field { value: None, source: Provenance::None }
    }

    pub fn is_some(&self) -> bool {
        self.value.is_some()
    }
}

/// Reduce an ordered candidate list to the first non-empty value and its tag.
/// Higher-priority candidates come first; a match ends the search even if a
/// later candidate would also have supplied a value.
pub fn resolve_field<T>(candidates: Vec<(Provenance, Option<T>)>) -> Field<T> {
    for (source, value) in candidates {
        if let Some(value) = value {
            return Field { value: Some(value), source };
        }
    }
    Field::empty()
}

// ----- Resolved entities -----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub dir_path: PathBuf,
    pub title: Field<String>,
    pub description: Field<String>,
    pub instructor: Field<String>,
    pub year: Field<String>,
    pub lessons: Vec<Lesson>,
}

impl Course {
    /// A course is complete when its title resolved to a value.
    pub fn is_complete(&self) -> bool {
        self.title.is_some()
    }

    pub fn lessons_complete(&self) -> usize {
        self.lessons.iter().filter(|l| l.is_complete()).count()
    }

    /// Highest-priority tier that contributed any field. Used for the coarse
    /// per-entity label in the catalog; per-field tags are kept separately.
    pub fn coarse_source(&self) -> Provenance {
        [
            self.title.source,
            self.description.source,
            self.instructor.source,
            self.year.source,
        ]
        .into_iter()
        .min()
        .unwrap_or(Provenance::None)
    }

    /// (field, source) pairs for the granular provenance record.
    pub fn provenance_entries(&self) -> Vec<(String, String)> {
        vec![
            ("title".to_string(), self.title.source.as_str().to_string()),
            ("description".to_string(), self.description.source.as_str().to_string()),
            ("instructor".to_string(), self.instructor.source.as_str().to_string()),
            ("year".to_string(), self.year.source.as_str().to_string()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub file_path: PathBuf,
    pub file_name: String,
    pub title: Field<String>,
    pub description: Field<String>,
    pub duration_seconds: Field<i64>,
}

impl Lesson {
    /// A lesson is complete when both title and duration resolved.
    pub fn is_complete(&self) -> bool {
        self.title.is_some() && self.duration_seconds.is_some()
    }

    pub fn coarse_source(&self) -> Provenance {
        [self.title.source, self.description.source, self.duration_seconds.source]
            .into_iter()
            .min()
            .unwrap_or(Provenance::None)
    }

    pub fn provenance_entries(&self) -> Vec<(String, String)> {
        vec![
            ("title".to_string(), self.title.source.as_str().to_string()),
            ("description".to_string(), self.description.source.as_str().to_string()),
            ("duration".to_string(), self.duration_seconds.source.as_str().to_string()),
        ]
    }
}

// ----- Resolution -----

/// Resolve course-level fields from the descriptor (if any) and the directory
/// name. Description, instructor, and year have no lower-priority source and
/// stay null without a descriptor.
pub fn resolve_course(dir_path: &Path, descriptor: Option<&FieldValues>) -> Course {
    let dir_name = dir_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string());

    Course {
        dir_path: dir_path.to_path_buf(),
        title: resolve_field(vec![
            (Provenance::DescriptorFile, descriptor.and_then(|d| d.title.clone())),
            (Provenance::DirectoryName, dir_name),
        ]),
        description: resolve_field(vec![(
            Provenance::DescriptorFile,
            descriptor.and_then(|d| d.description.clone()),
        )]),
        instructor: resolve_field(vec![(
            Provenance::DescriptorFile,
            descriptor.and_then(|d| d.instructor.clone()),
        )]),
        year: resolve_field(vec![(
            Provenance::DescriptorFile,
            descriptor.and_then(|d| d.year.clone()),
        )]),
        lessons: Vec::new(),
    }
}

/// Resolve lesson-level fields. Per field: descriptor file, then embedded
/// tags, then (title only) the filename parser. Description and duration
/// have no filename fallback.
pub fn resolve_lesson(
    file_path: &Path,
    descriptor: Option<&FieldValues>,
    tags: Option<&FieldValues>,
) -> Lesson {
    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let filename_title = file_path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(parse_lesson_title)
        .filter(|t| !t.is_empty());

    Lesson {
        file_path: file_path.to_path_buf(),
        file_name,
        title: resolve_field(vec![
            (Provenance::DescriptorFile, descriptor.and_then(|d| d.title.clone())),
            (Provenance::EmbeddedTags, tags.and_then(|t| t.title.clone())),
            (Provenance::Filename, filename_title),
        ]),
        description: resolve_field(vec![
            (Provenance::DescriptorFile, descriptor.and_then(|d| d.description.clone())),
            (Provenance::EmbeddedTags, tags.and_then(|t| t.description.clone())),
        ]),
        duration_seconds: resolve_field(vec![
            (Provenance::DescriptorFile, descriptor.and_then(|d| d.duration_seconds)),
            (Provenance::EmbeddedTags, tags.and_then(|t| t.duration_seconds)),
        ]),
    }
}
