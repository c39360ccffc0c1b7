// End-to-end scan tests over temporary library trees.
// Embedded tag extraction is skipped (or exercised at the resolver level in
// resolve.rs) because the test environment cannot assume an ffprobe binary
// or real video containers.

use std::io::Write as IoWrite;
use std::path::Path;

use tempfile::TempDir;

use crate::config::ScanConfig;
use crate::db::{open_in_memory, schema};
use crate::scan::resolve::Provenance;
use crate::scan::{store_outcome, ScanOutcome, Scanner};

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut f = std::fs::File::create(path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
}

/// Scan with embedded-tag extraction off.
fn scan_skipping_tags(root: &Path) -> ScanOutcome {
    scan_skipping_tags_flexible(root, false)
}

fn scan_skipping_tags_flexible(root: &Path, flexible: bool) -> ScanOutcome {
    let mut config = ScanConfig::new(vec![root.to_path_buf()]);
    config.skip_embedded_tags = true;
    config.flexible_descriptors = flexible;
    Scanner::new(config).run().unwrap()
}

const COURSE_NFO: &str = r#"<tvshow>
    <title>Python Fundamentals</title>
    <plot>A beginner-friendly Python course.</plot>
    <director>John Smith</director>
    <year>2024</year>
</tvshow>"#;

// ---------------------------------------------------------------
// Scenario A: course descriptor + ordinal-named lesson, no lesson
// descriptor, no embedded duration
// ---------------------------------------------------------------
#[test]
fn test_course_descriptor_with_filename_titled_lesson() {
    let tmp = TempDir::new().unwrap();
    let course_dir = tmp.path().join("python-course");
    write_file(&course_dir.join("tvshow.nfo"), COURSE_NFO);
    write_file(&course_dir.join("01 - Introduction to Python.mp4"), "");

    let outcome = scan_skipping_tags(tmp.path());
    assert_eq!(outcome.courses.len(), 1);

    let course = &outcome.courses[0];
    assert_eq!(course.title.value.as_deref(), Some("Python Fundamentals"));
    assert_eq!(course.title.source, Provenance::DescriptorFile);
    assert_eq!(course.instructor.value.as_deref(), Some("John Smith"));
    assert_eq!(course.year.value.as_deref(), Some("2024"));

    assert_eq!(course.lessons.len(), 1);
    let lesson = &course.lessons[0];
    assert_eq!(lesson.title.value.as_deref(), Some("Introduction to Python"));
    assert_eq!(lesson.title.source, Provenance::Filename);
    assert_eq!(lesson.duration_seconds.value, None);
    assert_eq!(lesson.duration_seconds.source, Provenance::None);
    assert!(!lesson.is_complete(), "no duration means incomplete");
}

// ---------------------------------------------------------------
// Scenario B (course half): no descriptor at all falls back to the
// directory name. The embedded-tags half lives in resolve.rs tests.
// ---------------------------------------------------------------
#[test]
fn test_course_without_descriptor_uses_directory_name() {
    let tmp = TempDir::new().unwrap();
    let course_dir = tmp.path().join("Advanced Databases");
    write_file(&course_dir.join("Lesson 5 - Loops.mkv"), "");

    let outcome = scan_skipping_tags(tmp.path());
    let course = &outcome.courses[0];
    assert_eq!(course.title.value.as_deref(), Some("Advanced Databases"));
    assert_eq!(course.title.source, Provenance::DirectoryName);

    let lesson = &course.lessons[0];
    assert_eq!(lesson.title.value.as_deref(), Some("Loops"));
    assert_eq!(lesson.title.source, Provenance::Filename);
}

// ---------------------------------------------------------------
// Scenario C: malformed descriptor degrades to directory-name with
// a warning; the scan must not abort
// ---------------------------------------------------------------
#[test]
fn test_malformed_descriptor_warns_and_falls_through() {
    let tmp = TempDir::new().unwrap();
    let course_dir = tmp.path().join("Broken Course");
    write_file(&course_dir.join("tvshow.nfo"), "<tvshow><title>Oops</plot></tvshow>");
    write_file(&course_dir.join("01 - Intro.mp4"), "");

    let outcome = scan_skipping_tags(tmp.path());
    assert_eq!(outcome.courses.len(), 1, "scan completes despite the bad descriptor");

    let course = &outcome.courses[0];
    assert_eq!(course.title.value.as_deref(), Some("Broken Course"));
    assert_eq!(course.title.source, Provenance::DirectoryName);

    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].path.ends_with("tvshow.nfo"));
}

// ---------------------------------------------------------------
// Scenario D: skip-tags means the embedded tier contributes nothing
// ---------------------------------------------------------------
#[test]
fn test_skip_tags_leaves_duration_null() {
    let tmp = TempDir::new().unwrap();
    write_file(&tmp.path().join("Course/Getting Started.mp4"), "");

    let outcome = scan_skipping_tags(tmp.path());
    let lesson = &outcome.courses[0].lessons[0];

    // Identity title from the filename, nothing else
    assert_eq!(lesson.title.value.as_deref(), Some("Getting Started"));
    assert_eq!(lesson.duration_seconds.value, None);
    assert_eq!(lesson.duration_seconds.source, Provenance::None);
    assert!(outcome.warnings.is_empty(), "skipping tags must not emit probe warnings");
}

// ---------------------------------------------------------------
// Lesson descriptor: exact stem match, runtime in minutes
// ---------------------------------------------------------------
#[test]
fn test_lesson_descriptor_supplies_title_and_duration() {
    let tmp = TempDir::new().unwrap();
    let course_dir = tmp.path().join("Course");
    write_file(&course_dir.join("05 - Loops.mkv"), "");
    write_file(
        &course_dir.join("05 - Loops.nfo"),
        "<episodedetails><title>All About Loops</title><plot>for and while</plot><runtime>45</runtime></episodedetails>",
    );

    let outcome = scan_skipping_tags(tmp.path());
    let lesson = &outcome.courses[0].lessons[0];
    assert_eq!(lesson.title.value.as_deref(), Some("All About Loops"));
    assert_eq!(lesson.title.source, Provenance::DescriptorFile);
    assert_eq!(lesson.duration_seconds.value, Some(2700));
    assert_eq!(lesson.duration_seconds.source, Provenance::DescriptorFile);
    assert!(lesson.is_complete());
}

// ---------------------------------------------------------------
// Flexible matching: a stray descriptor is claimed once
// ---------------------------------------------------------------
#[test]
fn test_flexible_descriptor_claimed_by_one_lesson_only() {
    let tmp = TempDir::new().unwrap();
    let season = tmp.path().join("Course/Season 1");
    write_file(&season.join("01 - A.mp4"), "");
    write_file(&season.join("02 - B.mp4"), "");
    write_file(
        &season.join("notes.nfo"),
        "<episodedetails><title>Special</title></episodedetails>",
    );

    let outcome = scan_skipping_tags_flexible(tmp.path(), true);
    let lessons = &outcome.courses[0].lessons;
    assert_eq!(lessons.len(), 2);

    assert_eq!(lessons[0].title.value.as_deref(), Some("Special"));
    assert_eq!(lessons[0].title.source, Provenance::DescriptorFile);
    // The second lesson falls through to its filename
    assert_eq!(lessons[1].title.value.as_deref(), Some("B"));
    assert_eq!(lessons[1].title.source, Provenance::Filename);
}

#[test]
fn test_flexible_matching_keeps_exact_stem_descriptors_with_their_videos() {
    let tmp = TempDir::new().unwrap();
    let season = tmp.path().join("Course/Season 1");
    write_file(&season.join("01 - A.mp4"), "");
    write_file(&season.join("02 - B.mp4"), "");
    write_file(
        &season.join("02 - B.nfo"),
        "<episodedetails><title>All About B</title></episodedetails>",
    );

    let outcome = scan_skipping_tags_flexible(tmp.path(), true);
    let lessons = &outcome.courses[0].lessons;
    assert_eq!(lessons.len(), 2);

    // Lesson A scans first but must not claim B's descriptor
    assert_eq!(lessons[0].title.value.as_deref(), Some("A"));
    assert_eq!(lessons[0].title.source, Provenance::Filename);
    assert_eq!(lessons[1].title.value.as_deref(), Some("All About B"));
    assert_eq!(lessons[1].title.source, Provenance::DescriptorFile);
}

#[test]
fn test_cdata_descriptor_fields_resolve_end_to_end() {
    let tmp = TempDir::new().unwrap();
    let course_dir = tmp.path().join("python-course");
    write_file(
        &course_dir.join("tvshow.nfo"),
        r#"<tvshow>
             <title><![CDATA[Python Fundamentals]]></title>
             <plot><![CDATA[A beginner-friendly Python course.]]></plot>
           </tvshow>"#,
    );
    write_file(&course_dir.join("01 - Intro.mp4"), "");

    let outcome = scan_skipping_tags(tmp.path());
    let course = &outcome.courses[0];
    assert_eq!(course.title.value.as_deref(), Some("Python Fundamentals"));
    assert_eq!(course.title.source, Provenance::DescriptorFile);
    assert_eq!(
        course.description.value.as_deref(),
        Some("A beginner-friendly Python course.")
    );
    assert!(outcome.warnings.is_empty());
}

#[test]
fn test_strict_matching_ignores_stray_descriptor() {
    let tmp = TempDir::new().unwrap();
    let season = tmp.path().join("Course/Season 1");
    write_file(&season.join("01 - A.mp4"), "");
    write_file(
        &season.join("notes.nfo"),
        "<episodedetails><title>Special</title></episodedetails>",
    );

    let outcome = scan_skipping_tags_flexible(tmp.path(), false);
    let lesson = &outcome.courses[0].lessons[0];
    assert_eq!(lesson.title.value.as_deref(), Some("A"));
    assert_eq!(lesson.title.source, Provenance::Filename);
}

// ---------------------------------------------------------------
// Course descriptor cannot be consumed by flexible lesson matching
// ---------------------------------------------------------------
#[test]
fn test_course_descriptor_not_consumed_by_flexible_lessons() {
    let tmp = TempDir::new().unwrap();
    let course_dir = tmp.path().join("python-course");
    write_file(&course_dir.join("tvshow.nfo"), COURSE_NFO);
    write_file(&course_dir.join("01 - Intro.mp4"), "");

    let outcome = scan_skipping_tags_flexible(tmp.path(), true);
    let course = &outcome.courses[0];
    assert_eq!(course.title.value.as_deref(), Some("Python Fundamentals"));

    // The lesson must not inherit the course descriptor's title
    let lesson = &course.lessons[0];
    assert_eq!(lesson.title.value.as_deref(), Some("Intro"));
    assert_eq!(lesson.title.source, Provenance::Filename);
}

// ---------------------------------------------------------------
// Idempotence: two passes over an unchanged tree agree exactly
// ---------------------------------------------------------------
#[test]
fn test_rescan_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let course_dir = tmp.path().join("python-course");
    write_file(&course_dir.join("tvshow.nfo"), COURSE_NFO);
    write_file(&course_dir.join("01 - Intro.mp4"), "");
    write_file(&course_dir.join("Season 2/02 - More.mkv"), "");

    let first = scan_skipping_tags(tmp.path());
    let second = scan_skipping_tags(tmp.path());

    assert_eq!(
        serde_json::to_value(&first.courses).unwrap(),
        serde_json::to_value(&second.courses).unwrap(),
        "records and provenance must be identical across passes"
    );
    assert_eq!(first.warnings, second.warnings);
}

// ---------------------------------------------------------------
// Completeness monotonicity across scans: adding a descriptor can
// only raise completeness
// ---------------------------------------------------------------
#[test]
fn test_adding_descriptor_raises_completeness() {
    let tmp = TempDir::new().unwrap();
    let course_dir = tmp.path().join("Course");
    write_file(&course_dir.join("05 - Loops.mkv"), "");

    let before = scan_skipping_tags(tmp.path());
    let lesson_before = &before.courses[0].lessons[0];
    assert!(!lesson_before.is_complete());

    write_file(
        &course_dir.join("05 - Loops.nfo"),
        "<episodedetails><title>Loops</title><runtime>45</runtime></episodedetails>",
    );

    let after = scan_skipping_tags(tmp.path());
    let lesson_after = &after.courses[0].lessons[0];
    assert!(lesson_after.is_complete());
    assert_eq!(lesson_after.title.source, Provenance::DescriptorFile);
}

// ---------------------------------------------------------------
// Roots: a missing root warns, all-missing is fatal
// ---------------------------------------------------------------
#[test]
fn test_missing_root_warns_but_scan_continues() {
    let tmp = TempDir::new().unwrap();
    write_file(&tmp.path().join("Course/01 - A.mp4"), "");
    let missing = tmp.path().join("does-not-exist");

    let mut config = ScanConfig::new(vec![missing.clone(), tmp.path().to_path_buf()]);
    config.skip_embedded_tags = true;
    let outcome = Scanner::new(config).run().unwrap();

    assert_eq!(outcome.courses.len(), 1);
    assert!(outcome.warnings.iter().any(|w| w.path == missing));
}

#[test]
fn test_all_roots_missing_is_fatal() {
    let mut config = ScanConfig::new(vec![std::path::PathBuf::from("/nonexistent/library")]);
    config.skip_embedded_tags = true;
    let result = Scanner::new(config).run();
    assert!(result.is_err());
}

#[test]
fn test_empty_root_yields_zero_courses_without_warnings() {
    let tmp = TempDir::new().unwrap();
    write_file(&tmp.path().join("Docs/readme.txt"), "");

    let outcome = scan_skipping_tags(tmp.path());
    assert!(outcome.courses.is_empty());
    assert!(outcome.warnings.is_empty(), "no videos is informational, not a warning");
}

// ---------------------------------------------------------------
// Persistence round trip: upsert semantics and provenance audit
// ---------------------------------------------------------------
#[test]
fn test_store_outcome_and_rescan_upserts() {
    let tmp = TempDir::new().unwrap();
    let course_dir = tmp.path().join("python-course");
    write_file(&course_dir.join("tvshow.nfo"), COURSE_NFO);
    write_file(&course_dir.join("01 - Introduction to Python.mp4"), "");

    let conn = open_in_memory().unwrap();

    let outcome = scan_skipping_tags(tmp.path());
    store_outcome(&conn, &outcome).unwrap();
    store_outcome(&conn, &outcome).unwrap();

    let courses = schema::list_courses(&conn).unwrap();
    assert_eq!(courses.len(), 1, "re-storing must upsert, not duplicate");
    let course = &courses[0];
    assert_eq!(course.name, "Python Fundamentals");
    assert_eq!(course.metadata_source.as_deref(), Some("descriptor-file"));

    let lessons = schema::list_lessons(&conn, course.id).unwrap();
    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0].title.as_deref(), Some("Introduction to Python"));
    assert_eq!(lessons[0].metadata_source.as_deref(), Some("filename"));
    assert_eq!(lessons[0].file_name, "01 - Introduction to Python.mp4");

    let provenance = schema::lesson_provenance(&conn, lessons[0].id).unwrap();
    let title_entry = provenance.iter().find(|p| p.field == "title").unwrap();
    assert_eq!(title_entry.source, "filename");
    let duration_entry = provenance.iter().find(|p| p.field == "duration").unwrap();
    assert_eq!(duration_entry.source, "none");

    let course_provenance = schema::course_provenance(&conn, course.id).unwrap();
    let name_entry = course_provenance.iter().find(|p| p.field == "title").unwrap();
    assert_eq!(name_entry.source, "descriptor-file");
}

// ---------------------------------------------------------------
// Containment: every lesson path lies inside its course directory
// ---------------------------------------------------------------
#[test]
fn test_lessons_contained_in_course_directory() {
    let tmp = TempDir::new().unwrap();
    write_file(&tmp.path().join("A/01.mp4"), "");
    write_file(&tmp.path().join("A/Extras/02.mkv"), "");
    write_file(&tmp.path().join("B/01.mp4"), "");

    let outcome = scan_skipping_tags(tmp.path());
    assert_eq!(outcome.courses.len(), 2);

    for course in &outcome.courses {
        assert!(!course.lessons.is_empty());
        for lesson in &course.lessons {
            assert!(
                lesson.file_path.starts_with(&course.dir_path),
                "{} must lie under {}",
                lesson.file_path.display(),
                course.dir_path.display()
            );
        }
    }
}
