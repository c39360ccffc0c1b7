// Terminal report renderer

use std::fmt::Write as FmtWrite;

use crate::db::schema::Statistics;
use crate::scan::resolve::{Course, Field, Lesson, Provenance};
use crate::scan::ScanOutcome;

const BANNER_WIDTH: usize = 80;

/// Format a duration in seconds as H:MM:SS, or M:SS under an hour.
pub fn format_duration(total_seconds: i64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

fn duration_or_unknown(duration: Option<i64>) -> String {
    duration.map(format_duration).unwrap_or_else(|| "Unknown".to_string())
}

/// " [descriptor-file, filename]" style annotation listing the distinct
/// source tiers that contributed to an entity, in priority order.
fn source_annotation(fields: &[Provenance]) -> String {
    let mut sources: Vec<Provenance> = fields
        .iter()
        .copied()
        .filter(|s| *s != Provenance::None)
        .collect();
    sources.sort();
    sources.dedup();

    if sources.is_empty() {
        String::new()
    } else {
        let names: Vec<&str> = sources.iter().map(|s| s.as_str()).collect();
        format!(" [{}]", names.join(", "))
    }
}

fn course_sources(course: &Course) -> Vec<Provenance> {
    vec![
        course.title.source,
        course.description.source,
        course.instructor.source,
        course.year.source,
    ]
}

fn lesson_sources(lesson: &Lesson) -> Vec<Provenance> {
    vec![lesson.title.source, lesson.description.source, lesson.duration_seconds.source]
}

fn field_str(field: &Field<String>) -> Option<&str> {
    field.value.as_deref()
}

/// Render one course block with its lessons.
pub fn render_course(course: &Course) -> String {
    let mut out = String::new();
    let banner = "=".repeat(BANNER_WIDTH);

    let title = field_str(&course.title).unwrap_or("[NO TITLE]");
    writeln!(out, "\n{}", banner).unwrap();
    writeln!(out, "COURSE: {}{}", title, source_annotation(&course_sources(course))).unwrap();
    writeln!(out, "{}", banner).unwrap();

    if let Some(description) = field_str(&course.description) {
        writeln!(out, "Description: {}", description).unwrap();
    }
    if let Some(instructor) = field_str(&course.instructor) {
        writeln!(out, "Instructor: {}", instructor).unwrap();
    }
    if let Some(year) = field_str(&course.year) {
        writeln!(out, "Year: {}", year).unwrap();
    }

    writeln!(
        out,
        "\nLessons ({} total, {} with complete metadata):",
        course.lessons.len(),
        course.lessons_complete()
    )
    .unwrap();
    writeln!(out, "{}", "-".repeat(BANNER_WIDTH)).unwrap();

    for (i, lesson) in course.lessons.iter().enumerate() {
        let title = field_str(&lesson.title).unwrap_or("[NO TITLE]");
        writeln!(out, "{:3}. {}{}", i + 1, title, source_annotation(&lesson_sources(lesson)))
            .unwrap();

        let file = lesson
            .file_path
            .strip_prefix(&course.dir_path)
            .unwrap_or(&lesson.file_path);
        writeln!(out, "      File: {}", file.display()).unwrap();
        writeln!(out, "      Duration: {}", duration_or_unknown(lesson.duration_seconds.value))
            .unwrap();

        if let Some(description) = field_str(&lesson.description) {
            writeln!(out, "      Description: {}", description).unwrap();
        }
        writeln!(out).unwrap();
    }

    out
}

/// Render the end-of-scan summary block.
pub fn render_summary(outcome: &ScanOutcome) -> String {
    let total_courses = outcome.courses.len();
    let total_lessons = outcome.total_lessons();
    let complete_lessons = outcome.complete_lessons();
    let complete_courses = outcome.complete_courses();

    let lesson_pct = if total_lessons > 0 { 100 * complete_lessons / total_lessons } else { 0 };
    let course_pct = if total_courses > 0 { 100 * complete_courses / total_courses } else { 0 };

    let banner = "=".repeat(BANNER_WIDTH);
    let mut out = String::new();
    writeln!(out, "\n{}", banner).unwrap();
    writeln!(out, "SUMMARY").unwrap();
    writeln!(out, "{}", banner).unwrap();
    writeln!(out, "Total Courses Found: {}", total_courses).unwrap();
    writeln!(out, "Total Lessons Found: {}", total_lessons).unwrap();
    writeln!(
        out,
        "Lessons with Complete Metadata: {}/{} ({}%)",
        complete_lessons, total_lessons, lesson_pct
    )
    .unwrap();
    writeln!(
        out,
        "Courses with Complete Metadata: {}/{} ({}%)",
        complete_courses, total_courses, course_pct
    )
    .unwrap();
    writeln!(out, "{}", banner).unwrap();
    out
}

/// Render accumulated warnings, or an empty string when there are none.
pub fn render_warnings(outcome: &ScanOutcome) -> String {
    if outcome.warnings.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    writeln!(out, "\nWarnings ({}):", outcome.warnings.len()).unwrap();
    for warning in &outcome.warnings {
        writeln!(out, "  {}", warning).unwrap();
    }
    out
}

/// Render database statistics after storing.
pub fn render_statistics(stats: &Statistics) -> String {
    let mut out = String::new();
    writeln!(out, "\nDatabase Statistics:").unwrap();
    writeln!(out, "  Courses in database: {}", stats.total_courses).unwrap();
    writeln!(out, "  Lessons in database: {}", stats.total_lessons).unwrap();
    writeln!(out, "  Lessons with titles: {}", stats.lessons_with_title).unwrap();
    writeln!(out, "  Courses with durations: {}", stats.courses_with_duration).unwrap();
    out
}
