// Database schema types and query helpers

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ----- Course -----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRow {
    pub id: i64,
    pub name: String,
    pub directory_path: String,
    pub description: Option<String>,
    pub instructor: Option<String>,
    pub year: Option<String>,
    pub metadata_source: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub name: String,
    pub directory_path: String,
    pub description: Option<String>,
    pub instructor: Option<String>,
    pub year: Option<String>,
    pub metadata_source: String,
}

/// Insert a course, or update the existing row for the same directory path.
/// Returns the course id.
pub fn upsert_course(conn: &Connection, course: &NewCourse) -> Result<i64> {
    conn.execute(
        "INSERT INTO courses (name, directory_path, description, instructor, year, metadata_source)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(directory_path) DO UPDATE SET
             name = excluded.name,
             description = excluded.description,
             instructor = excluded.instructor,
             year = excluded.year,
             metadata_source = excluded.metadata_source,
             updated_at = datetime('now')",
        params![
            course.name,
            course.directory_path,
            course.description,
            course.instructor,
            course.year,
            course.metadata_source,
        ],
    )?;

    let id = conn.query_row(
        "SELECT id FROM courses WHERE directory_path = ?1",
        params![course.directory_path],
        |row| row.get(0),
    )?;
    Ok(id)
}

fn course_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CourseRow> {
    Ok(CourseRow {
        id: row.get(0)?,
        name: row.get(1)?,
        directory_path: row.get(2)?,
        description: row.get(3)?,
        instructor: row.get(4)?,
        year: row.get(5)?,
        metadata_source: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

const COURSE_COLUMNS: &str = "id, name, directory_path, description, instructor, year, \
                              metadata_source, created_at, updated_at";

pub fn get_course(conn: &Connection, id: i64) -> Result<Option<CourseRow>> {
    let result = conn
        .query_row(
            &format!("SELECT {} FROM courses WHERE id = ?1", COURSE_COLUMNS),
            params![id],
            course_from_row,
        )
        .optional()?;
    Ok(result)
}

pub fn get_course_by_path(conn: &Connection, directory_path: &str) -> Result<Option<CourseRow>> {
    let result = conn
        .query_row(
            &format!("SELECT {} FROM courses WHERE directory_path = ?1", COURSE_COLUMNS),
            params![directory_path],
            course_from_row,
        )
        .optional()?;
    Ok(result)
}

pub fn list_courses(conn: &Connection) -> Result<Vec<CourseRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM courses ORDER BY name", COURSE_COLUMNS))?;
    let rows = stmt.query_map([], course_from_row)?;
    let mut courses = Vec::new();
    for row in rows {
        courses.push(row?);
    }
    Ok(courses)
}

// ----- Lesson -----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonRow {
    pub id: i64,
    pub course_id: i64,
    pub title: Option<String>,
    pub file_path: String,
    pub file_name: String,
    pub duration_seconds: Option<i64>,
    pub description: Option<String>,
    pub metadata_source: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewLesson {
    pub title: Option<String>,
    pub file_path: String,
    pub file_name: String,
    pub duration_seconds: Option<i64>,
    pub description: Option<String>,
    pub metadata_source: String,
}

/// Insert a lesson, or update the existing row for the same file path.
/// Returns the lesson id.
pub fn upsert_lesson(conn: &Connection, course_id: i64, lesson: &NewLesson) -> Result<i64> {
    conn.execute(
        "INSERT INTO lessons (course_id, title, file_path, file_name, duration_seconds,
                              description, metadata_source)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(file_path) DO UPDATE SET
             course_id = excluded.course_id,
             title = excluded.title,
             file_name = excluded.file_name,
             duration_seconds = excluded.duration_seconds,
             description = excluded.description,
             metadata_source = excluded.metadata_source,
             updated_at = datetime('now')",
        params![
            course_id,
            lesson.title,
            lesson.file_path,
            lesson.file_name,
            lesson.duration_seconds,
            lesson.description,
            lesson.metadata_source,
        ],
    )?;

    let id = conn.query_row(
        "SELECT id FROM lessons WHERE file_path = ?1",
        params![lesson.file_path],
        |row| row.get(0),
    )?;
    Ok(id)
}

fn lesson_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LessonRow> {
    Ok(LessonRow {
        id: row.get(0)?,
        course_id: row.get(1)?,
        title: row.get(2)?,
        file_path: row.get(3)?,
        file_name: row.get(4)?,
        duration_seconds: row.get(5)?,
        description: row.get(6)?,
        metadata_source: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

const LESSON_COLUMNS: &str = "id, course_id, title, file_path, file_name, duration_seconds, \
                              description, metadata_source, created_at, updated_at";

pub fn get_lesson_by_path(conn: &Connection, file_path: &str) -> Result<Option<LessonRow>> {
    let result = conn
        .query_row(
            &format!("SELECT {} FROM lessons WHERE file_path = ?1", LESSON_COLUMNS),
            params![file_path],
            lesson_from_row,
        )
        .optional()?;
    Ok(result)
}

pub fn count_lessons(conn: &Connection, course_id: i64) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM lessons WHERE course_id = ?1",
        params![course_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn list_lessons(conn: &Connection, course_id: i64) -> Result<Vec<LessonRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM lessons WHERE course_id = ?1 ORDER BY file_path",
        LESSON_COLUMNS
    ))?;
    let rows = stmt.query_map(params![course_id], lesson_from_row)?;
    let mut lessons = Vec::new();
    for row in rows {
        lessons.push(row?);
    }
    Ok(lessons)
}

// ----- Field provenance -----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceRow {
    pub field: String,
    pub source: String,
}

/// Replace all provenance rows for a course with the given (field, source) set.
pub fn replace_course_provenance(
    conn: &Connection,
    course_id: i64,
    entries: &[(String, String)],
) -> Result<()> {
    conn.execute(
        "DELETE FROM field_provenance WHERE course_id = ?1",
        params![course_id],
    )?;
    for (field, source) in entries {
        conn.execute(
            "INSERT INTO field_provenance (course_id, field, source) VALUES (?1, ?2, ?3)",
            params![course_id, field, source],
        )?;
    }
    Ok(())
}

/// Replace all provenance rows for a lesson with the given (field, source) set.
pub fn replace_lesson_provenance(
    conn: &Connection,
    lesson_id: i64,
    entries: &[(String, String)],
) -> Result<()> {
    conn.execute(
        "DELETE FROM field_provenance WHERE lesson_id = ?1",
        params![lesson_id],
    )?;
    for (field, source) in entries {
        conn.execute(
            "INSERT INTO field_provenance (lesson_id, field, source) VALUES (?1, ?2, ?3)",
            params![lesson_id, field, source],
        )?;
    }
    Ok(())
}

pub fn course_provenance(conn: &Connection, course_id: i64) -> Result<Vec<ProvenanceRow>> {
    provenance_query(conn, "course_id", course_id)
}

pub fn lesson_provenance(conn: &Connection, lesson_id: i64) -> Result<Vec<ProvenanceRow>> {
    provenance_query(conn, "lesson_id", lesson_id)
}

fn provenance_query(conn: &Connection, key_column: &str, id: i64) -> Result<Vec<ProvenanceRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT field, source FROM field_provenance WHERE {} = ?1 ORDER BY field",
        key_column
    ))?;
    let rows = stmt.query_map(params![id], |row| {
        Ok(ProvenanceRow {
            field: row.get(0)?,
            source: row.get(1)?,
        })
    })?;
    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}

// ----- Maintenance and statistics -----

/// Remove all catalog data.
pub fn clear_all(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM field_provenance", [])?;
    conn.execute("DELETE FROM lessons", [])?;
    conn.execute("DELETE FROM courses", [])?;
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub total_courses: i64,
    pub total_lessons: i64,
    pub lessons_with_title: i64,
    pub courses_with_duration: i64,
}

pub fn get_statistics(conn: &Connection) -> Result<Statistics> {
    let total_courses = conn.query_row("SELECT COUNT(*) FROM courses", [], |r| r.get(0))?;
    let total_lessons = conn.query_row("SELECT COUNT(*) FROM lessons", [], |r| r.get(0))?;
    let lessons_with_title = conn.query_row(
        "SELECT COUNT(*) FROM lessons WHERE title IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let courses_with_duration = conn.query_row(
        "SELECT COUNT(DISTINCT course_id) FROM lessons WHERE duration_seconds IS NOT NULL",
        [],
        |r| r.get(0),
    )?;

    Ok(Statistics {
        total_courses,
        total_lessons,
        lessons_with_title,
        courses_with_duration,
    })
}
