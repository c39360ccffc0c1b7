// Database migrations
// Migrations are forward-only. Never edit or delete a migration after it ships.

use rusqlite::Connection;

use crate::error::Result;

/// All migrations in order. Each migration is a SQL string.
const MIGRATIONS: &[&str] = &[
    // Migration 1: Initial schema
    r#"
    -- Courses: one row per discovered course directory
    CREATE TABLE courses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        directory_path TEXT NOT NULL UNIQUE,
        description TEXT,
        instructor TEXT,
        year TEXT,
        metadata_source TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    -- Lessons: one row per video file, owned by a course
    CREATE TABLE lessons (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        course_id INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
        title TEXT,
        file_path TEXT NOT NULL UNIQUE,
        file_name TEXT NOT NULL,
        duration_seconds INTEGER,
        description TEXT,
        metadata_source TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    -- Per-field provenance, one row per resolved field per entity.
    -- Exactly one of course_id / lesson_id is set.
    CREATE TABLE field_provenance (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        course_id INTEGER REFERENCES courses(id) ON DELETE CASCADE,
        lesson_id INTEGER REFERENCES lessons(id) ON DELETE CASCADE,
        field TEXT NOT NULL,
        source TEXT NOT NULL CHECK (source IN (
            'descriptor-file', 'embedded-tags', 'filename', 'directory-name', 'none'
        )),
        CHECK ((course_id IS NULL) <> (lesson_id IS NULL))
    );

    CREATE INDEX idx_lessons_course ON lessons(course_id);
    CREATE INDEX idx_provenance_course ON field_provenance(course_id);
    CREATE INDEX idx_provenance_lesson ON field_provenance(lesson_id);
    "#,
];

/// Run all pending migrations. Tracks progress in PRAGMA user_version.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i64;
        if version <= current {
            continue;
        }
        conn.execute_batch(migration)?;
        conn.execute_batch(&format!("PRAGMA user_version = {}", version))?;
    }

    Ok(())
}
