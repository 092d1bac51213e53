use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::migrations;
use crate::models::course_type::default_course_types;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_courses_table(conn)?;
    run_course_migrations(conn)?;
    create_selections_table(conn)?;
    create_course_types_table(conn)?;
    seed_course_types(conn)?;
    create_indexes(conn)?;
    Ok(())
}

fn create_courses_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS courses (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            time TEXT NOT NULL,
            description TEXT,
            type TEXT NOT NULL DEFAULT 'General',
            color TEXT NOT NULL DEFAULT '#a5b4fc',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create courses table")?;

    Ok(())
}

/// Databases written by the first release only had id, name and time.
fn run_course_migrations(conn: &Connection) -> Result<()> {
    migrations::ensure_column(
        conn,
        "courses",
        "description",
        "ALTER TABLE courses ADD COLUMN description TEXT",
    )?;

    migrations::ensure_column(
        conn,
        "courses",
        "type",
        "ALTER TABLE courses ADD COLUMN type TEXT NOT NULL DEFAULT 'General'",
    )?;

    migrations::ensure_column(
        conn,
        "courses",
        "color",
        "ALTER TABLE courses ADD COLUMN color TEXT NOT NULL DEFAULT '#a5b4fc'",
    )?;

    if !migrations::column_exists(conn, "courses", "updated_at")? {
        conn.execute("ALTER TABLE courses ADD COLUMN updated_at TEXT", [])
            .context("Failed to add courses.updated_at")?;
        migrations::copy_column(conn, "courses", "created_at", "updated_at")?;
    }

    Ok(())
}

fn create_selections_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS selections (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            course_id TEXT NOT NULL,
            selected_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE,
            UNIQUE (user_id, course_id)
        )",
        [],
    )
    .context("Failed to create selections table")?;

    Ok(())
}

fn create_course_types_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS course_types (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            color TEXT NOT NULL,
            is_system INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )
    .context("Failed to create course_types table")?;

    Ok(())
}

fn seed_course_types(conn: &Connection) -> Result<()> {
    for course_type in default_course_types() {
        conn.execute(
            "INSERT OR IGNORE INTO course_types (name, color, is_system) VALUES (?1, ?2, 1)",
            params![course_type.name, course_type.color],
        )
        .with_context(|| format!("Failed to seed course type {}", course_type.name))?;
    }

    Ok(())
}

fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute("CREATE INDEX IF NOT EXISTS idx_course_time ON courses(time)", [])
        .context("Failed to create course time index")?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_selection_user ON selections(user_id)",
        [],
    )
    .context("Failed to create selection index")?;

    Ok(())
}
