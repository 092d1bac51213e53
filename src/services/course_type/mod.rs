//! Course type service for CRUD operations on course types.
//!
//! Built-in types are seeded by the schema; users can add, recolor, rename
//! and delete their own.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};

use crate::models::course_type::{CourseType, DEFAULT_COURSE_TYPE};

/// Service for managing course types.
pub struct CourseTypeService<'a> {
    conn: &'a Connection,
}

fn map_type_row(row: &Row) -> rusqlite::Result<CourseType> {
    Ok(CourseType {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        color: row.get(2)?,
        is_system: row.get::<_, i32>(3)? != 0,
    })
}

impl<'a> CourseTypeService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new course type. Names are unique regardless of case.
    pub fn create(&self, course_type: CourseType) -> Result<CourseType> {
        course_type.validate().map_err(|e| anyhow::anyhow!("{}", e))?;

        if self.name_exists(&course_type.name, None)? {
            return Err(anyhow::anyhow!(
                "Course type '{}' already exists",
                course_type.name.trim()
            ));
        }

        self.conn
            .execute(
                "INSERT INTO course_types (name, color, is_system) VALUES (?1, ?2, ?3)",
                params![
                    course_type.name.trim(),
                    course_type.color,
                    course_type.is_system as i32,
                ],
            )
            .context("Failed to insert course type")?;

        let id = self.conn.last_insert_rowid();
        self.get_by_id(id)
    }

    pub fn get_by_id(&self, id: i64) -> Result<CourseType> {
        self.conn
            .query_row(
                "SELECT id, name, color, is_system FROM course_types WHERE id = ?1",
                params![id],
                map_type_row,
            )
            .context("Course type not found")
    }

    pub fn get_by_name(&self, name: &str) -> Result<Option<CourseType>> {
        let result = self.conn.query_row(
            "SELECT id, name, color, is_system FROM course_types WHERE name = ?1 COLLATE NOCASE",
            params![name.trim()],
            map_type_row,
        );

        match result {
            Ok(course_type) => Ok(Some(course_type)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All types: built-in first, then by name.
    pub fn list_all(&self) -> Result<Vec<CourseType>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, color, is_system
             FROM course_types
             ORDER BY is_system DESC, id ASC",
        )?;

        let mut types = stmt
            .query_map([], map_type_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to fetch course types")?;

        // Built-in types keep their seeded order; user types sort by name.
        let user_start = types.iter().position(|t| !t.is_system).unwrap_or(types.len());
        types[user_start..].sort_by_key(|t| t.name.to_lowercase());
        Ok(types)
    }

    /// Update an existing type. Built-in types may only change color.
    pub fn update(&self, course_type: &CourseType) -> Result<()> {
        course_type.validate().map_err(|e| anyhow::anyhow!("{}", e))?;

        let id = course_type
            .id
            .ok_or_else(|| anyhow::anyhow!("Course type ID is required for update"))?;
        let existing = self.get_by_id(id)?;

        if existing.is_system {
            self.conn
                .execute(
                    "UPDATE course_types SET color = ?1 WHERE id = ?2",
                    params![course_type.color, id],
                )
                .context("Failed to update built-in course type")?;
            return Ok(());
        }

        if self.name_exists(&course_type.name, Some(id))? {
            return Err(anyhow::anyhow!(
                "Course type '{}' already exists",
                course_type.name.trim()
            ));
        }

        self.conn
            .execute(
                "UPDATE course_types SET name = ?1, color = ?2 WHERE id = ?3",
                params![course_type.name.trim(), course_type.color, id],
            )
            .context("Failed to update course type")?;

        if existing.name != course_type.name.trim() {
            self.conn
                .execute(
                    "UPDATE courses SET type = ?1 WHERE type = ?2",
                    params![course_type.name.trim(), existing.name],
                )
                .context("Failed to rename type on courses")?;
        }

        Ok(())
    }

    /// Delete a user type; its courses fall back to the default type.
    pub fn delete(&self, id: i64) -> Result<()> {
        let course_type = self.get_by_id(id)?;
        if course_type.is_system {
            return Err(anyhow::anyhow!(
                "Cannot delete built-in course type '{}'",
                course_type.name
            ));
        }

        self.conn
            .execute(
                "UPDATE courses SET type = ?1 WHERE type = ?2",
                params![DEFAULT_COURSE_TYPE, course_type.name],
            )
            .context("Failed to reset type on courses")?;

        self.conn
            .execute("DELETE FROM course_types WHERE id = ?1", params![id])
            .context("Failed to delete course type")?;

        log::info!("Deleted course type '{}'", course_type.name);
        Ok(())
    }

    /// Check if a type name already exists (excluding a specific ID).
    pub fn name_exists(&self, name: &str, exclude_id: Option<i64>) -> Result<bool> {
        let count: i32 = self.conn.query_row(
            "SELECT COUNT(*) FROM course_types
             WHERE LOWER(name) = LOWER(?1) AND (?2 IS NULL OR id != ?2)",
            params![name.trim(), exclude_id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// Number of courses using a type.
    pub fn usage_count(&self, type_name: &str) -> Result<i32> {
        let count: i32 = self.conn.query_row(
            "SELECT COUNT(*) FROM courses WHERE type = ?1",
            params![type_name],
            |row| row.get(0),
        )?;

        Ok(count)
    }
}
