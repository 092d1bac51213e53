use super::shared::{map_course_row, COURSE_COLUMNS};
use super::CourseService;
use crate::models::course::{CourseFields, CourseRecord};
use anyhow::{anyhow, Context, Result};
use chrono::Local;
use rusqlite::{self, params};
use uuid::Uuid;

impl<'a> CourseService<'a> {
    /// Insert a new course under a fresh UUID.
    pub fn create(&self, fields: &CourseFields) -> Result<CourseRecord> {
        fields.validate().map_err(|e| anyhow!(e))?;

        let id = Uuid::new_v4().to_string();
        let now = Local::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO courses (id, name, time, description, type, color, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    id,
                    fields.name.trim(),
                    fields.time.trim(),
                    fields.description,
                    fields.course_type,
                    fields.color,
                    &now,
                    &now,
                ],
            )
            .context("Failed to insert course")?;

        log::info!("Stored course {} ({})", id, fields.name.trim());
        self.get(&id)?
            .ok_or_else(|| anyhow!("Course {} vanished after insert", id))
    }

    /// Retrieve a course by ID.
    pub fn get(&self, id: &str) -> Result<Option<CourseRecord>> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM courses WHERE id = ?", COURSE_COLUMNS),
            [id],
            map_course_row,
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List every course in creation order.
    pub fn list_all(&self) -> Result<Vec<CourseRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM courses ORDER BY created_at ASC, rowid ASC",
            COURSE_COLUMNS
        ))?;

        let records = stmt
            .query_map([], map_course_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to fetch courses")?;

        Ok(records)
    }

    /// Update an existing course.
    pub fn update(&self, id: &str, fields: &CourseFields) -> Result<CourseRecord> {
        fields.validate().map_err(|e| anyhow!(e))?;

        let rows_affected = self
            .conn
            .execute(
                "UPDATE courses SET
                    name = ?, time = ?, description = ?, type = ?, color = ?, updated_at = ?
                 WHERE id = ?",
                params![
                    fields.name.trim(),
                    fields.time.trim(),
                    fields.description,
                    fields.course_type,
                    fields.color,
                    Local::now().to_rfc3339(),
                    id,
                ],
            )
            .context("Failed to update course")?;

        if rows_affected == 0 {
            return Err(anyhow!("Course with id {} not found", id));
        }

        self.get(id)?
            .ok_or_else(|| anyhow!("Course with id {} not found", id))
    }

    /// Delete a course by ID.
    pub fn delete(&self, id: &str) -> Result<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM courses WHERE id = ?", [id])
            .context("Failed to delete course")?;

        if rows_affected == 0 {
            return Err(anyhow!("Course with id {} not found", id));
        }

        Ok(())
    }
}
