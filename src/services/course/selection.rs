use super::CourseService;
use crate::services::pool::SelectionChange;
use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::params;
use uuid::Uuid;

impl<'a> CourseService<'a> {
    /// Apply selection changes in one transaction; any failure leaves the
    /// stored selection as it was.
    pub fn apply_selection(&self, changes: &[SelectionChange]) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to start selection transaction")?;

        for change in changes {
            if change.selected {
                tx.execute(
                    "INSERT OR IGNORE INTO selections (id, user_id, course_id, selected_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        Uuid::new_v4().to_string(),
                        self.user_id,
                        change.id.as_str(),
                        Local::now().to_rfc3339(),
                    ],
                )
                .with_context(|| format!("Failed to select course {}", change.id))?;
            } else {
                tx.execute(
                    "DELETE FROM selections WHERE user_id = ?1 AND course_id = ?2",
                    params![self.user_id, change.id.as_str()],
                )
                .with_context(|| format!("Failed to unselect course {}", change.id))?;
            }
        }

        tx.commit().context("Failed to commit selection changes")?;
        Ok(())
    }

    /// Ids of the courses this user has selected, oldest selection first.
    pub fn selected_ids(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT course_id FROM selections
             WHERE user_id = ?1
             ORDER BY selected_at ASC, rowid ASC",
        )?;

        let ids = stmt
            .query_map([&self.user_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .context("Failed to fetch selections")?;

        Ok(ids)
    }
}
