//! Course storage service.
//!
//! [`CourseStore`] is the persistence contract the planner depends on;
//! [`CourseService`] implements it on SQLite. CRUD lives in `crud`, the
//! per-user selection flags in `selection`.

use anyhow::Result;
use rusqlite::Connection;

use crate::models::course::{CourseFields, CourseRecord};
use crate::services::pool::SelectionChange;

pub mod crud;
pub mod selection;
mod shared;

/// Selections are stored per user; the planner is single-user.
pub const LOCAL_USER: &str = "local";

/// Persistence operations for courses and their selection state.
#[cfg_attr(test, mockall::automock)]
pub trait CourseStore {
    /// Store a new course under a fresh id.
    fn create(&self, fields: &CourseFields) -> Result<CourseRecord>;
    /// Every stored course, oldest first.
    fn list(&self) -> Result<Vec<CourseRecord>>;
    /// Replace the fields of an existing course.
    fn update(&self, id: &str, fields: &CourseFields) -> Result<CourseRecord>;
    /// Remove a course (and its selection).
    fn delete(&self, id: &str) -> Result<()>;
    /// Apply selection flag changes all-or-nothing.
    fn save_selection(&self, changes: &[SelectionChange]) -> Result<()>;
    /// Ids of the selected courses, in selection order.
    fn load_selection(&self) -> Result<Vec<String>>;
}

/// Service for managing courses stored in SQLite.
pub struct CourseService<'a> {
    pub(crate) conn: &'a Connection,
    pub(crate) user_id: String,
}

impl<'a> CourseService<'a> {
    /// Create a new CourseService for the local user.
    pub fn new(conn: &'a Connection) -> Self {
        Self::for_user(conn, LOCAL_USER)
    }

    pub fn for_user(conn: &'a Connection, user_id: impl Into<String>) -> Self {
        Self {
            conn,
            user_id: user_id.into(),
        }
    }
}

impl CourseStore for CourseService<'_> {
    fn create(&self, fields: &CourseFields) -> Result<CourseRecord> {
        CourseService::create(self, fields)
    }

    fn list(&self) -> Result<Vec<CourseRecord>> {
        self.list_all()
    }

    fn update(&self, id: &str, fields: &CourseFields) -> Result<CourseRecord> {
        CourseService::update(self, id, fields)
    }

    fn delete(&self, id: &str) -> Result<()> {
        CourseService::delete(self, id)
    }

    fn save_selection(&self, changes: &[SelectionChange]) -> Result<()> {
        self.apply_selection(changes)
    }

    fn load_selection(&self) -> Result<Vec<String>> {
        self.selected_ids()
    }
}
