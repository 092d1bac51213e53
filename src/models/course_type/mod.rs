//! Course type model.
//!
//! Types label courses (General, Required, Elective, ...) and carry a
//! suggested color for the grid. Users may add their own types.

use serde::{Deserialize, Serialize};

use crate::utils::color::is_valid_hex_color;

/// Type assigned to a course when none is chosen.
pub const DEFAULT_COURSE_TYPE: &str = "General";

/// A course type with its suggested display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseType {
    /// Unique identifier (database primary key)
    pub id: Option<i64>,
    /// Display name (unique, case-insensitive)
    pub name: String,
    /// Hex color code suggested for courses of this type
    pub color: String,
    /// Built-in types cannot be renamed or deleted
    pub is_system: bool,
}

impl CourseType {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color: color.into(),
            is_system: false,
        }
    }

    pub fn system(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            is_system: true,
            ..Self::new(name, color)
        }
    }

    /// Validate the type data.
    pub fn validate(&self) -> Result<(), CourseTypeValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CourseTypeValidationError::EmptyName);
        }
        if name.chars().count() > 50 {
            return Err(CourseTypeValidationError::NameTooLong);
        }
        if !is_valid_hex_color(&self.color) {
            return Err(CourseTypeValidationError::InvalidColor);
        }
        Ok(())
    }
}

/// Validation errors for CourseType.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseTypeValidationError {
    EmptyName,
    NameTooLong,
    InvalidColor,
}

impl std::fmt::Display for CourseTypeValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Course type name cannot be empty"),
            Self::NameTooLong => write!(f, "Course type name must be 50 characters or less"),
            Self::InvalidColor => write!(f, "Invalid color format (use hex like #FF0000)"),
        }
    }
}

impl std::error::Error for CourseTypeValidationError {}

/// Types that ship with the application.
pub fn default_course_types() -> Vec<CourseType> {
    vec![
        CourseType::system(DEFAULT_COURSE_TYPE, "#ffffff"),
        CourseType::system("Required", "#ffcccc"),
        CourseType::system("Elective", "#ccffcc"),
    ]
}
