//! Course group model.
//!
//! A course group is one named course occupying one or more periods on a
//! single day. Groups are built either from a [`CourseDraft`] (the add-course
//! form) or from a flat [`CourseRecord`] loaded from storage.

pub mod periods;
pub mod time_code;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use crate::models::course_type::DEFAULT_COURSE_TYPE;
use crate::models::slot::{Day, Slot};
use crate::utils::color::{is_valid_hex_color, DEFAULT_COURSE_COLOR};
use time_code::MAX_ENCODED_PERIOD;

/// Maximum course name length in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Opaque, stable identity of a course group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Fresh random id (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for GroupId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validation errors for course input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseValidationError {
    EmptyName,
    NameTooLong,
    EmptyType,
    InvalidColor(String),
    NoPeriods,
    InvalidPeriodRange { start: u8, end: u8 },
    PeriodOutOfRange { period: u8, max: u8 },
    MalformedTime(String),
}

impl fmt::Display for CourseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Course name cannot be empty"),
            Self::NameTooLong => {
                write!(f, "Course name must be {} characters or less", MAX_NAME_LEN)
            }
            Self::EmptyType => write!(f, "Course type cannot be empty"),
            Self::InvalidColor(color) => {
                write!(f, "Invalid color '{}' (use hex like #a5b4fc)", color)
            }
            Self::NoPeriods => write!(f, "A course needs at least one period"),
            Self::InvalidPeriodRange { start, end } => write!(
                f,
                "Start period {} must not be after end period {}",
                start, end
            ),
            Self::PeriodOutOfRange { period, max } => {
                write!(f, "Period {} is outside the grid (1-{})", period, max)
            }
            Self::MalformedTime(code) => write!(
                f,
                "Malformed time '{}' (first digit is the day 1-5, the rest are periods, e.g. 289)",
                code
            ),
        }
    }
}

impl std::error::Error for CourseValidationError {}

fn validate_name(name: &str) -> Result<(), CourseValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CourseValidationError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CourseValidationError::NameTooLong);
    }
    Ok(())
}

fn validate_style(course_type: &str, color: &str) -> Result<(), CourseValidationError> {
    if course_type.trim().is_empty() {
        return Err(CourseValidationError::EmptyType);
    }
    if !is_valid_hex_color(color) {
        return Err(CourseValidationError::InvalidColor(color.to_string()));
    }
    Ok(())
}

fn validate_periods(periods: &BTreeSet<u8>, max_period: u8) -> Result<(), CourseValidationError> {
    let (Some(&first), Some(&last)) = (periods.first(), periods.last()) else {
        return Err(CourseValidationError::NoPeriods);
    };
    if first == 0 {
        return Err(CourseValidationError::PeriodOutOfRange { period: 0, max: max_period });
    }
    if last > max_period {
        return Err(CourseValidationError::PeriodOutOfRange { period: last, max: max_period });
    }
    Ok(())
}

/// The add-course form: exactly the fields a user fills in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDraft {
    pub name: String,
    pub day: Day,
    pub start_period: u8,
    pub end_period: u8,
    pub course_type: String,
    pub color: String,
    pub description: Option<String>,
}

impl CourseDraft {
    /// Draft for a contiguous period range with the default type and color.
    pub fn new(name: impl Into<String>, day: Day, start_period: u8, end_period: u8) -> Self {
        Self {
            name: name.into(),
            day,
            start_period,
            end_period,
            course_type: DEFAULT_COURSE_TYPE.to_string(),
            color: DEFAULT_COURSE_COLOR.to_string(),
            description: None,
        }
    }

    /// Draft occupying a single period.
    pub fn single(name: impl Into<String>, day: Day, period: u8) -> Self {
        Self::new(name, day, period, period)
    }

    pub fn with_type(mut self, course_type: impl Into<String>) -> Self {
        self.course_type = course_type.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validate against the widest grid the time encoding supports.
    pub fn validate(&self) -> Result<(), CourseValidationError> {
        self.validate_within(MAX_ENCODED_PERIOD)
    }

    /// Validate against a grid with `max_period` rows.
    pub fn validate_within(&self, max_period: u8) -> Result<(), CourseValidationError> {
        validate_name(&self.name)?;
        if self.start_period > self.end_period {
            return Err(CourseValidationError::InvalidPeriodRange {
                start: self.start_period,
                end: self.end_period,
            });
        }
        validate_periods(&self.periods(), max_period)?;
        validate_style(&self.course_type, &self.color)
    }

    /// The periods covered by the draft's range.
    pub fn periods(&self) -> BTreeSet<u8> {
        (self.start_period..=self.end_period).collect()
    }

    /// Flatten into storage fields, encoding the time.
    pub fn to_fields(&self) -> Result<CourseFields, CourseValidationError> {
        self.validate()?;
        Ok(CourseFields {
            name: self.name.trim().to_string(),
            time: time_code::encode(self.day, &self.periods())?,
            description: self.description.clone(),
            course_type: self.course_type.trim().to_string(),
            color: self.color.trim().to_string(),
        })
    }
}

/// Flat course fields as sent to storage on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseFields {
    pub name: String,
    pub time: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub course_type: String,
    pub color: String,
}

impl CourseFields {
    /// Fields from a name and an encoded time, with default type and color.
    pub fn new(name: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time: time.into(),
            description: None,
            course_type: DEFAULT_COURSE_TYPE.to_string(),
            color: DEFAULT_COURSE_COLOR.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), CourseValidationError> {
        validate_name(&self.name)?;
        time_code::decode(&self.time)?;
        validate_style(&self.course_type, &self.color)
    }
}

/// A stored course row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub id: String,
    pub name: String,
    pub time: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub course_type: String,
    pub color: String,
}

impl CourseRecord {
    pub fn from_fields(id: impl Into<String>, fields: CourseFields) -> Self {
        Self {
            id: id.into(),
            name: fields.name,
            time: fields.time,
            description: fields.description,
            course_type: fields.course_type,
            color: fields.color,
        }
    }
}

/// A named course on one day, with its selection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseGroup {
    pub id: GroupId,
    pub name: String,
    pub day: Day,
    pub periods: BTreeSet<u8>,
    pub course_type: String,
    pub color: String,
    pub description: Option<String>,
    pub selected: bool,
}

impl CourseGroup {
    /// Build an unselected group from a validated draft.
    pub fn from_draft(id: GroupId, draft: &CourseDraft) -> Result<Self, CourseValidationError> {
        draft.validate()?;
        Ok(Self {
            id,
            name: draft.name.trim().to_string(),
            day: draft.day,
            periods: draft.periods(),
            course_type: draft.course_type.trim().to_string(),
            color: draft.color.trim().to_string(),
            description: draft.description.clone(),
            selected: false,
        })
    }

    /// Build an unselected group from a stored record, decoding its time.
    pub fn from_record(record: &CourseRecord) -> Result<Self, CourseValidationError> {
        validate_name(&record.name)?;
        let (day, periods) = time_code::decode(&record.time)?;
        Ok(Self {
            id: GroupId::from(record.id.as_str()),
            name: record.name.trim().to_string(),
            day,
            periods,
            course_type: record.course_type.clone(),
            color: record.color.clone(),
            description: record.description.clone(),
            selected: false,
        })
    }

    /// Check the invariants of a group on a grid with `max_period` rows.
    pub fn validate(&self, max_period: u8) -> Result<(), CourseValidationError> {
        validate_name(&self.name)?;
        validate_periods(&self.periods, max_period)?;
        validate_style(&self.course_type, &self.color)
    }

    /// Every slot this group occupies, in period order.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.periods.iter().map(move |&period| Slot { day: self.day, period })
    }

    pub fn occupies(&self, slot: Slot) -> bool {
        self.day == slot.day && self.periods.contains(&slot.period)
    }

    /// Lowest period; groups are never empty once validated.
    pub fn first_period(&self) -> Option<u8> {
        self.periods.first().copied()
    }

    /// Human readable period range, e.g. "1-3" or "1,3".
    pub fn periods_label(&self) -> String {
        periods::format_periods(&self.periods)
    }

    /// Flatten into storage fields.
    pub fn to_fields(&self) -> Result<CourseFields, CourseValidationError> {
        Ok(CourseFields {
            name: self.name.clone(),
            time: time_code::encode(self.day, &self.periods)?,
            description: self.description.clone(),
            course_type: self.course_type.clone(),
            color: self.color.clone(),
        })
    }
}
