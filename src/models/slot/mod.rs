//! Slot model: one (day, period) cell of the weekly grid.
//!
//! The week is Monday to Friday only. Periods are 1-based; the upper bound
//! is a grid setting rather than a property of the slot itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A teaching day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Day {
    /// All days in grid column order.
    pub const ALL: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    /// Map the 1-based day number used by the time encoding (1 = Monday).
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Day::Monday),
            2 => Some(Day::Tuesday),
            3 => Some(Day::Wednesday),
            4 => Some(Day::Thursday),
            5 => Some(Day::Friday),
            _ => None,
        }
    }

    /// The 1-based day number (Monday = 1).
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Zero-based grid column.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
        }
    }

    pub fn short_name(self) -> &'static str {
        &self.name()[..3]
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a day string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDayError(pub String);

impl fmt::Display for ParseDayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown day '{}' (expected Monday-Friday or 1-5)", self.0)
    }
}

impl std::error::Error for ParseDayError {}

impl FromStr for Day {
    type Err = ParseDayError;

    /// Accepts full names, three-letter abbreviations (any case) or 1-5.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(number) = trimmed.parse::<u8>() {
            return Day::from_number(number).ok_or_else(|| ParseDayError(s.to_string()));
        }

        let lower = trimmed.to_ascii_lowercase();
        Day::ALL
            .into_iter()
            .find(|day| {
                let name = day.name().to_ascii_lowercase();
                lower == name || lower == name[..3]
            })
            .ok_or_else(|| ParseDayError(s.to_string()))
    }
}

/// One grid cell. Equality and ordering are by (day, period).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub day: Day,
    pub period: u8,
}

impl Slot {
    /// Create a slot. Period 0 is rejected since periods are 1-based.
    pub fn new(day: Day, period: u8) -> Option<Self> {
        (period >= 1).then_some(Self { day, period })
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} period {}", self.day, self.period)
    }
}
