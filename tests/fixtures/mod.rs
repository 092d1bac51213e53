// Test fixtures - reusable test data
// Provides consistent courses and databases across integration tests

#![allow(dead_code)]

use course_planner::models::course::CourseDraft;
use course_planner::models::slot::Day;
use course_planner::services::course::CourseService;
use course_planner::services::database::Database;
use course_planner::services::planner::SchedulePlanner;
use std::path::Path;

/// Open (creating if needed) a database file and apply the schema.
pub fn open_db(path: &Path) -> Database {
    let db = Database::new(path.to_str().unwrap()).expect("Failed to create database");
    db.initialize_schema().expect("Failed to initialize schema");
    db
}

/// A planner over `db` with the pool loaded from storage.
pub fn planner(db: &Database) -> SchedulePlanner<CourseService<'_>> {
    let mut planner = SchedulePlanner::new(CourseService::new(db.connection()), 8);
    planner.load().expect("Failed to load courses");
    planner
}

/// Sample courses for the weekly grid
pub mod courses {
    use super::*;

    /// Monday periods 1-3
    pub fn algebra() -> CourseDraft {
        CourseDraft::new("Algebra", Day::Monday, 1, 3).with_type("Required")
    }

    /// Monday period 2, overlapping [`algebra`]
    pub fn biology() -> CourseDraft {
        CourseDraft::single("Biology", Day::Monday, 2).with_color("#ccffcc")
    }

    /// Tuesday period 1
    pub fn chemistry() -> CourseDraft {
        CourseDraft::single("Chemistry", Day::Tuesday, 1)
    }

    /// Monday period 1
    pub fn drawing() -> CourseDraft {
        CourseDraft::single("Drawing", Day::Monday, 1).with_type("Elective")
    }

    /// Monday periods 1-2
    pub fn economics() -> CourseDraft {
        CourseDraft::new("Economics", Day::Monday, 1, 2).with_description("Micro and macro")
    }
}
