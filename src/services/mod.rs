// Service module exports

pub mod conflict;
pub mod course;
pub mod course_type;
pub mod database;
pub mod planner;
pub mod pool;
pub mod projector;
pub mod settings;
