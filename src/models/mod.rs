// Module exports for models

pub mod course;
pub mod course_type;
pub mod settings;
pub mod slot;
