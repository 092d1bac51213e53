use rusqlite::Row;

use crate::models::course::CourseRecord;

pub(super) const COURSE_COLUMNS: &str = "id, name, time, description, type, color";

pub(super) fn map_course_row(row: &Row) -> rusqlite::Result<CourseRecord> {
    Ok(CourseRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        time: row.get(2)?,
        description: row.get(3)?,
        course_type: row.get(4)?,
        color: row.get(5)?,
    })
}
