// Color helpers
// Colors are carried as opaque hex strings; only the format is checked.

/// Swatches offered by pickers when adding a course.
pub const COURSE_PALETTE: [&str; 8] = [
    "#fca5a5", "#fdba74", "#fcd34d", "#86efac", "#93c5fd", "#a5b4fc", "#d8b4fe", "#f0abfc",
];

/// Color used when a course is saved without one.
pub const DEFAULT_COURSE_COLOR: &str = "#a5b4fc";

/// Check if a string is a valid hex color code (#RGB, #RRGGBB or #RRGGBBAA).
pub fn is_valid_hex_color(color: &str) -> bool {
    let color = color.trim();
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
}
