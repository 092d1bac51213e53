use anyhow::{Context, Result};
use rusqlite::Connection;

/// Checks whether a column exists on a table.
pub fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let exists: i32 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
            [table, column],
            |row| row.get(0),
        )
        .context("Failed to inspect table info")?;

    Ok(exists > 0)
}

/// Adds a column if it does not already exist.
pub fn ensure_column(conn: &Connection, table: &str, column: &str, ddl: &str) -> Result<()> {
    if column_exists(conn, table, column)? {
        return Ok(());
    }

    log::info!("Migrating {}: adding column {}", table, column);
    conn.execute(ddl, [])
        .with_context(|| format!("Failed to add {}.{}", table, column))?;
    Ok(())
}

/// Fills `to` from `from` wherever `from` has a value.
pub fn copy_column(conn: &Connection, table: &str, from: &str, to: &str) -> Result<()> {
    let sql = format!("UPDATE {table} SET {to} = {from} WHERE {from} IS NOT NULL");
    conn.execute(&sql, [])
        .with_context(|| format!("Failed to backfill {table}.{to} from {from}"))?;
    Ok(())
}
