//! SQL schema generation with customizable table prefixes.
//!
//! # Table structure
//!
//! - `{prefix}types` — registered record types and their primary key field
//! - `{prefix}objects` — one row per stored object, with its key and JSON body
//!
//! The `pk` column has no declared type, so SQLite keeps text keys as
//! `TEXT`, integer keys as `INTEGER` and null keys as `NULL`; `42` and
//! `'42'` are different keys.

use crate::error::{Result, SessionError};

/// Validates that a table prefix contains only alphanumeric characters and underscores.
pub(crate) fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(SessionError::InvalidPrefix(prefix.to_string()));
    }
    if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SessionError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

/// Generates the SQL creating both tables and their index.
///
/// Uses `IF NOT EXISTS` throughout, so reopening an existing database is
/// harmless.
///
/// # Errors
///
/// Returns [`SessionError::InvalidPrefix`] if the prefix is invalid.
pub fn generate_schema_sql(prefix: &str) -> Result<String> {
    validate_prefix(prefix)?;

    let sql = format!(
        r#"
CREATE TABLE IF NOT EXISTS {prefix}types (
    name TEXT PRIMARY KEY,
    primary_key TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS {prefix}objects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type_name TEXT NOT NULL,
    pk,
    body TEXT NOT NULL,
    FOREIGN KEY (type_name) REFERENCES {prefix}types(name) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_{prefix}objects_key ON {prefix}objects(type_name, pk);
"#,
        prefix = prefix
    );

    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_prefix() {
        assert!(validate_prefix("mj_").is_ok());
        assert!(validate_prefix("test123").is_ok());
        assert!(validate_prefix("A_B_C").is_ok());
    }

    #[test]
    fn test_invalid_prefix() {
        assert!(validate_prefix("").is_err());
        assert!(validate_prefix("drop;--").is_err());
        assert!(validate_prefix("hello world").is_err());
        assert!(validate_prefix("test-prefix").is_err());
    }

    #[test]
    fn test_generate_schema_sql_contains_tables() {
        let sql = generate_schema_sql("mj_").unwrap();
        assert!(sql.contains("mj_types"));
        assert!(sql.contains("mj_objects"));
        assert!(sql.contains("idx_mj_objects_key"));
    }

    #[test]
    fn test_untyped_key_column_keeps_kinds_apart() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn.execute_batch(&generate_schema_sql("t_").unwrap()).unwrap();
        conn.execute(
            "INSERT INTO t_types (name, primary_key) VALUES ('Dog', 'id')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO t_objects (type_name, pk, body) VALUES ('Dog', '42', '{}')",
            [],
        )
        .unwrap();

        let by_int: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM t_objects WHERE pk IS ?1",
                rusqlite::params![42i64],
                |row| row.get(0),
            )
            .unwrap();
        let by_text: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM t_objects WHERE pk IS ?1",
                rusqlite::params!["42"],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(by_int, 0);
        assert_eq!(by_text, 1);
    }

    #[test]
    fn test_objects_require_registered_type() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn.execute_batch(&generate_schema_sql("t_").unwrap()).unwrap();
        assert!(conn
            .execute(
                "INSERT INTO t_objects (type_name, pk, body) VALUES ('Ghost', 1, '{}')",
                [],
            )
            .is_err());
    }
}
