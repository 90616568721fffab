//! Error types for the SQLite object session.
//!
//! Provides a unified error type covering database access, JSON encoding of
//! stored bodies, configuration loading, and record validation failures.

use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// A stored or supplied body could not be encoded or decoded as JSON.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Configuration file could not be parsed or written.
    #[error("config error: {0}")]
    ConfigError(#[from] serde_yaml::Error),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Table prefix contains invalid characters.
    #[error("invalid prefix '{0}': must contain only alphanumeric characters and underscores")]
    InvalidPrefix(String),

    /// The record type has not been registered with the session.
    #[error("record type not registered: {0}")]
    UnknownType(String),

    /// The object behind a managed handle has been deleted.
    #[error("{type_name} object {id} no longer exists")]
    ObjectDeleted { type_name: String, id: i64 },

    /// A record body is not a JSON object.
    #[error("{0} body must be a JSON object")]
    NotAnObject(String),

    /// A record body lacks its primary key field.
    #[error("{type_name} body is missing primary key field '{field}'")]
    MissingPrimaryKey { type_name: String, field: String },

    /// The primary key field holds neither text, an integer, nor null.
    #[error("{type_name} primary key field '{field}' must be text, an integer, or null")]
    InvalidPrimaryKey { type_name: String, field: String },

    /// Another object of the same type already uses this key.
    #[error("duplicate primary key {key} for {type_name}")]
    DuplicatePrimaryKey { type_name: String, key: String },

    /// Managed handles cannot change their primary key.
    #[error("primary key field '{field}' of {type_name} cannot be modified")]
    PrimaryKeyImmutable { type_name: String, field: String },
}

/// Convenience alias for results with [`SessionError`].
pub type Result<T> = std::result::Result<T, SessionError>;
