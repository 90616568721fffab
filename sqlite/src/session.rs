//! The SQLite-backed object session.
//!
//! A [`Session`] stores records of registered types as JSON bodies keyed by
//! their primary key, and hands out [`ManagedObject`] handles that read and
//! write through it. Handles borrow the session, so none can outlive it.
//!
//! # Example
//!
//! ```
//! use managed_json_core::Record;
//! use managed_json_sqlite::Session;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Dog {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl Record for Dog {
//!     const TYPE_NAME: &'static str = "Dog";
//!     const PRIMARY_KEY: &'static str = "id";
//! }
//!
//! let session = Session::open_in_memory("mj_").unwrap();
//! session.register::<Dog>().unwrap();
//! session.add(&Dog { id: 1, name: "Rex".into() }).unwrap();
//!
//! let rex = session.find::<Dog>(1).unwrap().unwrap();
//! assert_eq!(rex.detach().unwrap(), Dog { id: 1, name: "Rex".into() });
//! ```

use std::path::Path;

use managed_json_core::{KeyValue, ObjectStore, Record, find_record};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::object::{Managed, ManagedObject};
use crate::results::Results;
use crate::schema::{generate_schema_sql, validate_prefix};

/// A live object session over one SQLite connection.
#[derive(Debug)]
pub struct Session {
    conn: Connection,
    prefix: String,
}

impl Session {
    /// Opens (or creates) the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidPrefix`] for an invalid prefix, or
    /// [`SessionError::DatabaseError`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>, prefix: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let session = Self::from_connection(Connection::open(path)?, prefix)?;
        debug!(path = %path.display(), prefix = %session.prefix, "opened object session");
        Ok(session)
    }

    /// Opens a fresh in-memory database.
    pub fn open_in_memory(prefix: impl Into<String>) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, prefix)
    }

    /// Opens the database described by `config`.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        match &config.path {
            Some(path) => Self::open(path, config.prefix.clone()),
            None => Self::open_in_memory(config.prefix.clone()),
        }
    }

    /// Wraps an existing connection, creating the session tables if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidPrefix`] if the prefix is invalid.
    pub fn from_connection(conn: Connection, prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(&generate_schema_sql(&prefix)?)?;
        Ok(Self { conn, prefix })
    }

    /// Table prefix of this session.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Closes the underlying connection.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| err.into())
    }

    /// Consumes the session and returns its connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Registers record type `R`. Registering twice is a no-op.
    pub fn register<R: Record>(&self) -> Result<()> {
        self.register_type(R::TYPE_NAME, R::PRIMARY_KEY)
    }

    /// Registers a record type by name with its primary key field.
    pub fn register_type(&self, name: &str, primary_key: &str) -> Result<()> {
        let inserted = self.conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {}types (name, primary_key) VALUES (?1, ?2)",
                self.prefix
            ),
            params![name, primary_key],
        )?;
        if inserted > 0 {
            debug!(type_name = name, primary_key, "registered record type");
        }
        Ok(())
    }

    /// Lists registered `(type name, primary key field)` pairs, ordered by name.
    pub fn registered_types(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT name, primary_key FROM {}types ORDER BY name",
            self.prefix
        ))?;
        let types: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(types)
    }

    /// Stores `record` and returns a managed handle to it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownType`] if `R` is not registered, and
    /// the validation errors of [`add_value`](Self::add_value).
    pub fn add<R: Record>(&self, record: &R) -> Result<Managed<'_, R>> {
        let body = serde_json::to_value(record)?;
        Ok(Managed::new(self.add_value(R::TYPE_NAME, body)?))
    }

    /// Stores a JSON body as an object of `type_name`.
    ///
    /// The body must be a JSON object whose primary key field holds text,
    /// an integer, or null. Keys are unique per type, null included.
    pub fn add_value(&self, type_name: &str, body: Value) -> Result<ManagedObject<'_>> {
        let field = self.primary_key_field(type_name)?;
        let fields = body
            .as_object()
            .ok_or_else(|| SessionError::NotAnObject(type_name.to_string()))?;
        let key_json = fields
            .get(&field)
            .ok_or_else(|| SessionError::MissingPrimaryKey {
                type_name: type_name.to_string(),
                field: field.clone(),
            })?;
        let key = sql_key(key_json).ok_or_else(|| SessionError::InvalidPrimaryKey {
            type_name: type_name.to_string(),
            field: field.clone(),
        })?;

        let tx = self.conn.unchecked_transaction()?;
        if self.lookup_id(type_name, &key)?.is_some() {
            return Err(SessionError::DuplicatePrimaryKey {
                type_name: type_name.to_string(),
                key: key_json.to_string(),
            });
        }
        tx.execute(
            &format!(
                "INSERT INTO {}objects (type_name, pk, body) VALUES (?1, ?2, ?3)",
                self.prefix
            ),
            params![type_name, key, serde_json::to_string(&body)?],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!(type_name, id, "added object");
        Ok(ManagedObject::new(self, type_name, id))
    }

    /// Finds the `R` whose primary key equals `key`.
    ///
    /// Keys that are neither text nor integer never match.
    pub fn find<R: Record>(&self, key: impl Into<KeyValue>) -> Result<Option<Managed<'_, R>>> {
        Ok(find_record::<R, _>(self, key)?.map(Managed::new))
    }

    /// All objects of type `R`, in insertion order.
    pub fn all<R: Record>(&self) -> Result<Results<'_, R>> {
        self.primary_key_field(R::TYPE_NAME)?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id FROM {}objects WHERE type_name = ?1 ORDER BY id",
            self.prefix
        ))?;
        let ids = stmt
            .query_map(params![R::TYPE_NAME], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;
        Ok(Results::new(self, ids))
    }

    /// Objects of type `R` whose `field` equals `value`, in insertion order.
    ///
    /// Matching is on scalar JSON values; objects lacking the field match a
    /// `null` value.
    pub fn filter<R: Record>(&self, field: &str, value: impl Serialize) -> Result<Results<'_, R>> {
        self.primary_key_field(R::TYPE_NAME)?;
        let value = json_to_sql(&serde_json::to_value(value)?);
        let path = format!("$.\"{}\"", field.replace('"', "\\\""));
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id FROM {}objects WHERE type_name = ?1 AND json_extract(body, ?2) IS ?3 ORDER BY id",
            self.prefix
        ))?;
        let ids = stmt
            .query_map(params![R::TYPE_NAME, path, value], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;
        Ok(Results::new(self, ids))
    }

    /// All objects of `type_name` as untyped handles, in insertion order.
    pub fn objects(&self, type_name: &str) -> Result<Vec<ManagedObject<'_>>> {
        self.primary_key_field(type_name)?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id FROM {}objects WHERE type_name = ?1 ORDER BY id",
            self.prefix
        ))?;
        let objects = stmt
            .query_map(params![type_name], |row| row.get(0))?
            .map(|id| id.map(|id| ManagedObject::new(self, type_name, id)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(objects)
    }

    /// Number of stored objects of `type_name`.
    pub fn count(&self, type_name: &str) -> Result<usize> {
        self.primary_key_field(type_name)?;
        let count: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {}objects WHERE type_name = ?1",
                self.prefix
            ),
            params![type_name],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Primary key field of a registered type.
    pub(crate) fn primary_key_field(&self, type_name: &str) -> Result<String> {
        self.conn
            .query_row(
                &format!("SELECT primary_key FROM {}types WHERE name = ?1", self.prefix),
                params![type_name],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| SessionError::UnknownType(type_name.to_string()))
    }

    /// Current body of object `id`.
    pub(crate) fn load_body(&self, type_name: &str, id: i64) -> Result<Value> {
        let body: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT body FROM {}objects WHERE id = ?1", self.prefix),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let body = body.ok_or_else(|| SessionError::ObjectDeleted {
            type_name: type_name.to_string(),
            id,
        })?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Replaces the body of object `id` inside a transaction, via `edit`.
    pub(crate) fn update_body<F>(&self, type_name: &str, id: i64, edit: F) -> Result<()>
    where
        F: FnOnce(&mut serde_json::Map<String, Value>),
    {
        let tx = self.conn.unchecked_transaction()?;
        let mut body = self.load_body(type_name, id)?;
        let fields = body
            .as_object_mut()
            .ok_or_else(|| SessionError::NotAnObject(type_name.to_string()))?;
        edit(fields);
        tx.execute(
            &format!("UPDATE {}objects SET body = ?1 WHERE id = ?2", self.prefix),
            params![serde_json::to_string(&body)?, id],
        )?;
        tx.commit()?;
        debug!(type_name, id, "updated object");
        Ok(())
    }

    pub(crate) fn object_exists(&self, id: i64) -> Result<bool> {
        let exists = self.conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {}objects WHERE id = ?1)",
                self.prefix
            ),
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    pub(crate) fn delete_object(&self, type_name: &str, id: i64) -> Result<()> {
        let deleted = self.conn.execute(
            &format!("DELETE FROM {}objects WHERE id = ?1", self.prefix),
            params![id],
        )?;
        if deleted == 0 {
            return Err(SessionError::ObjectDeleted {
                type_name: type_name.to_string(),
                id,
            });
        }
        debug!(type_name, id, "deleted object");
        Ok(())
    }

    fn lookup_id(&self, type_name: &str, key: &SqlValue) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row(
                &format!(
                    "SELECT id FROM {}objects WHERE type_name = ?1 AND pk IS ?2",
                    self.prefix
                ),
                params![type_name, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn find_by_sql_key(&self, type_name: &str, key: SqlValue) -> Result<Option<ManagedObject<'_>>> {
        self.primary_key_field(type_name)?;
        Ok(self
            .lookup_id(type_name, &key)?
            .map(|id| ManagedObject::new(self, type_name, id)))
    }
}

impl ObjectStore for Session {
    type Object<'s> = ManagedObject<'s>;
    type Error = SessionError;

    fn find_by_text(&self, type_name: &str, key: &str) -> Result<Option<ManagedObject<'_>>> {
        self.find_by_sql_key(type_name, SqlValue::Text(key.to_string()))
    }

    fn find_by_integer(&self, type_name: &str, key: Option<i64>) -> Result<Option<ManagedObject<'_>>> {
        self.find_by_sql_key(type_name, key.map_or(SqlValue::Null, SqlValue::Integer))
    }
}

/// Stored form of a primary key; `None` for unsupported kinds.
fn sql_key(value: &Value) -> Option<SqlValue> {
    match value {
        Value::String(text) => Some(SqlValue::Text(text.clone())),
        Value::Number(n) => n.as_i64().map(SqlValue::Integer),
        Value::Null => Some(SqlValue::Null),
        _ => None,
    }
}

/// SQL form of a JSON value as `json_extract` would return it.
fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(text) => SqlValue::Text(text.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}
