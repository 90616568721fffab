//! Managed object handles.
//!
//! A handle names one stored object and reads it through the session on
//! every access, so it always reflects the current state. Serializing a
//! handle writes the object's current body, which is what makes
//! [`managed_json_core::detach`] produce a plain snapshot.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

use managed_json_core::{KeyValue, Record, detach};
use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{Result, SessionError};
use crate::session::Session;

/// Untyped handle to an object stored in a [`Session`].
#[derive(Clone)]
pub struct ManagedObject<'s> {
    session: &'s Session,
    type_name: String,
    id: i64,
}

impl<'s> ManagedObject<'s> {
    pub(crate) fn new(session: &'s Session, type_name: impl Into<String>, id: i64) -> Self {
        Self {
            session,
            type_name: type_name.into(),
            id,
        }
    }

    /// Registered type name of the object.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Session-internal row id.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// The session this handle reads through.
    pub fn session(&self) -> &'s Session {
        self.session
    }

    /// Returns `false` once the object has been deleted.
    pub fn is_valid(&self) -> Result<bool> {
        self.session.object_exists(self.id)
    }

    /// Current body of the object.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ObjectDeleted`] if the object is gone.
    pub fn snapshot(&self) -> Result<Value> {
        self.session.load_body(&self.type_name, self.id)
    }

    /// Current value of `field`, or `None` if the body lacks it.
    pub fn get(&self, field: &str) -> Result<Option<Value>> {
        let mut body = self.snapshot()?;
        Ok(body.as_object_mut().and_then(|fields| fields.remove(field)))
    }

    /// Writes `value` into `field` through the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PrimaryKeyImmutable`] when `field` is the
    /// primary key, and [`SessionError::ObjectDeleted`] if the object is gone.
    pub fn set(&self, field: &str, value: impl Serialize) -> Result<()> {
        let value = serde_json::to_value(value)?;
        let primary_key = self.session.primary_key_field(&self.type_name)?;
        if field == primary_key {
            return Err(SessionError::PrimaryKeyImmutable {
                type_name: self.type_name.clone(),
                field: primary_key,
            });
        }
        self.session.update_body(&self.type_name, self.id, |fields| {
            fields.insert(field.to_string(), value);
        })
    }

    /// Current primary key of the object.
    pub fn primary_key(&self) -> Result<KeyValue> {
        let field = self.session.primary_key_field(&self.type_name)?;
        Ok(match self.get(&field)? {
            Some(Value::Null) | None => KeyValue::Integer(None),
            Some(value) => KeyValue::from(&value),
        })
    }

    /// Removes the object from the session.
    pub fn delete(self) -> Result<()> {
        self.session.delete_object(&self.type_name, self.id)
    }
}

impl fmt::Debug for ManagedObject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedObject")
            .field("type_name", &self.type_name)
            .field("id", &self.id)
            .finish()
    }
}

impl Serialize for ManagedObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let body = self.snapshot().map_err(S::Error::custom)?;
        body.serialize(serializer)
    }
}

/// Typed handle to a stored `R`.
///
/// Dereferences to [`ManagedObject`] for field access.
pub struct Managed<'s, R> {
    object: ManagedObject<'s>,
    _record: PhantomData<fn() -> R>,
}

impl<'s, R: Record> Managed<'s, R> {
    pub(crate) fn new(object: ManagedObject<'s>) -> Self {
        Self {
            object,
            _record: PhantomData,
        }
    }

    /// Detached copy of the object as a plain `R`.
    ///
    /// # Errors
    ///
    /// Fails with a serialization error if the object was deleted, and a
    /// deserialization error if the stored body no longer fits `R`.
    pub fn detach(&self) -> managed_json_core::Result<R> {
        detach(&self.object)
    }

    /// Current value of `field` decoded as `V`.
    pub fn get_as<V: DeserializeOwned>(&self, field: &str) -> Result<Option<V>> {
        match self.object.get(field)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Drops the type information.
    pub fn into_inner(self) -> ManagedObject<'s> {
        self.object
    }
}

impl<'s, R> Deref for Managed<'s, R> {
    type Target = ManagedObject<'s>;

    fn deref(&self) -> &Self::Target {
        &self.object
    }
}

impl<R> Clone for Managed<'_, R> {
    fn clone(&self) -> Self {
        Self {
            object: self.object.clone(),
            _record: PhantomData,
        }
    }
}

impl<R> fmt::Debug for Managed<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Managed").field(&self.object).finish()
    }
}

impl<R> Serialize for Managed<'_, R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.object.serialize(serializer)
    }
}
