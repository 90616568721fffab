//! Primary-key lookup against an object store.

use crate::key::KeyValue;
use crate::record::Record;

/// A database session able to find managed objects by primary key.
///
/// Implementations return handles bound to the session (`Object<'s>`).
/// Errors are the store's own and are passed through untouched.
pub trait ObjectStore {
    /// Managed object handle borrowed from the store.
    type Object<'s>
    where
        Self: 's;

    /// Error raised by the store (unknown type, closed connection, ...).
    type Error;

    /// Finds the object of `type_name` whose text key equals `key`.
    fn find_by_text(
        &self,
        type_name: &str,
        key: &str,
    ) -> Result<Option<Self::Object<'_>>, Self::Error>;

    /// Finds the object of `type_name` whose integer key equals `key`.
    ///
    /// `None` looks for the object whose key is null.
    fn find_by_integer(
        &self,
        type_name: &str,
        key: Option<i64>,
    ) -> Result<Option<Self::Object<'_>>, Self::Error>;
}

/// Finds a managed object of `type_name` by primary key.
///
/// Text keys use [`ObjectStore::find_by_text`], integer keys (null
/// included) use [`ObjectStore::find_by_integer`]. A [`KeyValue::Other`]
/// key returns `Ok(None)` without querying the store.
///
/// # Errors
///
/// Returns whatever error the store raises.
pub fn find_by_primary_key<'s, S>(
    store: &'s S,
    type_name: &str,
    key: &KeyValue,
) -> Result<Option<S::Object<'s>>, S::Error>
where
    S: ObjectStore + ?Sized,
{
    match key {
        KeyValue::Text(text) => store.find_by_text(type_name, text),
        KeyValue::Integer(n) => store.find_by_integer(type_name, *n),
        KeyValue::Other => Ok(None),
    }
}

/// Typed form of [`find_by_primary_key`], using `R::TYPE_NAME`.
///
/// # Errors
///
/// Returns whatever error the store raises.
pub fn find_record<'s, R, S>(
    store: &'s S,
    key: impl Into<KeyValue>,
) -> Result<Option<S::Object<'s>>, S::Error>
where
    R: Record,
    S: ObjectStore + ?Sized,
{
    find_by_primary_key(store, R::TYPE_NAME, &key.into())
}
