use serde::Serialize;
use serde::de::DeserializeOwned;

/// A user-defined record type that can live in an object store.
///
/// `TYPE_NAME` identifies the type in the store's registry and
/// `PRIMARY_KEY` names the JSON field holding the unique identifier.
///
/// # Examples
///
/// ```
/// use managed_json_core::Record;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Person {
///     id: i64,
///     name: String,
/// }
///
/// impl Record for Person {
///     const TYPE_NAME: &'static str = "Person";
///     const PRIMARY_KEY: &'static str = "id";
/// }
///
/// assert_eq!(Person::TYPE_NAME, "Person");
/// ```
pub trait Record: Serialize + DeserializeOwned {
    /// Name under which the type is registered in the store.
    const TYPE_NAME: &'static str;

    /// Name of the field used as the primary key.
    const PRIMARY_KEY: &'static str;
}
