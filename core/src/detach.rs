//! Detachment by serialization.
//!
//! A managed object is copied by writing it to JSON text and reading that
//! text back into a fresh value of the target type. The copy shares nothing
//! with the source, so later changes on either side are not visible to the
//! other. Nested values are copied by serde's own traversal.
//!
//! # Example
//!
//! ```
//! use managed_json_core::{DetachAll, detach};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Owner {
//!     name: String,
//!     dogs: Vec<Dog>,
//! }
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Dog {
//!     name: String,
//! }
//!
//! let owner = Owner {
//!     name: "Tim".into(),
//!     dogs: vec![Dog { name: "Rex".into() }],
//! };
//! let copy: Owner = detach(&owner).unwrap();
//! assert_eq!(copy, owner);
//!
//! let names: Vec<Dog> = owner.dogs.iter().detach_all().unwrap();
//! assert_eq!(names, owner.dogs);
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{DetachError, Result};

/// Produces a detached copy of `source` as a `T`.
///
/// # Errors
///
/// Returns [`DetachError::Serialization`] if `source` cannot be written as
/// JSON, and [`DetachError::Deserialization`] if the JSON does not fit `T`.
pub fn detach<S, T>(source: &S) -> Result<T>
where
    S: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let text = serde_json::to_string(source).map_err(DetachError::Serialization)?;
    serde_json::from_str(&text).map_err(DetachError::Deserialization)
}

/// Produces detached copies of every element of `collection`, in order.
///
/// The collection is iterated once, front to back. The first element that
/// fails to copy aborts the call; no partial result is returned and the
/// remaining elements are not visited.
///
/// # Errors
///
/// Propagates the first [`DetachError`] raised by [`detach`].
pub fn detach_all<I, T>(collection: I) -> Result<Vec<T>>
where
    I: IntoIterator,
    I::Item: Serialize,
    T: DeserializeOwned,
{
    let iter = collection.into_iter();
    let mut copies = Vec::with_capacity(iter.size_hint().0);
    for element in iter {
        copies.push(detach(&element)?);
    }
    Ok(copies)
}

/// Method form of [`detach`], available on every serializable value.
pub trait Detach: Serialize {
    /// Returns a detached copy of `self` as a `T`.
    fn detached<T: DeserializeOwned>(&self) -> Result<T> {
        detach(self)
    }
}

impl<S: Serialize + ?Sized> Detach for S {}

/// Method form of [`detach_all`], available on every iterable of
/// serializable items.
pub trait DetachAll: IntoIterator + Sized
where
    Self::Item: Serialize,
{
    /// Returns detached copies of every element, in order.
    fn detach_all<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        detach_all(self)
    }
}

impl<I> DetachAll for I
where
    I: IntoIterator,
    I::Item: Serialize,
{
}
