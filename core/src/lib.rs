//! Detached copies and primary-key lookup for managed database objects.
//!
//! A *managed* object is a handle bound to a live database session: its
//! fields are read and written through that session. This crate provides
//! the two conveniences that sit between such handles and plain Rust values:
//!
//! - [`detach`] / [`detach_all`] — produce independent ("non-managed")
//!   copies by round-tripping through JSON. Anything that implements
//!   [`serde::Serialize`] can be detached into anything that implements
//!   [`serde::de::DeserializeOwned`].
//! - [`find_by_primary_key`] — look an object up by its primary key,
//!   dispatching on the [`KeyValue`] kind (text or nullable integer).
//!
//! The database itself is abstracted by the [`ObjectStore`] trait; the
//! `managed-json-sqlite` crate provides an SQLite-backed implementation.
//!
//! # Example
//!
//! ```
//! use managed_json_core::{Detach, detach_all};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct Dog {
//!     name: String,
//!     age: i64,
//! }
//!
//! let rex = Dog { name: "Rex".into(), age: 3 };
//! let copy: Dog = rex.detached().unwrap();
//! assert_eq!(copy, rex);
//!
//! let pack = vec![rex.clone(), Dog { name: "Fido".into(), age: 5 }];
//! let copies: Vec<Dog> = detach_all(&pack).unwrap();
//! assert_eq!(copies, pack);
//! ```

mod detach;
mod error;
mod key;
mod lookup;
mod record;

pub use detach::{Detach, DetachAll, detach, detach_all};
pub use error::{DetachError, Result};
pub use key::KeyValue;
pub use lookup::{ObjectStore, find_by_primary_key, find_record};
pub use record::Record;
