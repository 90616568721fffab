//! SQLite-backed object session for managed-json.
//!
//! This crate stores records as JSON bodies in SQLite and hands out
//! managed handles bound to the session, the live side of the
//! detach-by-serialization pattern implemented in `managed-json-core`.
//!
//! # Architecture
//!
//! - **`schema`** — SQL generation with customizable table prefixes
//! - **`session`** — [`Session`]: type registry, inserts, key lookup, queries
//! - **`object`** — [`ManagedObject`] and typed [`Managed`] handles
//! - **`results`** — restartable, ordered [`Results`]
//! - **`config`** — YAML-loadable [`SessionConfig`]
//!
//! # Quick start
//!
//! ```
//! use managed_json_core::{Record, detach_all};
//! use managed_json_sqlite::Session;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Task {
//!     id: String,
//!     done: bool,
//! }
//!
//! impl Record for Task {
//!     const TYPE_NAME: &'static str = "Task";
//!     const PRIMARY_KEY: &'static str = "id";
//! }
//!
//! let session = Session::open_in_memory("mj_").unwrap();
//! session.register::<Task>().unwrap();
//! session.add(&Task { id: "write".into(), done: false }).unwrap();
//! session.add(&Task { id: "ship".into(), done: false }).unwrap();
//!
//! let write = session.find::<Task>("write").unwrap().unwrap();
//! let before = write.detach().unwrap();
//! write.set("done", true).unwrap();
//! assert!(!before.done);
//!
//! let tasks: Vec<Task> = detach_all(&session.all::<Task>().unwrap()).unwrap();
//! assert_eq!(tasks.len(), 2);
//! assert!(tasks[0].done);
//! ```
//!
//! # Table prefix customization
//!
//! All table and index names are prefixed with a configurable string,
//! allowing multiple isolated sessions within the same SQLite database.
//! Prefixes must contain only ASCII alphanumeric characters and underscores.

mod config;
mod error;
mod object;
mod results;
mod schema;
mod session;

pub use config::{DEFAULT_PREFIX, SessionConfig};
pub use error::{Result, SessionError};
pub use object::{Managed, ManagedObject};
pub use results::{Iter, Results};
pub use session::Session;
