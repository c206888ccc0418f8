//! Fixed-slot property containers with per-key accessor overrides
//!
//! This crate provides keyed containers whose key set is fixed by a
//! type-level [`Schema`]:
//! - [`Schema`] / [`SchemaBuilder`]: the declared key set and the
//!   per-key accessor strategy table, built once and shared
//! - [`PropertyBag`]: the base container - schema-checked get/set/del
//!   with accessor dispatch, plus the raw [`Slots`] view accessors use
//! - [`SparseBag`]: a presence-aware layer that treats empty values as
//!   absent for counting, containment, and enumeration
//! - [`Value`]: the unified value enum stored in slots
//! - [`Error`] / [`SchemaError`]: access-time and registration-time
//!   failures
//!
//! # Quick Start
//!
//! ```
//! use slotbag::{Schema, SparseBag, Value};
//! use std::sync::Arc;
//!
//! let schema = Arc::new(Schema::builder().keys(["name", "count"]).build().unwrap());
//! let mut nic = SparseBag::new(schema, [("name", Value::from("eth0"))]).unwrap();
//!
//! nic.set("count", 0).unwrap();
//! assert_eq!(nic.len(), 1);            // zero counts as absent
//! assert!(!nic.has("count"));
//! assert_eq!(nic.get("count").unwrap(), Value::Int(0));
//!
//! nic.set_if_value_present("count", 5).unwrap();
//! assert_eq!(nic.get("count").unwrap(), Value::Int(5));
//! ```
//!
//! # Accessor overrides
//!
//! A schema can bind a getter, setter, and/or deleter function to any
//! key. The bound function intercepts the matching operation instead of
//! touching the backing store, and receives the raw [`Slots`] view so
//! it can reach stored values without re-entering dispatch. Accessors
//! can consult [`Slots::is_initialized`] to tell seed writes during
//! construction apart from later mutation.
//!
//! # Concurrency
//!
//! Containers are plain owned data: `&mut self` mutation gives
//! exclusive access by construction. Nothing here locks; share a
//! container across threads behind your own synchronization.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod bag;
pub mod error;
pub mod schema;
pub mod sparse;
pub mod value;

// Re-export commonly used types
pub use bag::{PropertyBag, Slots};
pub use error::{Error, Result, SchemaError};
pub use schema::{Accessors, Deleter, Getter, Schema, SchemaBuilder, Setter};
pub use sparse::SparseBag;
pub use value::Value;
