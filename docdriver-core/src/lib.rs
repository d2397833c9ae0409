//! A backend-agnostic document storage abstraction.
//!
//! This crate is the core of the docdriver project and provides:
//!
//! - **Document model** ([`document`]) - Schemaless BSON records and merge rules
//! - **Capability traits** ([`driver`]) - The contract every storage backend must satisfy
//! - **Cursor protocol** ([`cursor`]) - Chainable, deferred query building with a no-op fallback
//! - **Query state** ([`query`]) - Inspectable filter and shaping state for cursors
//! - **Error handling** ([`error`]) - The shared error taxonomy and result type
//!
//! # Example
//!
//! ```ignore
//! use docdriver_core::driver::{Meta, StorageDriver};
//! use bson::doc;
//!
//! // Obtain a Meta handle from a concrete backend, e.g. docdriver-memory.
//! let mut handle = some_backend_handle();
//! handle.select_db("app")?;
//! handle.select_collection("users")?;
//!
//! let driver = handle.driver()?;
//! driver.insert(doc! { "name": "Alice" }).await?;
//! let alice = driver.get_one(doc! { "name": "Alice" }).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docdriver_core;

pub mod cursor;
pub mod document;
pub mod driver;
pub mod error;
pub mod query;
