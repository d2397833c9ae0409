//! Main docdriver crate providing a unified interface for document storage.
//!
//! This crate is the primary entry point for users of the docdriver project. It
//! re-exports the core contract from [`docdriver_core`] and provides convenient
//! access to the bundled in-memory backend.
//!
//! # Features
//!
//! - **Backend-agnostic CRUD** - One capability contract (`StorageDriver`) that
//!   every backend implements
//! - **Schemaless documents** - BSON maps built with the `doc!` macro, matched by
//!   deep equality
//! - **Deferred querying** - Chainable cursors with filters and shaping, plus a
//!   no-op fallback for backends without query support
//! - **In-memory reference backend** - A concurrency-safe store for development
//!   and testing
//!
//! # Quick Start
//!
//! ```ignore
//! use docdriver::{prelude::*, memory::MemoryHandle};
//! use bson::doc;
//!
//! let mut handle = MemoryHandle::new();
//! handle.select_db("app")?;
//! handle.select_collection("users")?;
//!
//! let driver = handle.driver()?;
//!
//! // Direct operations.
//! driver.insert(doc! { "name": "Alice", "age": 30 }).await?;
//! driver.save(doc! { "name": "Bob" }, doc! { "age": 21 }).await?;
//! let alice = driver.get_one(doc! { "name": "Alice" }).await?;
//!
//! // Deferred querying.
//! let names = driver
//!     .cursor()
//!     .sort(&["-age"])
//!     .select(&["name"])
//!     .limit(10)
//!     .all()
//!     .await?;
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//!
//! Network-backed adapters live outside this repository; they only need to
//! implement the [`Meta`](driver::Meta), [`StorageDriver`](driver::StorageDriver),
//! and [`Cursor`](cursor::Cursor) traits to participate.

pub mod prelude;

pub use docdriver_core::{cursor, document, driver, error, query};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docdriver_memory::{MemoryCursor, MemoryDriver, MemoryHandle};
}
