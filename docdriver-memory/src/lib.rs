//! In-memory reference driver for docdriver.
//!
//! This crate provides a process-local, volatile implementation of the full
//! docdriver capability contract. It is both a usable minimal backend and the
//! executable definition of correct driver behavior: the matching, mutation, and
//! cursor semantics here are the ones every other backend is expected to mirror.
//!
//! # Features
//!
//! - **Whole-operation locking** - A single async mutex scopes every read, write,
//!   and removal, so operations are atomic at call granularity
//! - **Deep-equality matching** - Conjunctive exact-match filters with numeric
//!   BSON widths normalized
//! - **Full cursor support** - Deferred `and`/`or` filters plus select, sort,
//!   limit, and skip shaping
//! - **No globals** - Every [`MemoryHandle`] owns its own store; clones share it
//!   explicitly
//!
//! # Quick Start
//!
//! ```ignore
//! use docdriver_memory::MemoryHandle;
//! use docdriver_core::driver::Meta;
//! use bson::doc;
//!
//! let mut handle = MemoryHandle::new();
//! handle.select_db("app")?;
//! handle.select_collection("users")?;
//!
//! let driver = handle.driver()?;
//! driver.insert(doc! { "name": "Alice", "age": 30 }).await?;
//!
//! let adults = driver
//!     .cursor()
//!     .and(doc! { "age": 30 })
//!     .all()
//!     .await?;
//! ```

mod cursor;
mod engine;
mod store;

pub use cursor::MemoryCursor;
pub use store::{MemoryDriver, MemoryHandle};
