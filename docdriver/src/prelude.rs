//! Convenient re-exports of commonly used types from docdriver.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use docdriver::prelude::*;
//! ```
//!
//! This provides access to:
//! - The document model and merge helpers
//! - The capability traits every backend implements
//! - Cursor and query types
//! - Error types

pub use docdriver_core::{
    cursor::{Cursor, DummyCursor},
    document::{Document, DocumentExt, merge_into, merged},
    driver::{Getter, Inserter, Meta, Remover, Saver, StorageDriver, Updater},
    error::{StorageError, StorageResult},
    query::{Query, ShapeOp},
};
