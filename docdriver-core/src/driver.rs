//! Capability traits every storage backend must satisfy.
//!
//! This module defines the contract that makes callers backend-agnostic: a
//! [`Meta`] handle for connection and namespace lifecycle, five small capability
//! traits for CRUD semantics, and [`StorageDriver`] composing them into the full
//! driver surface.
//!
//! # Overview
//!
//! A caller obtains a [`Meta`] handle from a concrete backend, selects a database
//! and a collection, and calls [`Meta::driver`] to pass the readiness gate and
//! receive a [`StorageDriver`]. Operations are then issued directly, or deferred
//! through the cursor protocol via [`StorageDriver::cursor`].
//!
//! # Thread Safety
//!
//! All driver operations take `&self` and implementations must be safe to share
//! across async tasks. The concurrency granularity (whole-driver mutex,
//! per-collection locks, ...) is implementation-specific and should be documented
//! by the implementer.
//!
//! # Error Handling
//!
//! Operations return [`StorageResult<T>`](crate::error::StorageResult). Zero
//! matches for a single-result read, update, or remove is surfaced as
//! [`StorageError::NotFound`](crate::error::StorageError::NotFound) rather than
//! an empty value; see the individual trait docs.

use async_trait::async_trait;
use bson::Bson;
use std::{fmt::Debug, io::Write};

use crate::{
    cursor::Cursor,
    document::Document,
    error::{StorageError, StorageResult},
};

/// Connection and namespace-selection handle for a storage backend.
///
/// A `Meta` owns (or shares) an underlying connection, opaque to this crate, plus
/// the currently selected `(database, collection)` pair. Selecting a namespace is
/// pure metadata mutation: no data is moved or copied.
///
/// # Readiness gate
///
/// [`Meta::driver`] must fail unless the connection is established and both
/// database and collection are selected. Every backend enforces this gate
/// identically.
pub trait Meta: Send + Sync {
    /// Selects the active database.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::EmptyName`] for an empty name, or
    /// [`StorageError::NotConnected`] if no connection is established.
    fn select_db(&mut self, name: &str) -> StorageResult<()>;

    /// Selects the active collection within the selected database.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::EmptyName`] for an empty name, or
    /// [`StorageError::NamespaceNotSelected`] if no database has been selected
    /// yet.
    fn select_collection(&mut self, name: &str) -> StorageResult<()>;

    /// Returns an independent copy of this handle sharing the underlying
    /// connection.
    ///
    /// Mutating the clone's namespace selection must not affect the original.
    fn clone_handle(&self) -> Box<dyn Meta>;

    /// Returns a ready [`StorageDriver`] for the selected namespace.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NamespaceNotSelected`] unless both database and
    /// collection are selected, or [`StorageError::NotConnected`] if the
    /// connection is missing.
    fn driver(&self) -> StorageResult<Box<dyn StorageDriver>>;
}

/// Upsert capability.
#[async_trait]
pub trait Saver: Send + Sync {
    /// Updates the first document matching `query` by merging `doc`'s fields
    /// into it, or, when nothing matches, inserts a new document composed of
    /// `query`'s fields merged with `doc`'s fields (`doc` wins on key
    /// collision).
    async fn save(&self, query: Document, doc: Document) -> StorageResult<()>;
}

/// Read capability.
#[async_trait]
pub trait Getter: Send + Sync {
    /// Returns every document matching `query`, in storage order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] when the result set is empty.
    async fn get(&self, query: Document) -> StorageResult<Vec<Document>>;

    /// Returns the first document matching `query` in storage order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] when nothing matches.
    async fn get_one(&self, query: Document) -> StorageResult<Document>;

    /// Backend-specific escape hatch accepting an arbitrary BSON query payload.
    ///
    /// # Errors
    ///
    /// Backends without a native query representation return
    /// [`StorageError::NotImplemented`].
    async fn custom(&self, query: Bson) -> StorageResult<Vec<Document>>;
}

/// In-place update capability.
#[async_trait]
pub trait Updater: Send + Sync {
    /// Locates the first document matching `query` and merges `fields` into it.
    ///
    /// # Errors
    ///
    /// Propagates [`StorageError::NotFound`] when nothing matches.
    async fn update(&self, query: Document, fields: Document) -> StorageResult<()>;

    /// Merges `fields` into every document matching `query` and returns the
    /// number updated. The match set is fixed before any merge is applied, so a
    /// merge cannot make later matches vanish mid-update.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] when nothing matches (zero updates).
    async fn update_multi(&self, query: Document, fields: Document) -> StorageResult<usize>;
}

/// Insert capability.
#[async_trait]
pub trait Inserter: Send + Sync {
    /// Appends one document to the selected collection.
    async fn insert(&self, doc: Document) -> StorageResult<()>;

    /// Inserts every document, stopping at and returning the first error.
    /// Documents after a failure are left uninserted.
    async fn insert_multi(&self, docs: Vec<Document>) -> StorageResult<()>;

    /// Attempts every insert independently and returns the collected errors
    /// instead of stopping at the first one.
    ///
    /// When a sink is supplied, each error's text is written to it as it occurs,
    /// one write per failed insert, with no added framing. Sink write failures
    /// are ignored.
    async fn insert_multi_no_fail(
        &self,
        docs: Vec<Document>,
        sink: Option<&mut (dyn Write + Send)>,
    ) -> Vec<StorageError>;
}

/// Delete capability.
#[async_trait]
pub trait Remover: Send + Sync {
    /// Deletes the first document matching `query` in storage order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] when nothing matches; the collection
    /// is left unchanged.
    async fn remove(&self, query: Document) -> StorageResult<()>;

    /// Deletes every document matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] when the initial pass finds nothing.
    async fn remove_all(&self, query: Document) -> StorageResult<()>;
}

/// The full driver surface: every capability plus the cursor entry point.
///
/// Backends that cannot support deferred querying return a
/// [`DummyCursor`](crate::cursor::DummyCursor) from [`StorageDriver::cursor`],
/// satisfying the contract as an explicit always-succeeding no-op rather than an
/// error. Callers relying on terminal cursor results from such a backend must
/// detect the no-op behavior themselves.
pub trait StorageDriver: Saver + Getter + Updater + Inserter + Remover + Debug {
    /// Opens a fresh cursor with empty filter and shaping state.
    fn cursor(&self) -> Box<dyn Cursor>;
}
