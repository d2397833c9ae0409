//! The chainable, deferred cursor protocol.
//!
//! A cursor accumulates filter state and shaping operations without touching
//! storage; exactly one terminal call materializes the result. Chaining calls
//! either merge into the immediate filter state (`and`, `or`) or append a tagged
//! operation to the deferred queue (`select`, `sort`, `limit`, `skip`). The queue
//! is replayed in FIFO order once per terminal call.
//!
//! Cursors are not reusable across terminal calls: re-invoking a terminal without
//! re-opening via [`StorageDriver::cursor`](crate::driver::StorageDriver::cursor)
//! reuses stale filter and queue state. Resetting is the caller's responsibility.

use async_trait::async_trait;
use bson::Bson;

use crate::{document::Document, error::StorageResult};

/// A chainable, deferred query builder over a driver's selected namespace.
///
/// # Example
///
/// ```ignore
/// let seniors = driver
///     .cursor()
///     .and(doc! { "active": true })
///     .sort(&["-age"])
///     .limit(10)
///     .all()
///     .await?;
/// ```
#[async_trait]
pub trait Cursor: Send {
    /// Merges `doc` into the conjunctive filter.
    fn and(&mut self, doc: Document) -> &mut dyn Cursor;

    /// Adds disjunctive alternative filters; a candidate must satisfy at least
    /// one of them in addition to the conjunctive filter.
    fn or(&mut self, alternatives: Vec<Document>) -> &mut dyn Cursor;

    /// Defers a projection onto the named fields.
    fn select(&mut self, fields: &[&str]) -> &mut dyn Cursor;

    /// Defers a stable sort by the given specs (`"field"` ascending, `"-field"`
    /// descending; later specs break ties of earlier ones).
    fn sort(&mut self, specs: &[&str]) -> &mut dyn Cursor;

    /// Defers truncation of the result to at most `n` documents.
    fn limit(&mut self, n: usize) -> &mut dyn Cursor;

    /// Defers dropping `n` documents from the front of the result.
    fn skip(&mut self, n: usize) -> &mut dyn Cursor;

    /// Materializes and returns the first document of the shaped result.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`](crate::error::StorageError::NotFound)
    /// when the shaped result is empty.
    async fn one(&mut self) -> StorageResult<Document>;

    /// Materializes and returns the shaped result. An empty result is success.
    async fn all(&mut self) -> StorageResult<Vec<Document>>;

    /// Materializes the shaped result and returns its length.
    async fn count(&mut self) -> StorageResult<usize>;

    /// Materializes the shaped result and returns the distinct values of `key`
    /// across it, in first-seen order. Documents without the key contribute
    /// nothing.
    async fn distinct(&mut self, key: &str) -> StorageResult<Vec<Bson>>;
}

/// A no-op [`Cursor`] for backends without deferred-query support.
///
/// Every chaining call returns the cursor unchanged and every terminal call
/// succeeds with an empty or default result. This lets a driver satisfy the full
/// contract while explicitly signaling "unsupported, always succeeds as a no-op"
/// instead of failing — a documented limitation, not a silent error.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyCursor;

#[async_trait]
impl Cursor for DummyCursor {
    fn and(&mut self, _doc: Document) -> &mut dyn Cursor {
        self
    }

    fn or(&mut self, _alternatives: Vec<Document>) -> &mut dyn Cursor {
        self
    }

    fn select(&mut self, _fields: &[&str]) -> &mut dyn Cursor {
        self
    }

    fn sort(&mut self, _specs: &[&str]) -> &mut dyn Cursor {
        self
    }

    fn limit(&mut self, _n: usize) -> &mut dyn Cursor {
        self
    }

    fn skip(&mut self, _n: usize) -> &mut dyn Cursor {
        self
    }

    async fn one(&mut self) -> StorageResult<Document> {
        Ok(Document::new())
    }

    async fn all(&mut self) -> StorageResult<Vec<Document>> {
        Ok(Vec::new())
    }

    async fn count(&mut self) -> StorageResult<usize> {
        Ok(0)
    }

    async fn distinct(&mut self, _key: &str) -> StorageResult<Vec<Bson>> {
        Ok(Vec::new())
    }
}
