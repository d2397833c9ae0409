//! Real cursor implementation over the in-memory store.
//!
//! Unlike backends that fall back to the no-op
//! [`DummyCursor`](docdriver_core::cursor::DummyCursor), the in-memory driver
//! supports the full deferred-query protocol: chaining calls accumulate state in
//! a [`Query`], and a terminal call filters under the store lock, replays the
//! shaping queue, and materializes.

use async_trait::async_trait;
use bson::Bson;

use docdriver_core::{
    cursor::Cursor,
    document::Document,
    error::{StorageError, StorageResult},
    query::{Query, ShapeOp},
};

use crate::{engine, store::MemoryDriver};

/// A chainable cursor bound to one in-memory driver.
///
/// State is not reset by terminal calls; re-open via
/// [`StorageDriver::cursor`](docdriver_core::driver::StorageDriver::cursor) for
/// a fresh query.
pub struct MemoryCursor {
    driver: MemoryDriver,
    query: Query,
}

impl MemoryCursor {
    pub(crate) fn new(driver: MemoryDriver) -> Self {
        Self {
            driver,
            query: Query::new(),
        }
    }
}

#[async_trait]
impl Cursor for MemoryCursor {
    fn and(&mut self, doc: Document) -> &mut dyn Cursor {
        self.query.and(&doc);
        self
    }

    fn or(&mut self, alternatives: Vec<Document>) -> &mut dyn Cursor {
        self.query.or(alternatives);
        self
    }

    fn select(&mut self, fields: &[&str]) -> &mut dyn Cursor {
        self.query
            .push_op(ShapeOp::Select(fields.iter().map(|f| f.to_string()).collect()));
        self
    }

    fn sort(&mut self, specs: &[&str]) -> &mut dyn Cursor {
        self.query
            .push_op(ShapeOp::Sort(specs.iter().map(|s| s.to_string()).collect()));
        self
    }

    fn limit(&mut self, n: usize) -> &mut dyn Cursor {
        self.query.push_op(ShapeOp::Limit(n));
        self
    }

    fn skip(&mut self, n: usize) -> &mut dyn Cursor {
        self.query.push_op(ShapeOp::Skip(n));
        self
    }

    async fn one(&mut self) -> StorageResult<Document> {
        self.driver
            .run_query(&self.query)
            .await
            .into_iter()
            .next()
            .ok_or(StorageError::NotFound)
    }

    async fn all(&mut self) -> StorageResult<Vec<Document>> {
        Ok(self.driver.run_query(&self.query).await)
    }

    async fn count(&mut self) -> StorageResult<usize> {
        Ok(self.driver.run_query(&self.query).await.len())
    }

    async fn distinct(&mut self, key: &str) -> StorageResult<Vec<Bson>> {
        let docs = self.driver.run_query(&self.query).await;

        Ok(engine::distinct_values(&docs, key))
    }
}
