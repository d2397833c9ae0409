//! The in-memory reference driver.
//!
//! Documents live in a process-local nested map, `database -> collection ->
//! Vec<Document>`, behind a single async mutex scoped to the whole store. Every
//! operation acquires that mutex once for its full duration, so reads, updates,
//! and removals are atomic at operation granularity. The store is volatile and
//! single-process; it doubles as a testing double and as the executable
//! definition of correct driver behavior.

use std::{collections::HashMap, io::Write, sync::Arc};

use async_trait::async_trait;
use bson::Bson;
use mea::mutex::Mutex;

use docdriver_core::{
    cursor::Cursor,
    document::{Document, merge_into, merged},
    driver::{Getter, Inserter, Meta, Remover, Saver, StorageDriver, Updater},
    error::{StorageError, StorageResult},
    query::Query,
};

use crate::{cursor::MemoryCursor, engine};

type CollectionSeq = Vec<Document>;
type DatabaseMap = HashMap<String, CollectionSeq>;
type StoreMap = HashMap<String, DatabaseMap>;

/// Connection and namespace-selection handle for the in-memory backend.
///
/// Each call to [`MemoryHandle::new`] creates a fresh, empty store; there is no
/// process-wide default session. Cloning a handle (via [`Clone`] or
/// [`Meta::clone_handle`]) shares the underlying store while keeping namespace
/// selection independent.
///
/// # Example
///
/// ```ignore
/// use docdriver_memory::MemoryHandle;
/// use docdriver_core::driver::Meta;
///
/// let mut handle = MemoryHandle::new();
/// handle.select_db("app")?;
/// handle.select_collection("users")?;
/// let driver = handle.driver()?;
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryHandle {
    database: String,
    collection: String,
    store: Arc<Mutex<StoreMap>>,
}

impl MemoryHandle {
    /// Creates a handle over a fresh, empty store.
    ///
    /// The in-memory backend has no external connection to establish, so a new
    /// handle is always connected; only namespace selection gates readiness.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Meta for MemoryHandle {
    fn select_db(&mut self, name: &str) -> StorageResult<()> {
        if name.is_empty() {
            return Err(StorageError::EmptyName);
        }

        self.database = name.to_string();
        Ok(())
    }

    fn select_collection(&mut self, name: &str) -> StorageResult<()> {
        if name.is_empty() {
            return Err(StorageError::EmptyName);
        }
        if self.database.is_empty() {
            return Err(StorageError::NamespaceNotSelected);
        }

        self.collection = name.to_string();
        Ok(())
    }

    fn clone_handle(&self) -> Box<dyn Meta> {
        Box::new(self.clone())
    }

    fn driver(&self) -> StorageResult<Box<dyn StorageDriver>> {
        if self.database.is_empty() || self.collection.is_empty() {
            return Err(StorageError::NamespaceNotSelected);
        }

        Ok(Box::new(MemoryDriver {
            database: self.database.clone(),
            collection: self.collection.clone(),
            store: Arc::clone(&self.store),
        }))
    }
}

/// A ready driver bound to one `(database, collection)` pair of a shared store.
///
/// Matching is a linear scan over the collection's stored sequence, O(collection
/// size x query size) per call — fine for a reference and testing backend, not a
/// production index.
#[derive(Debug, Clone)]
pub struct MemoryDriver {
    database: String,
    collection: String,
    store: Arc<Mutex<StoreMap>>,
}

impl MemoryDriver {
    /// Runs `f` over the selected collection's sequence with the store mutex
    /// held. Namespace maps are lazily created on first touch.
    async fn with_collection<R>(&self, f: impl FnOnce(&mut CollectionSeq) -> R) -> R {
        let mut store = self.store.lock().await;
        let collection = store
            .entry(self.database.clone())
            .or_default()
            .entry(self.collection.clone())
            .or_default();

        f(collection)
    }

    /// Materializes a cursor query: filters under the lock, then replays the
    /// deferred shaping queue on the matched clones.
    pub(crate) async fn run_query(&self, query: &Query) -> Vec<Document> {
        let matched = self
            .with_collection(|collection| {
                collection
                    .iter()
                    .filter(|doc| engine::matches_query(doc, query))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;

        engine::apply_ops(matched, &query.ops)
    }
}

#[async_trait]
impl Getter for MemoryDriver {
    async fn get(&self, query: Document) -> StorageResult<Vec<Document>> {
        let docs = self
            .with_collection(|collection| {
                collection
                    .iter()
                    .filter(|doc| engine::matches(doc, &query))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;

        if docs.is_empty() {
            return Err(StorageError::NotFound);
        }

        Ok(docs)
    }

    async fn get_one(&self, query: Document) -> StorageResult<Document> {
        self.with_collection(|collection| {
            collection
                .iter()
                .find(|doc| engine::matches(doc, &query))
                .cloned()
        })
        .await
        .ok_or(StorageError::NotFound)
    }

    async fn custom(&self, _query: Bson) -> StorageResult<Vec<Document>> {
        Err(StorageError::NotImplemented)
    }
}

#[async_trait]
impl Inserter for MemoryDriver {
    async fn insert(&self, doc: Document) -> StorageResult<()> {
        self.with_collection(|collection| collection.push(doc))
            .await;

        Ok(())
    }

    async fn insert_multi(&self, docs: Vec<Document>) -> StorageResult<()> {
        for doc in docs {
            self.insert(doc).await?;
        }

        Ok(())
    }

    async fn insert_multi_no_fail(
        &self,
        docs: Vec<Document>,
        mut sink: Option<&mut (dyn Write + Send)>,
    ) -> Vec<StorageError> {
        let mut errors = Vec::new();

        for doc in docs {
            if let Err(err) = self.insert(doc).await {
                if let Some(out) = sink.as_mut() {
                    let _ = write!(out, "{err}");
                }

                errors.push(err);
            }
        }

        errors
    }
}

#[async_trait]
impl Updater for MemoryDriver {
    async fn update(&self, query: Document, fields: Document) -> StorageResult<()> {
        self.with_collection(|collection| {
            collection
                .iter_mut()
                .find(|doc| engine::matches(doc, &query))
                .map(|doc| merge_into(doc, &fields))
        })
        .await
        .ok_or(StorageError::NotFound)
    }

    async fn update_multi(&self, query: Document, fields: Document) -> StorageResult<usize> {
        let updated = self
            .with_collection(|collection| {
                // The match set is fixed before any merge runs, so merged fields
                // cannot make later matches vanish mid-update.
                let indices = collection
                    .iter()
                    .enumerate()
                    .filter(|(_, doc)| engine::matches(doc, &query))
                    .map(|(index, _)| index)
                    .collect::<Vec<_>>();

                for &index in &indices {
                    merge_into(&mut collection[index], &fields);
                }

                indices.len()
            })
            .await;

        if updated == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(updated)
    }
}

#[async_trait]
impl Saver for MemoryDriver {
    async fn save(&self, query: Document, doc: Document) -> StorageResult<()> {
        self.with_collection(|collection| {
            match collection
                .iter_mut()
                .find(|candidate| engine::matches(candidate, &query))
            {
                Some(found) => merge_into(found, &doc),
                None => collection.push(merged(&query, &doc)),
            }
        })
        .await;

        Ok(())
    }
}

#[async_trait]
impl Remover for MemoryDriver {
    async fn remove(&self, query: Document) -> StorageResult<()> {
        self.with_collection(|collection| {
            collection
                .iter()
                .position(|doc| engine::matches(doc, &query))
                .map(|index| {
                    collection.remove(index);
                })
        })
        .await
        .ok_or(StorageError::NotFound)
    }

    async fn remove_all(&self, query: Document) -> StorageResult<()> {
        let removed = self
            .with_collection(|collection| {
                let before = collection.len();
                collection.retain(|doc| !engine::matches(doc, &query));

                before - collection.len()
            })
            .await;

        if removed == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

impl StorageDriver for MemoryDriver {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(MemoryCursor::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use futures::executor::block_on;

    fn ready_handle() -> MemoryHandle {
        let mut handle = MemoryHandle::new();
        handle.select_db("db").unwrap();
        handle.select_collection("col").unwrap();

        handle
    }

    fn ready_driver() -> Box<dyn StorageDriver> {
        ready_handle().driver().unwrap()
    }

    #[test]
    fn driver_fails_before_namespace_selection() {
        let handle = MemoryHandle::new();
        assert!(matches!(
            handle.driver().unwrap_err(),
            StorageError::NamespaceNotSelected
        ));

        let mut handle = MemoryHandle::new();
        handle.select_db("db").unwrap();
        assert!(matches!(
            handle.driver().unwrap_err(),
            StorageError::NamespaceNotSelected
        ));
    }

    #[test]
    fn empty_names_are_rejected() {
        let mut handle = MemoryHandle::new();

        assert!(matches!(handle.select_db("").unwrap_err(), StorageError::EmptyName));

        handle.select_db("db").unwrap();
        assert!(matches!(
            handle.select_collection("").unwrap_err(),
            StorageError::EmptyName
        ));
    }

    #[test]
    fn collection_selection_requires_database() {
        let mut handle = MemoryHandle::new();

        assert!(matches!(
            handle.select_collection("col").unwrap_err(),
            StorageError::NamespaceNotSelected
        ));
    }

    #[test]
    fn cloned_handle_shares_store_with_independent_namespace() {
        let original = ready_handle();
        let driver = original.driver().unwrap();
        block_on(driver.insert(doc! { "num": 1 })).unwrap();

        // The clone sees the original's data through its own selection.
        let mut clone = original.clone();
        clone.select_db("db").unwrap();
        clone.select_collection("col").unwrap();
        let clone_driver = clone.driver().unwrap();
        assert_eq!(block_on(clone_driver.get(Document::new())).unwrap().len(), 1);

        // Re-selecting on the clone does not disturb the original's namespace.
        clone.select_db("elsewhere").unwrap();
        clone.select_collection("other").unwrap();
        assert_eq!(block_on(driver.get(Document::new())).unwrap().len(), 1);
    }

    #[test]
    fn clone_handle_returns_independent_meta() {
        let original = ready_handle();
        block_on(original.driver().unwrap().insert(doc! { "num": 1 })).unwrap();

        let mut boxed = original.clone_handle();
        boxed.select_db("db").unwrap();
        boxed.select_collection("col").unwrap();

        let driver = boxed.driver().unwrap();
        assert_eq!(block_on(driver.get(Document::new())).unwrap().len(), 1);
    }

    #[test]
    fn namespaces_are_isolated() {
        let mut handle = ready_handle();
        let driver = handle.driver().unwrap();
        block_on(driver.insert(doc! { "a": 1 })).unwrap();

        handle.select_collection("other").unwrap();
        let other = handle.driver().unwrap();

        assert!(matches!(
            block_on(other.get(Document::new())).unwrap_err(),
            StorageError::NotFound
        ));
    }

    #[test]
    fn get_returns_inserts_in_order_and_is_idempotent() {
        let driver = ready_driver();

        for i in 0..10 {
            block_on(driver.insert(doc! { "num": i })).unwrap();
        }

        let first = block_on(driver.get(Document::new())).unwrap();
        let second = block_on(driver.get(Document::new())).unwrap();

        assert_eq!(first.len(), 10);
        assert_eq!(first, second);
        for (i, doc) in first.iter().enumerate() {
            assert_eq!(doc.get("num"), Some(&Bson::Int32(i as i32)));
        }
    }

    #[test]
    fn scan_over_five_hundred_documents() {
        let driver = ready_driver();

        for i in 0..500 {
            block_on(driver.insert(doc! { "num": i })).unwrap();
        }

        let hit = block_on(driver.get(doc! { "num": 5 })).unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].get("num"), Some(&Bson::Int32(5)));

        assert_eq!(block_on(driver.get(Document::new())).unwrap().len(), 500);

        assert!(matches!(
            block_on(driver.get(doc! { "num": 550 })).unwrap_err(),
            StorageError::NotFound
        ));
    }

    #[test]
    fn get_one_returns_first_in_storage_order() {
        let driver = ready_driver();
        block_on(driver.insert(doc! { "kind": "a", "seq": 1 })).unwrap();
        block_on(driver.insert(doc! { "kind": "a", "seq": 2 })).unwrap();

        let found = block_on(driver.get_one(doc! { "kind": "a" })).unwrap();

        assert_eq!(found.get("seq"), Some(&Bson::Int32(1)));
    }

    #[test]
    fn custom_is_not_implemented() {
        let driver = ready_driver();

        assert!(matches!(
            block_on(driver.custom(Bson::Null)).unwrap_err(),
            StorageError::NotImplemented
        ));
    }

    #[test]
    fn update_merges_into_first_match() {
        let driver = ready_driver();
        block_on(driver.insert(doc! { "name": "a", "age": 1 })).unwrap();
        block_on(driver.insert(doc! { "name": "a", "age": 2 })).unwrap();

        block_on(driver.update(doc! { "name": "a" }, doc! { "name": "b", "seen": true })).unwrap();

        // The mutated record is findable through its new fields...
        let mutated = block_on(driver.get_one(doc! { "name": "b" })).unwrap();
        assert_eq!(mutated.get("age"), Some(&Bson::Int32(1)));
        assert_eq!(mutated.get("seen"), Some(&Bson::Boolean(true)));

        // ...and only the second record still matches the original query.
        let remaining = block_on(driver.get(doc! { "name": "a" })).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].get("age"), Some(&Bson::Int32(2)));
    }

    #[test]
    fn update_propagates_not_found() {
        let driver = ready_driver();

        assert!(matches!(
            block_on(driver.update(doc! { "missing": 1 }, doc! { "x": 1 })).unwrap_err(),
            StorageError::NotFound
        ));
    }

    #[test]
    fn update_multi_counts_matches_at_call_time() {
        let driver = ready_driver();
        block_on(driver.insert(doc! { "kind": "a" })).unwrap();
        block_on(driver.insert(doc! { "kind": "b" })).unwrap();
        block_on(driver.insert(doc! { "kind": "a" })).unwrap();

        // The merge overwrites the key the query matched on; the count still
        // reflects the match set at fetch time.
        let updated =
            block_on(driver.update_multi(doc! { "kind": "a" }, doc! { "kind": "c" })).unwrap();
        assert_eq!(updated, 2);

        assert_eq!(block_on(driver.get(doc! { "kind": "c" })).unwrap().len(), 2);
        assert!(matches!(
            block_on(driver.update_multi(doc! { "kind": "a" }, doc! { "x": 1 })).unwrap_err(),
            StorageError::NotFound
        ));
    }

    #[test]
    fn save_inserts_then_updates_in_place() {
        let driver = ready_driver();

        block_on(driver.save(doc! { "num": 15 }, doc! { "test": 12 })).unwrap();

        let all = block_on(driver.get(Document::new())).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], doc! { "num": 15, "test": 12 });

        block_on(driver.save(doc! { "num": 15 }, doc! { "testValue": "x" })).unwrap();

        let all = block_on(driver.get(Document::new())).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], doc! { "num": 15, "test": 12, "testValue": "x" });
    }

    #[test]
    fn save_doc_wins_key_collisions_on_insert() {
        let driver = ready_driver();

        block_on(driver.save(doc! { "num": 15, "shared": 1 }, doc! { "shared": 2 })).unwrap();

        let found = block_on(driver.get_one(doc! { "num": 15 })).unwrap();
        assert_eq!(found.get("shared"), Some(&Bson::Int32(2)));
    }

    #[test]
    fn remove_deletes_only_the_first_match() {
        let driver = ready_driver();
        block_on(driver.insert(doc! { "kind": "a", "seq": 1 })).unwrap();
        block_on(driver.insert(doc! { "kind": "a", "seq": 2 })).unwrap();
        block_on(driver.insert(doc! { "kind": "b" })).unwrap();

        block_on(driver.remove(doc! { "kind": "a" })).unwrap();

        let all = block_on(driver.get(Document::new())).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], doc! { "kind": "a", "seq": 2 });
    }

    #[test]
    fn remove_without_match_leaves_collection_unchanged() {
        let driver = ready_driver();
        block_on(driver.insert(doc! { "kind": "a" })).unwrap();

        assert!(matches!(
            block_on(driver.remove(doc! { "kind": "z" })).unwrap_err(),
            StorageError::NotFound
        ));
        assert_eq!(block_on(driver.get(Document::new())).unwrap().len(), 1);
    }

    #[test]
    fn remove_all_deletes_every_match() {
        let driver = ready_driver();
        for i in 0..5 {
            block_on(driver.insert(doc! { "kind": "a", "seq": i })).unwrap();
        }
        block_on(driver.insert(doc! { "kind": "b" })).unwrap();

        block_on(driver.remove_all(doc! { "kind": "a" })).unwrap();

        let all = block_on(driver.get(Document::new())).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], doc! { "kind": "b" });

        assert!(matches!(
            block_on(driver.remove_all(doc! { "kind": "a" })).unwrap_err(),
            StorageError::NotFound
        ));
    }

    #[test]
    fn insert_multi_inserts_everything() {
        let driver = ready_driver();

        block_on(driver.insert_multi(vec![doc! { "n": 1 }, doc! { "n": 2 }])).unwrap();

        assert_eq!(block_on(driver.get(Document::new())).unwrap().len(), 2);
    }

    #[test]
    fn insert_multi_no_fail_collects_nothing_and_writes_nothing() {
        let driver = ready_driver();
        let mut sink: Vec<u8> = Vec::new();

        let errors = block_on(driver.insert_multi_no_fail(
            vec![doc! { "n": 1 }, doc! { "n": 2 }],
            Some(&mut sink),
        ));

        assert!(errors.is_empty());
        assert!(sink.is_empty());
        assert_eq!(block_on(driver.get(Document::new())).unwrap().len(), 2);
    }
}
