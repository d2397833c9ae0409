//! The document model shared by every storage backend.
//!
//! Documents are schemaless, string-keyed BSON maps. A document passed as a query
//! is interpreted as a conjunctive exact-match filter: every key it names must be
//! present in a candidate with a deep-equal value, and an empty query matches
//! everything. Deep equality itself lives in the matching engine of the concrete
//! backend, since it is the one scanning stored records.

use serde_json::{Value, from_value, to_value};

use crate::error::StorageResult;

/// A schemaless record: string keys mapping to arbitrary BSON values.
///
/// Construct documents with the [`bson::doc!`] macro:
///
/// ```ignore
/// use bson::doc;
///
/// let user = doc! { "name": "Alice", "age": 30, "tags": ["admin", "staff"] };
/// ```
pub type Document = bson::Document;

/// Builds a new document from `base`'s fields with `overlay`'s fields merged on
/// top. On key collision the overlay wins.
///
/// This is the composition rule `save` uses when upserting a fresh record from a
/// query document and a payload document.
pub fn merged(base: &Document, overlay: &Document) -> Document {
    let mut out = base.clone();
    merge_into(&mut out, overlay);
    out
}

/// Overwrites or adds each field of `fields` onto `target`, leaving all other
/// fields of `target` untouched.
pub fn merge_into(target: &mut Document, fields: &Document) {
    for (key, value) in fields {
        target.insert(key.clone(), value.clone());
    }
}

/// Extension trait providing JSON conversion utilities for documents.
///
/// Useful at process boundaries where callers exchange `serde_json::Value`
/// payloads rather than BSON.
pub trait DocumentExt: Sized {
    /// Converts this document to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_json(&self) -> StorageResult<Value>;

    /// Creates a document from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the value is not an object.
    fn from_json(value: Value) -> StorageResult<Self>;
}

impl DocumentExt for Document {
    fn to_json(&self) -> StorageResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> StorageResult<Self> {
        Ok(from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn merged_overlay_wins_on_collision() {
        let base = doc! { "num": 15, "kept": true };
        let overlay = doc! { "num": 20, "extra": "x" };

        let out = merged(&base, &overlay);

        assert_eq!(out, doc! { "num": 20, "kept": true, "extra": "x" });
    }

    #[test]
    fn merged_with_empty_overlay_is_base() {
        let base = doc! { "a": 1 };

        assert_eq!(merged(&base, &Document::new()), base);
    }

    #[test]
    fn merge_into_preserves_unrelated_fields() {
        let mut target = doc! { "a": 1, "b": 2 };
        merge_into(&mut target, &doc! { "b": 3, "c": 4 });

        assert_eq!(target, doc! { "a": 1, "b": 3, "c": 4 });
    }

    #[test]
    fn json_round_trip() {
        let document = doc! { "name": "Alice", "nested": { "ok": true } };

        let json = document.to_json().unwrap();
        let back = Document::from_json(json).unwrap();

        assert_eq!(back, document);
    }
}
