//! The matching and shaping engine for the in-memory driver.
//!
//! Matching is a linear scan: a candidate matches a filter document iff every
//! filter key is present in the candidate with a deep-equal value. Deep equality
//! normalizes numeric BSON widths, so `Int32(5)`, `Int64(5)`, and `Double(5.0)`
//! compare equal. Shaping replays a cursor's deferred operation queue in FIFO
//! order over the matched set.

use std::{cmp::Ordering, collections::HashMap};

use bson::{Bson, datetime::DateTime};

use docdriver_core::{
    document::Document,
    query::{Query, ShapeOp},
};

/// Type-erased, comparable representation of BSON values.
///
/// Wraps borrowed BSON values for deep equality and ordering during matching and
/// sorting. All integers and floats normalize to f64.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (all integers and floats normalized to f64)
    Number(f64),
    /// DateTime value
    DateTime(DateTime),
    /// String value
    String(&'a str),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
    /// Map/Object of comparable values
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr.iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>(),
            ),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>(),
            ),
            _ => Comparable::Null, // Other types are not comparable
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Returns true iff every key of `filter` is present in `candidate` with a
/// deep-equal value. A missing key is a mismatch regardless of the filter's
/// value; an empty filter matches everything.
pub(crate) fn matches(candidate: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, value)| {
        candidate
            .get(key)
            .is_some_and(|found| Comparable::from(found) == Comparable::from(value))
    })
}

/// Returns true iff `candidate` satisfies the query's conjunctive filter and,
/// when alternatives exist, at least one of them.
pub(crate) fn matches_query(candidate: &Document, query: &Query) -> bool {
    matches(candidate, &query.filter)
        && (query.alternatives.is_empty()
            || query
                .alternatives
                .iter()
                .any(|alt| matches(candidate, alt)))
}

/// Replays the deferred shaping queue over `docs`, front to back.
pub(crate) fn apply_ops(mut docs: Vec<Document>, ops: &[ShapeOp]) -> Vec<Document> {
    for op in ops {
        match op {
            ShapeOp::Select(fields) => {
                docs = docs
                    .into_iter()
                    .map(|doc| project(&doc, fields))
                    .collect();
            }
            ShapeOp::Sort(specs) => {
                docs.sort_by(|a, b| compare_by_specs(a, b, specs));
            }
            ShapeOp::Limit(n) => docs.truncate(*n),
            ShapeOp::Skip(n) => {
                docs = docs.split_off((*n).min(docs.len()));
            }
        }
    }

    docs
}

/// Collects the distinct values of `key` across `docs`, preserving first-seen
/// order. Deduplication uses deep equality, so numeric widths collapse.
pub(crate) fn distinct_values(docs: &[Document], key: &str) -> Vec<Bson> {
    let mut values: Vec<Bson> = Vec::new();

    for doc in docs {
        if let Some(value) = doc.get(key) {
            let seen = values
                .iter()
                .any(|v| Comparable::from(v) == Comparable::from(value));

            if !seen {
                values.push(value.clone());
            }
        }
    }

    values
}

fn project(doc: &Document, fields: &[String]) -> Document {
    let mut projected = Document::new();

    for field in fields {
        if let Some(value) = doc.get(field) {
            projected.insert(field.clone(), value.clone());
        }
    }

    projected
}

fn compare_by_specs(a: &Document, b: &Document, specs: &[String]) -> Ordering {
    for spec in specs {
        let (field, descending) = match spec.strip_prefix('-') {
            Some(field) => (field, true),
            None => (spec.as_str(), false),
        };

        let left = a.get(field).map(Comparable::from).unwrap_or(Comparable::Null);
        let right = b.get(field).map(Comparable::from).unwrap_or(Comparable::Null);

        let ordering = match left.partial_cmp(&right) {
            Some(ordering) => ordering,
            None => Ordering::Equal,
        };

        let ordering = if descending { ordering.reverse() } else { ordering };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}
