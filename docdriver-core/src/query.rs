//! Deferred query state accumulated by a cursor before materialization.
//!
//! A [`Query`] is the single object a terminal cursor call hands to the matching
//! engine: the conjunctive filter document, the disjunctive alternatives, and an
//! ordered queue of shaping operations. Shaping is recorded as small tagged
//! operations rather than captured closures so the queue stays inspectable and
//! testable independent of any backend.

use crate::document::{Document, merge_into};

/// A deferred shaping operation, applied in FIFO order when a cursor is
/// materialized by a terminal call.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeOp {
    /// Restrict result documents to the named fields.
    Select(Vec<String>),
    /// Stable sort by the given field specs. A spec is a field name, optionally
    /// prefixed with `-` for descending order; later specs break ties of earlier
    /// ones.
    Sort(Vec<String>),
    /// Keep at most this many documents.
    Limit(usize),
    /// Drop this many documents from the front of the result.
    Skip(usize),
}

/// The accumulated state of a cursor at materialization time.
///
/// `filter` is a conjunctive exact-match document: a candidate matches iff every
/// key is present with a deep-equal value. When `alternatives` is non-empty, a
/// candidate must additionally satisfy at least one of them. `ops` is replayed
/// front to back on the matched set.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Conjunctive exact-match filter; empty matches everything.
    pub filter: Document,
    /// Disjunctive alternative filters; empty imposes no constraint.
    pub alternatives: Vec<Document>,
    /// Deferred shaping queue, executed in push order.
    pub ops: Vec<ShapeOp>,
}

impl Query {
    /// Creates an empty query that matches every document and applies no shaping.
    pub fn new() -> Self {
        Query::default()
    }

    /// Merges `doc`'s fields into the conjunctive filter. Later calls overwrite
    /// earlier values for the same key.
    pub fn and(&mut self, doc: &Document) {
        merge_into(&mut self.filter, doc);
    }

    /// Appends alternative filters to the disjunctive set.
    pub fn or(&mut self, alternatives: impl IntoIterator<Item = Document>) {
        self.alternatives.extend(alternatives);
    }

    /// Appends a shaping operation to the deferred queue.
    pub fn push_op(&mut self, op: ShapeOp) {
        self.ops.push(op);
    }
}
