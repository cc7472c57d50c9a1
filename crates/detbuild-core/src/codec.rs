//! Canonical byte-string encoding of vertex sets.
//!
//! A DFA state is a set of NFA vertices, and its identity is the canonical
//! encoding of that set: the sorted, deduplicated vertex IDs emitted as an
//! ASCII JSON array with no interior whitespace (`[]`, `[1,5,9]`). Two sets
//! are equal iff their encodings are byte-identical, which makes the
//! encoding directly usable as an interning key and gives keys a total
//! byte-string order.

use crate::error::{Error, Result};
use crate::VertexId;

/// Encode a multiset of vertex IDs as its canonical key.
pub fn encode(vertices: &[VertexId]) -> Vec<u8> {
    let mut sorted = vertices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    encode_sorted(&sorted)
}

/// Encode a slice that is already sorted ascending and deduplicated.
pub(crate) fn encode_sorted(sorted: &[VertexId]) -> Vec<u8> {
    let mut out = String::with_capacity(2 + sorted.len() * 4);
    out.push('[');
    for (n, v) in sorted.iter().enumerate() {
        if n > 0 {
            out.push(',');
        }
        out.push_str(&v.to_string());
    }
    out.push(']');
    out.into_bytes()
}

/// Decode a canonical key back into its sorted vertex list.
pub fn decode(key: &[u8]) -> Result<Vec<VertexId>> {
    serde_json::from_slice(key).map_err(|_| Error::MalformedKey)
}

/// Aggregate form of the codec.
///
/// Grouped queries push vertices in whatever order the join produces them;
/// `finish` canonicalizes and encodes in one step, so the canonical key is
/// produced inside the aggregation instead of on a materialized list.
#[derive(Debug, Default)]
pub struct SetAccumulator {
    items: Vec<VertexId>,
}

impl SetAccumulator {
    pub fn new() -> Self {
        SetAccumulator { items: Vec::new() }
    }

    pub fn push(&mut self, v: VertexId) {
        self.items.push(v);
    }

    pub fn extend_from_slice(&mut self, vs: &[VertexId]) {
        self.items.extend_from_slice(vs);
    }

    /// Finalize: sort, dedup, encode.
    pub fn finish(mut self) -> Vec<u8> {
        self.items.sort_unstable();
        self.items.dedup();
        encode_sorted(&self.items)
    }
}
