//! Transition expander: the core fixpoint loop.
//!
//! `compute_some_transitions` resolves up to `limit` unresolved
//! `(state, input)` rows per call. Work is picked in ascending
//! `(distance, state, input)` order, so expansion proceeds BFS-like from
//! the caller-requested start states. A call first reads everything it
//! needs from the base tables into a scratch batch, then commits all of
//! its writes; callers drive the loop until it returns 0.
//!
//! The target of a work row `(s, i)` is
//!
//! ```text
//! ⋃ { closure(w) : v ∈ vertices(s), (v, w) ∈ E, matches(v, i) }
//! ```
//!
//! aggregated per row and canonicalized inside the aggregation. An empty
//! join yields the empty set, which interns to the dead state.

use std::collections::hash_map::Entry;

use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::codec::{self, SetAccumulator};
use crate::error::{Error, Result};
use crate::registry;
use crate::store::Store;
use crate::{InputId, StateId};

struct WorkRow {
    src: StateId,
    input: InputId,
    distance: u32,
    target_key: Vec<u8>,
}

/// Resolve up to `limit` pending transitions. Returns how many were
/// resolved; 0 means the DFA is total and expansion has converged.
pub(crate) fn compute_some_transitions(store: &mut Store, limit: usize) -> Result<usize> {
    if limit == 0 {
        return Ok(0);
    }

    // Read phase: pick work, then compute each target key from the base
    // tables. No writes happen until the whole batch has been computed.
    let picked: Vec<(u32, StateId, InputId)> = store.pending.iter().take(limit).copied().collect();
    if picked.is_empty() {
        return Ok(0);
    }

    let mut work: Vec<WorkRow> = Vec::with_capacity(picked.len());
    for &(distance, src, input) in &picked {
        let target_key = target_key(store, src, input)?;
        trace!(
            "work ({}, {}) distance {} -> key {:?}",
            src,
            input,
            distance,
            target_key,
        );
        work.push(WorkRow {
            src,
            input,
            distance,
            target_key,
        });
    }

    // Write phase. Intern distinct targets first (minimum distance observed
    // in this batch wins as the hint), then resolve the picked rows.
    let mut first_seen: Vec<Vec<u8>> = Vec::new();
    let mut min_distance: FxHashMap<Vec<u8>, u32> = FxHashMap::default();
    for row in &work {
        let d = row.distance.saturating_add(1);
        match min_distance.entry(row.target_key.clone()) {
            Entry::Occupied(mut e) => {
                if d < *e.get() {
                    e.insert(d);
                }
            }
            Entry::Vacant(e) => {
                e.insert(d);
                first_seen.push(row.target_key.clone());
            }
        }
    }
    for key in first_seen {
        let distance = min_distance[&key];
        registry::intern_key(store, key, distance);
    }

    let resolved = work.len();
    for row in work {
        let dst = store.by_key[&row.target_key];
        store.transitions.insert((row.src, row.input), Some(dst));
        store.pending.remove(&(row.distance, row.src, row.input));
    }

    debug!(
        "resolved {} transitions: {} states, {} pending",
        resolved,
        store.states.len(),
        store.pending.len(),
    );
    Ok(resolved)
}

fn target_key(store: &Store, src: StateId, input: InputId) -> Result<Vec<u8>> {
    let row = store.states.get(&src).ok_or(Error::UnknownState(src))?;
    let vertices = codec::decode(&row.key)?;

    let mut acc = SetAccumulator::new();
    for v in vertices {
        if !store.matches.contains(&(v, input)) {
            continue;
        }
        if let Some(dsts) = store.edges_from.get(&v) {
            for &w in dsts {
                if let Some(cl) = store.closure.get(&w) {
                    acc.extend_from_slice(cl);
                }
            }
        }
    }
    Ok(acc.finish())
}
