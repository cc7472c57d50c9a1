//! Dead-state reducer.
//!
//! Once the caller knows which vertex sets accept, every state with no
//! forward path to an accepting state is unproductive: all transitions
//! leading into that region are redirected at the single dead sink and the
//! region itself is deleted. The resulting DFA accepts the same language
//! and has exactly one dead state.
//!
//! The pass is idempotent: on an already-cleaned automaton the live set is
//! unchanged, every redirect is a no-op, and nothing is deleted.

use std::collections::VecDeque;

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::codec;
use crate::error::{Error, OracleError, Result};
use crate::store::Store;
use crate::{InputId, StateId, VertexId};

/// Redirect and drop every non-live state. Returns the accepting state IDs
/// in ascending order.
pub(crate) fn cleanup_dead_states<A>(
    store: &mut Store,
    dead: StateId,
    accepts: &mut A,
) -> Result<Vec<StateId>>
where
    A: FnMut(&[VertexId]) -> std::result::Result<bool, OracleError>,
{
    // Read phase: acceptance per state, then backward reachability from the
    // accepting states over a reverse-adjacency index. An oracle failure
    // aborts here, before any write.
    let mut accepting: Vec<StateId> = Vec::new();
    for (&id, row) in &store.states {
        let vertices = codec::decode(&row.key)?;
        let hit = accepts(&vertices).map_err(|source| Error::AcceptsOracle { state: id, source })?;
        if hit {
            accepting.push(id);
        }
    }

    let mut rev: FxHashMap<StateId, Vec<StateId>> = FxHashMap::default();
    for (&(src, _input), &dst) in &store.transitions {
        if let Some(dst) = dst {
            rev.entry(dst).or_default().push(src);
        }
    }

    let mut live: FxHashSet<StateId> = accepting.iter().copied().collect();
    let mut worklist: VecDeque<StateId> = accepting.iter().copied().collect();
    while let Some(s) = worklist.pop_front() {
        if let Some(preds) = rev.get(&s) {
            for &p in preds {
                if live.insert(p) {
                    worklist.push_back(p);
                }
            }
        }
    }

    // Write phase: redirect every resolved transition that leads outside
    // the live set, then delete the non-live states. Each deleted state
    // takes its own transition rows with it.
    for dst in store.transitions.values_mut() {
        if let Some(d) = *dst {
            if !live.contains(&d) {
                *dst = Some(dead);
            }
        }
    }

    let doomed: Vec<StateId> = store
        .states
        .keys()
        .copied()
        .filter(|&s| s != dead && !live.contains(&s))
        .collect();
    for &s in &doomed {
        delete_state(store, s);
    }

    debug!(
        "cleanup: {} accepting, {} live, {} states deleted",
        accepting.len(),
        live.len(),
        doomed.len(),
    );
    Ok(accepting)
}

fn delete_state(store: &mut Store, id: StateId) {
    if let Some(row) = store.states.remove(&id) {
        store.by_key.remove(&row.key);
        let inputs: Vec<InputId> = store.alphabet.iter().copied().collect();
        for input in inputs {
            store.transitions.remove(&(id, input));
            store.pending.remove(&(row.distance, id, input));
        }
    }
}
