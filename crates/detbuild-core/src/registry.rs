//! DFA-state interning.
//!
//! States are keyed by the canonical encoding of their vertex set and get
//! stable dense IDs in creation order. Interning a new state also inserts
//! one unresolved transition row per alphabet symbol with that state as
//! source, so "list outstanding work" stays a trivial scan of the pending
//! queue and every state always owns exactly one `(src, input)` row per
//! symbol, resolved or not.

use log::trace;

use crate::codec::SetAccumulator;
use crate::error::{Error, Result};
use crate::store::{StateRow, Store};
use crate::{StateId, VertexId};

/// Close `vertices` under epsilon, canonicalize, and intern the result.
///
/// Returns the existing ID when the closed set was seen before. Unknown
/// vertex IDs are rejected; the base tables are immutable after load, so
/// there is nothing sensible to register them as.
pub(crate) fn find_or_create(
    store: &mut Store,
    vertices: &[VertexId],
    distance: u32,
) -> Result<StateId> {
    let mut acc = SetAccumulator::new();
    for &v in vertices {
        let closure = store.closure.get(&v).ok_or(Error::UnknownVertex(v))?;
        acc.extend_from_slice(closure);
    }
    Ok(intern_key(store, acc.finish(), distance).0)
}

/// Intern a canonical key, allocating work rows on creation.
///
/// Returns the state ID and whether the state was newly created. The
/// distance hint is fixed at creation; later sightings of the same key do
/// not lower it.
pub(crate) fn intern_key(store: &mut Store, key: Vec<u8>, distance: u32) -> (StateId, bool) {
    if let Some(&id) = store.by_key.get(&key) {
        return (id, false);
    }

    let id = store.next_state_id;
    store.next_state_id += 1;
    store.by_key.insert(key.clone(), id);
    trace!("interned state {} distance {} key {:?}", id, distance, key);
    store.states.insert(id, StateRow { key, distance });

    for &input in &store.alphabet {
        store.transitions.insert((id, input), None);
        store.pending.insert((distance, id, input));
    }

    (id, true)
}
