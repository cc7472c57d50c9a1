//! Builder facade.
//!
//! `DfaBuilder` owns the store for its whole lifetime and wires the loader,
//! closure builder, state registry, transition expander, and dead-state
//! reducer together behind the public API. One logical builder per store;
//! host oracles are taken by argument at the calls that need them and are
//! never retained.

use std::path::Path;

use log::debug;

use crate::codec;
use crate::error::{Error, OracleError, Result};
use crate::load::{self, NfaDecl};
use crate::store::{StorageDsn, Store, SNAPSHOT_VERSION};
use crate::{closure, expand, reduce, registry};
use crate::{InputId, StateId, VertexId};

/// Batch size used by [`DfaBuilder::compute_all_transitions`].
const DEFAULT_BATCH: usize = 1000;

pub struct DfaBuilder {
    store: Store,
    dead: StateId,
}

impl DfaBuilder {
    /// Load the NFA, precompute the epsilon-closure table, and intern the
    /// dead state (the state of the empty vertex set), so it has a stable
    /// ID before any transition computation runs.
    ///
    /// An oracle failure aborts construction; nothing is left behind.
    pub fn build<N, M>(
        decl: NfaDecl,
        storage: StorageDsn,
        mut nullable: N,
        mut matches: M,
    ) -> Result<Self>
    where
        N: FnMut(VertexId) -> std::result::Result<bool, OracleError>,
        M: FnMut(VertexId, InputId) -> std::result::Result<bool, OracleError>,
    {
        let mut store = Store::new(storage);
        load::load(&mut store, &decl, &mut nullable, &mut matches)?;
        closure::build(&mut store);
        let (dead, _) = registry::intern_key(&mut store, codec::encode(&[]), 0);
        debug!("builder ready: dead state {}", dead);

        let builder = DfaBuilder { store, dead };
        builder.store.checkpoint()?;
        Ok(builder)
    }

    /// Reopen a builder from a v0 snapshot. Oracles are not needed: the
    /// nullable and matches answers are plain tables in the snapshot.
    pub fn restore_from_file(path: &Path, storage: StorageDsn) -> Result<Self> {
        let store = Store::restore(path, storage)?;
        let dead = store
            .by_key
            .get(codec::encode(&[]).as_slice())
            .copied()
            .ok_or(Error::CorruptSnapshot("snapshot has no dead state"))?;
        Ok(DfaBuilder { store, dead })
    }

    /// The state interned from the empty vertex list.
    pub fn dead_state_id(&self) -> StateId {
        self.dead
    }

    /// Close the given vertices under epsilon, canonicalize, and return the
    /// interned state ID, allocating a new state (and its unresolved
    /// transition rows) if the set was never seen.
    pub fn find_or_create_state_id(&mut self, vertices: &[VertexId]) -> Result<StateId> {
        let id = registry::find_or_create(&mut self.store, vertices, 0)?;
        self.store.checkpoint()?;
        Ok(id)
    }

    /// Resolve up to `limit` unresolved transitions, preferring sources
    /// closest to a requested start. Returns the number resolved; 0 means
    /// the DFA is total. `limit = 0` is a no-op.
    pub fn compute_some_transitions(&mut self, limit: usize) -> Result<usize> {
        let n = expand::compute_some_transitions(&mut self.store, limit)?;
        if n > 0 {
            self.store.checkpoint()?;
        }
        Ok(n)
    }

    /// Drive [`Self::compute_some_transitions`] to the fixpoint. Returns
    /// the total number of transitions resolved.
    pub fn compute_all_transitions(&mut self) -> Result<usize> {
        let mut total = 0;
        loop {
            let n = self.compute_some_transitions(DEFAULT_BATCH)?;
            if n == 0 {
                return Ok(total);
            }
            total += n;
        }
    }

    /// Decode the vertex set of a state.
    pub fn vertices_in_state(&self, state: StateId) -> Result<Vec<VertexId>> {
        let row = self
            .store
            .states
            .get(&state)
            .ok_or(Error::UnknownState(state))?;
        codec::decode(&row.key)
    }

    /// Iterate `(state_id, vertex_list)` in ascending ID order. The
    /// iterator reflects the states present when it was created.
    pub fn state_vertices_iter(&self) -> impl Iterator<Item = (StateId, Vec<VertexId>)> + '_ {
        let ids: Vec<StateId> = self.store.states.keys().copied().collect();
        ids.into_iter().filter_map(move |id| {
            let row = self.store.states.get(&id)?;
            let vertices = codec::decode(&row.key).ok()?;
            Some((id, vertices))
        })
    }

    /// All resolved transitions, dead state included, sorted by
    /// `(src, input)`. Unresolved rows are excluded.
    pub fn transitions_as_3tuples(&self) -> Vec<(StateId, InputId, StateId)> {
        let mut rows: Vec<(StateId, InputId, StateId)> = self
            .store
            .transitions
            .iter()
            .filter_map(|(&(src, input), &dst)| dst.map(|d| (src, input, d)))
            .collect();
        rows.sort_unstable();
        rows
    }

    /// Resolved transitions joined with the NFA edges that witness them:
    /// `(src_state, src_vertex, input, dst_state, dst_vertex)` for every
    /// matching edge `(v, w)` out of the source set and every vertex in the
    /// closure of `w` (the reflexive closure rows contribute `w` itself,
    /// nullable chains the epsilon continuation). Rows involving the dead
    /// state are excluded.
    pub fn transitions_as_5tuples(
        &self,
    ) -> Result<Vec<(StateId, VertexId, InputId, StateId, VertexId)>> {
        let mut rows: Vec<(StateId, VertexId, InputId, StateId, VertexId)> = Vec::new();
        for (&(src, input), &dst) in &self.store.transitions {
            let Some(dst) = dst else { continue };
            if src == self.dead || dst == self.dead {
                continue;
            }
            for v in self.vertices_in_state(src)? {
                if !self.store.matches.contains(&(v, input)) {
                    continue;
                }
                let Some(ws) = self.store.edges_from.get(&v) else {
                    continue;
                };
                for &w in ws {
                    if let Some(cl) = self.store.closure.get(&w) {
                        for &u in cl {
                            rows.push((src, v, input, dst, u));
                        }
                    }
                }
            }
        }
        rows.sort_unstable();
        rows.dedup();
        Ok(rows)
    }

    /// Redirect every transition that cannot reach an accepting state at
    /// the dead sink and drop the states left unreachable. Returns the
    /// accepting state IDs. Idempotent.
    pub fn cleanup_dead_states<A>(&mut self, mut accepts: A) -> Result<Vec<StateId>>
    where
        A: FnMut(&[VertexId]) -> std::result::Result<bool, OracleError>,
    {
        let accepting = reduce::cleanup_dead_states(&mut self.store, self.dead, &mut accepts)?;
        self.store.checkpoint()?;
        Ok(accepting)
    }

    /// Snapshot the entire store to `path`. The only supported version tag
    /// is `"v0"`; anything else is an error, reserving the option to break
    /// the format later.
    pub fn backup_to_file(&self, version: &str, path: &Path) -> Result<()> {
        if version != SNAPSHOT_VERSION {
            return Err(Error::UnsupportedVersion(version.to_string()));
        }
        self.store.write_snapshot(path)
    }
}
