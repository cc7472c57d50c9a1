//! Indexed relational storage for the subset construction.
//!
//! One `Store` owns every table the construction reads or writes: the NFA
//! base tables (alphabet, vertices, edges, matches), the derived closure
//! table, and the DFA tables (states, transitions, pending work). Base
//! tables are written once by the loader and never mutated afterwards; the
//! DFA tables grow monotonically during expansion, and only the dead-state
//! reducer deletes rows.
//!
//! Primary tables live in ordered containers so that iteration, and with it
//! the v0 snapshot, is deterministic; hot lookups go through `FxHashMap`
//! secondary indexes.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use log::{debug, trace};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::{InputId, StateId, VertexId};

/// Snapshot schema version this build reads and writes.
pub(crate) const SNAPSHOT_VERSION: &str = "v0";

/// Where the store lives between calls.
#[derive(Debug, Clone, Default)]
pub enum StorageDsn {
    /// Ephemeral, in-memory only.
    #[default]
    Memory,
    /// Write the full v0 snapshot to this path after every committed
    /// mutating call, so progress from any completed call survives a crash.
    File(PathBuf),
}

/// One interned DFA state.
#[derive(Debug, Clone)]
pub struct StateRow {
    /// Canonical vertex-set key (codec output).
    pub key: Vec<u8>,
    /// Monotone upper bound on the number of transitions needed to reach
    /// this state from a caller-requested start. Scheduling priority only.
    pub distance: u32,
}

pub struct Store {
    pub(crate) alphabet: BTreeSet<InputId>,
    /// Vertex → nullable flag.
    pub(crate) vertices: BTreeMap<VertexId, bool>,
    pub(crate) edges: BTreeSet<(VertexId, VertexId)>,
    /// Secondary index: src vertex → destination vertices.
    pub(crate) edges_from: FxHashMap<VertexId, Vec<VertexId>>,
    /// `(vertex, input)` pairs accepted by the matches oracle.
    pub(crate) matches: FxHashSet<(VertexId, InputId)>,
    /// Root vertex → sorted epsilon-closure (always contains the root).
    pub(crate) closure: FxHashMap<VertexId, Vec<VertexId>>,
    pub(crate) states: BTreeMap<StateId, StateRow>,
    /// Interning index: canonical key → state ID. UNIQUE both ways.
    pub(crate) by_key: FxHashMap<Vec<u8>, StateId>,
    /// `(src, input)` → destination; `None` marks an unresolved row.
    pub(crate) transitions: FxHashMap<(StateId, InputId), Option<StateId>>,
    /// Work queue: every unresolved row, ordered by `(distance, src, input)`.
    pub(crate) pending: BTreeSet<(u32, StateId, InputId)>,
    /// Next state ID to allocate. Never reused, survives snapshots.
    pub(crate) next_state_id: StateId,
    pub(crate) storage: StorageDsn,
}

impl Store {
    pub(crate) fn new(storage: StorageDsn) -> Self {
        Store {
            alphabet: BTreeSet::new(),
            vertices: BTreeMap::new(),
            edges: BTreeSet::new(),
            edges_from: FxHashMap::default(),
            matches: FxHashSet::default(),
            closure: FxHashMap::default(),
            states: BTreeMap::new(),
            by_key: FxHashMap::default(),
            transitions: FxHashMap::default(),
            pending: BTreeSet::new(),
            next_state_id: 0,
            storage,
        }
    }

    /// Persist to the file DSN, if one was configured.
    pub(crate) fn checkpoint(&self) -> Result<()> {
        match &self.storage {
            StorageDsn::Memory => Ok(()),
            StorageDsn::File(path) => {
                self.write_snapshot(path)?;
                trace!("checkpointed store to {}", path.display());
                Ok(())
            }
        }
    }

    /// Write the v0 snapshot to `path`.
    ///
    /// The byte stream is a deterministic function of the store contents:
    /// every relation is emitted in sorted order, so snapshot → restore →
    /// snapshot round-trips byte-identically.
    pub(crate) fn write_snapshot(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec(&self.snapshot_doc())?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Reopen a v0 snapshot. Secondary indexes and the work queue are
    /// rebuilt from the persisted relations rather than stored.
    pub(crate) fn restore(path: &Path, storage: StorageDsn) -> Result<Store> {
        let bytes = std::fs::read(path)?;
        let doc: SnapshotV0 = serde_json::from_slice(&bytes)?;
        if doc.version != SNAPSHOT_VERSION {
            return Err(Error::UnsupportedVersion(doc.version));
        }

        let mut store = Store::new(storage);
        store.alphabet = doc.alphabet.into_iter().collect();
        store.vertices = doc.vertices.into_iter().collect();
        for (src, dst) in doc.edges {
            if store.edges.insert((src, dst)) {
                store.edges_from.entry(src).or_default().push(dst);
            }
        }
        store.matches = doc.matches.into_iter().collect();
        store.closure = doc.closure.into_iter().collect();

        for (id, key, distance) in doc.states {
            let key = key.into_bytes();
            if store.by_key.insert(key.clone(), id).is_some() {
                return Err(Error::CorruptSnapshot("duplicate canonical state key"));
            }
            store.states.insert(id, StateRow { key, distance });
        }
        for (src, input, dst) in doc.transitions {
            if dst.is_none() {
                let distance = store
                    .states
                    .get(&src)
                    .ok_or(Error::CorruptSnapshot(
                        "transition references a missing state",
                    ))?
                    .distance;
                store.pending.insert((distance, src, input));
            }
            store.transitions.insert((src, input), dst);
        }
        store.next_state_id = doc.next_state_id;

        debug!(
            "restored snapshot: {} vertices, {} states, {} pending",
            store.vertices.len(),
            store.states.len(),
            store.pending.len(),
        );
        Ok(store)
    }

    fn snapshot_doc(&self) -> SnapshotV0 {
        let mut matches: Vec<(VertexId, InputId)> = self.matches.iter().copied().collect();
        matches.sort_unstable();

        let mut closure: Vec<(VertexId, Vec<VertexId>)> = self
            .closure
            .iter()
            .map(|(&root, set)| (root, set.clone()))
            .collect();
        closure.sort_unstable_by_key(|(root, _)| *root);

        let mut transitions: Vec<(StateId, InputId, Option<StateId>)> = self
            .transitions
            .iter()
            .map(|(&(src, input), &dst)| (src, input, dst))
            .collect();
        transitions.sort_unstable();

        SnapshotV0 {
            version: SNAPSHOT_VERSION.to_string(),
            alphabet: self.alphabet.iter().copied().collect(),
            vertices: self.vertices.iter().map(|(&v, &n)| (v, n)).collect(),
            edges: self.edges.iter().copied().collect(),
            matches,
            closure,
            states: self
                .states
                .iter()
                .map(|(&id, row)| {
                    let key = String::from_utf8_lossy(&row.key).into_owned();
                    (id, key, row.distance)
                })
                .collect(),
            transitions,
            next_state_id: self.next_state_id,
        }
    }
}

/// The v0 snapshot layout. Field order and per-relation sorting are part of
/// the public contract; changing either requires a new version tag.
#[derive(Serialize, Deserialize)]
struct SnapshotV0 {
    version: String,
    alphabet: Vec<InputId>,
    vertices: Vec<(VertexId, bool)>,
    edges: Vec<(VertexId, VertexId)>,
    matches: Vec<(VertexId, InputId)>,
    closure: Vec<(VertexId, Vec<VertexId>)>,
    states: Vec<(StateId, String, u32)>,
    transitions: Vec<(StateId, InputId, Option<StateId>)>,
    next_state_id: StateId,
}
