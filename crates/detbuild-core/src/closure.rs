//! Epsilon-closure precomputation.
//!
//! `closure(v)` is the set of vertices reachable from `v` by traversing
//! only edges whose source vertex is nullable, plus `v` itself. The table
//! is computed once after load and reused for every transition; every
//! target-set computation would otherwise re-walk the same epsilon chains.

use std::collections::VecDeque;

use log::debug;

use crate::store::Store;
use crate::VertexId;

/// Populate the closure table for every registered vertex.
pub(crate) fn build(store: &mut Store) {
    let roots: Vec<VertexId> = store.vertices.keys().copied().collect();
    for root in roots {
        // Simple Vec as the visited set; the result is sorted at the end
        // anyway and closures are small relative to the vertex table.
        let mut seen: Vec<VertexId> = vec![root];
        let mut worklist: VecDeque<VertexId> = VecDeque::new();
        worklist.push_back(root);

        while let Some(v) = worklist.pop_front() {
            if !store.vertices.get(&v).copied().unwrap_or(false) {
                continue; // only nullable vertices emit epsilon transitions
            }
            if let Some(dsts) = store.edges_from.get(&v) {
                for &d in dsts {
                    if !seen.contains(&d) {
                        seen.push(d);
                        worklist.push_back(d);
                    }
                }
            }
        }

        seen.sort_unstable();
        store.closure.insert(root, seen);
    }

    let rows: usize = store.closure.values().map(Vec::len).sum();
    debug!(
        "epsilon closure built: {} roots, {} rows",
        store.closure.len(),
        rows,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::{self, NfaDecl};
    use crate::store::StorageDsn;

    fn closed_store(decl: &NfaDecl, nullable: impl Fn(VertexId) -> bool) -> Store {
        let mut store = Store::new(StorageDsn::Memory);
        load::load(&mut store, decl, &mut |v| Ok(nullable(v)), &mut |_, _| {
            Ok(false)
        })
        .unwrap();
        build(&mut store);
        store
    }

    #[test]
    fn test_reflexive_for_every_vertex() {
        let decl = NfaDecl {
            alphabet: vec![],
            vertices: vec![1, 2],
            edges: vec![(1, 2)],
        };
        let store = closed_store(&decl, |_| false);
        assert_eq!(store.closure[&1], vec![1]);
        assert_eq!(store.closure[&2], vec![2]);
    }

    #[test]
    fn test_nullable_chain() {
        let decl = NfaDecl {
            alphabet: vec![],
            vertices: vec![1, 2, 3],
            edges: vec![(1, 2), (2, 3)],
        };
        let store = closed_store(&decl, |_| true);
        assert_eq!(store.closure[&1], vec![1, 2, 3]);
        assert_eq!(store.closure[&2], vec![2, 3]);
        assert_eq!(store.closure[&3], vec![3]);
    }

    #[test]
    fn test_chain_stops_at_non_nullable() {
        let decl = NfaDecl {
            alphabet: vec![],
            vertices: vec![2, 3, 4],
            edges: vec![(2, 3), (3, 4)],
        };
        // Only 2 is nullable: closure(2) reaches 3 but must not cross it.
        let store = closed_store(&decl, |v| v == 2);
        assert_eq!(store.closure[&2], vec![2, 3]);
        assert_eq!(store.closure[&3], vec![3]);
    }

    #[test]
    fn test_cycle_terminates() {
        let decl = NfaDecl {
            alphabet: vec![],
            vertices: vec![1, 2],
            edges: vec![(1, 2), (2, 1)],
        };
        let store = closed_store(&decl, |_| true);
        assert_eq!(store.closure[&1], vec![1, 2]);
        assert_eq!(store.closure[&2], vec![1, 2]);
    }
}
