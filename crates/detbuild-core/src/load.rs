//! Input loader.
//!
//! Ingests the alphabet, vertices, and edges, and evaluates the host
//! oracles exactly once per vertex (`nullable`) and once per
//! vertex × symbol pair (`matches`), writing the answers as plain tables.
//! Oracles are taken by argument and never stored, so they cannot outlive
//! the load call that uses them.
//!
//! Loading always targets a fresh store; an oracle failure aborts the
//! surrounding construction, which leaves nothing behind.

use log::debug;

use crate::error::{Error, OracleError, Result};
use crate::store::Store;
use crate::{InputId, VertexId};

/// Declarative NFA input.
///
/// Duplicates in any field are ignored. Vertices referenced only by edges
/// are auto-registered during load, which triggers their nullability
/// evaluation just like an explicit entry.
#[derive(Debug, Clone, Default)]
pub struct NfaDecl {
    pub alphabet: Vec<InputId>,
    pub vertices: Vec<VertexId>,
    pub edges: Vec<(VertexId, VertexId)>,
}

pub(crate) fn load<N, M>(
    store: &mut Store,
    decl: &NfaDecl,
    nullable: &mut N,
    matches: &mut M,
) -> Result<()>
where
    N: FnMut(VertexId) -> std::result::Result<bool, OracleError>,
    M: FnMut(VertexId, InputId) -> std::result::Result<bool, OracleError>,
{
    for &input in &decl.alphabet {
        store.alphabet.insert(input);
    }

    for &v in &decl.vertices {
        register_vertex(store, v, nullable)?;
    }

    // Edge endpoints must exist in the vertex table; inserting an edge
    // registers both if needed.
    for &(src, dst) in &decl.edges {
        register_vertex(store, src, nullable)?;
        register_vertex(store, dst, nullable)?;
        if store.edges.insert((src, dst)) {
            store.edges_from.entry(src).or_default().push(dst);
        }
    }

    // matches over the full vertex × alphabet cross-product.
    for (&v, _) in &store.vertices {
        for &input in &store.alphabet {
            let hit = matches(v, input).map_err(|source| Error::MatchesOracle {
                vertex: v,
                input,
                source,
            })?;
            if hit {
                store.matches.insert((v, input));
            }
        }
    }

    debug!(
        "loaded NFA: {} symbols, {} vertices, {} edges, {} matches",
        store.alphabet.len(),
        store.vertices.len(),
        store.edges.len(),
        store.matches.len(),
    );
    Ok(())
}

fn register_vertex<N>(store: &mut Store, v: VertexId, nullable: &mut N) -> Result<()>
where
    N: FnMut(VertexId) -> std::result::Result<bool, OracleError>,
{
    if !store.vertices.contains_key(&v) {
        let is_nullable =
            nullable(v).map_err(|source| Error::NullableOracle { vertex: v, source })?;
        store.vertices.insert(v, is_nullable);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StorageDsn;

    fn load_into_fresh(decl: &NfaDecl) -> Result<Store> {
        let mut store = Store::new(StorageDsn::Memory);
        load(
            &mut store,
            decl,
            &mut |v| Ok(v % 2 == 0),
            &mut |v, i| Ok(v == i),
        )?;
        Ok(store)
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let decl = NfaDecl {
            alphabet: vec![1, 1, 2],
            vertices: vec![5, 5],
            edges: vec![(5, 6), (5, 6)],
        };
        let store = load_into_fresh(&decl).unwrap();
        assert_eq!(store.alphabet.len(), 2);
        assert_eq!(store.vertices.len(), 2);
        assert_eq!(store.edges.len(), 1);
        assert_eq!(store.edges_from[&5], vec![6]);
    }

    #[test]
    fn test_edges_auto_register_endpoints() {
        let decl = NfaDecl {
            alphabet: vec![3],
            vertices: vec![],
            edges: vec![(2, 3)],
        };
        let store = load_into_fresh(&decl).unwrap();
        assert_eq!(store.vertices.get(&2), Some(&true));
        assert_eq!(store.vertices.get(&3), Some(&false));
    }

    #[test]
    fn test_matches_covers_cross_product() {
        let decl = NfaDecl {
            alphabet: vec![2, 7],
            vertices: vec![2, 7],
            edges: vec![],
        };
        let store = load_into_fresh(&decl).unwrap();
        assert!(store.matches.contains(&(2, 2)));
        assert!(store.matches.contains(&(7, 7)));
        assert!(!store.matches.contains(&(2, 7)));
    }

    #[test]
    fn test_nullable_oracle_error_propagates() {
        let decl = NfaDecl {
            alphabet: vec![1],
            vertices: vec![4],
            edges: vec![],
        };
        let mut store = Store::new(StorageDsn::Memory);
        let result = load(
            &mut store,
            &decl,
            &mut |_| Err("host says no".into()),
            &mut |_, _| Ok(false),
        );
        match result {
            Err(Error::NullableOracle { vertex, .. }) => assert_eq!(vertex, 4),
            other => panic!("expected oracle error, got {:?}", other),
        }
    }
}
