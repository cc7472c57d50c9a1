//! Staged NFA → DFA subset construction over an indexed store.
//!
//! The input is a vertex-labeled directed graph: each vertex may be
//! `nullable` (matches the empty input) and may match terminal symbols from
//! a finite alphabet. Epsilon transitions are outgoing edges of nullable
//! vertices. The output is an equivalent DFA, materialized in stages:
//! [`DfaBuilder::compute_some_transitions`] resolves a bounded batch of
//! transitions per call, so the exponential blow-up never has to fit in
//! memory at once and callers can pause and resume the work.
//!
//! All intermediate data lives in an indexed store ([`store::Store`]) that
//! can be snapshotted to a versioned file and reopened later.

pub mod builder;
pub mod closure;
pub mod codec;
pub mod error;
pub mod expand;
pub mod load;
pub mod reduce;
pub mod registry;
pub mod store;

pub use builder::DfaBuilder;
pub use error::{Error, OracleError, Result};
pub use load::NfaDecl;
pub use store::StorageDsn;

/// NFA vertex identifier.
pub type VertexId = u32;
/// Terminal input symbol.
pub type InputId = u32;
/// Interned DFA state identifier.
pub type StateId = u32;
