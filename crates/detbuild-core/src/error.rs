use crate::{InputId, StateId, VertexId};
use thiserror::Error;

/// Boxed error returned by a host oracle; propagated to the caller unchanged.
pub type OracleError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the construction. The builder never retries and never
/// swallows; every failed call leaves the store as if the call never began.
#[derive(Debug, Error)]
pub enum Error {
    /// A vertex ID that was never registered in the NFA was passed in.
    #[error("vertex {0} is not registered in the NFA")]
    UnknownVertex(VertexId),

    /// A state ID that does not (or no longer does) exist was passed in.
    #[error("state {0} does not exist")]
    UnknownState(StateId),

    #[error("nullable oracle failed for vertex {vertex}: {source}")]
    NullableOracle {
        vertex: VertexId,
        source: OracleError,
    },

    #[error("matches oracle failed for vertex {vertex}, input {input}: {source}")]
    MatchesOracle {
        vertex: VertexId,
        input: InputId,
        source: OracleError,
    },

    #[error("acceptance oracle failed for state {state}: {source}")]
    AcceptsOracle { state: StateId, source: OracleError },

    /// `backup_to_file` was asked for a snapshot version this build does not
    /// produce, or a snapshot file declares one it cannot read.
    #[error("unsupported snapshot version {0:?} (expected \"v0\")")]
    UnsupportedVersion(String),

    /// A snapshot file decoded but violates the v0 layout.
    #[error("snapshot is corrupt: {0}")]
    CorruptSnapshot(&'static str),

    /// A canonical state key failed to decode back into a vertex list.
    #[error("malformed canonical state key")]
    MalformedKey,

    #[error("snapshot encoding: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
