//! Error types for the mapping and scheduling engine.

use thiserror::Error;

use crate::geometry::SiteId;

/// Errors produced while building or running the mapper.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MapError {
    #[error("coordinate {0:?} is already occupied")]
    CoordinateOccupied(SiteId),

    #[error("{0}")]
    CoordinateEmpty(String),

    #[error("circuit qubit {0} has no hardware qubit assigned")]
    UnmappedCircuitQubit(usize),

    #[error("hardware qubit {0} has no circuit qubit assigned")]
    UnmappedHwQubit(usize),

    #[error("geometry has no site reachable in the requested direction from {0:?}")]
    NoReachableSite(SiteId),

    #[error("interaction graph references unknown operation index {0}")]
    UnknownOperation(usize),

    #[error("two-qubit batch at column {0} is empty")]
    EmptyBatch(usize),

    #[error("machine description is invalid: {0}")]
    InvalidMachine(String),

    #[error("postprocessing could not decompose move for qubit {0}")]
    UndecomposableMove(usize),

    /// A gate the mapper has no realisation strategy for (anything
    /// outside the diagonal commutation set plus CZ and the declared
    /// local/global pulses).
    #[error("unsupported gate: {0}")]
    UnsupportedGate(String),

    /// The circuit's qubit count (or an explicit initial layout) does not
    /// fit the target geometry.
    #[error("architecture mismatch: {0}")]
    ArchitectureMismatch(String),

    /// An internal consistency check failed — a bug in the mapper, not a
    /// malformed input.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The storage zones have no remaining capacity for the atoms that
    /// still need a site.
    #[error("out of room: {0}")]
    OutOfRoom(String),

    #[error("ir error: {0}")]
    Ir(#[from] napp_ir::IrError),
}

pub type MapResult<T> = Result<T, MapError>;
