//! Interaction graph over currently-executable two-qubit gates, and the
//! sequencer that assigns fixed/moveable interaction-zone columns.

use rustc_hash::{FxHashMap, FxHashSet};

use napp_ir::gate::StandardGate;

use crate::error::{MapError, MapResult};
use crate::layer::{Layer, VertexId};
use crate::mapping::CircQubit;

/// `(moveable, fixed)` column assignment for one two-qubit batch.
///
/// `fixed` places each fixed-side qubit at a static column of the
/// interaction row. `moveable` is a sequence of timeframes, each a
/// partial map from a moveable-side qubit to a signed column offset.
///
/// Because any two CZ vertices sharing a circuit qubit are always
/// DAG-ordered (CZ is not in the diagonal commutation set), the
/// currently-executable CZ edges always form a vertex-disjoint matching,
/// so a single timeframe is always sufficient in practice. The type
/// still carries the general multi-timeframe shape the interface
/// describes.
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    pub fixed: FxHashMap<CircQubit, i64>,
    pub moveable: Vec<FxHashMap<CircQubit, i64>>,
}

/// Undirected graph over circuit qubits whose edges are the currently
/// executable two-qubit gates of a given kind.
pub struct InteractionGraph {
    edges: Vec<(CircQubit, CircQubit, VertexId)>,
}

impl InteractionGraph {
    /// Builds the graph of currently executable `(Z, 1)` (CZ) gates.
    pub fn construct(layer: &Layer) -> MapResult<Self> {
        let mut edges = vec![];
        for id in layer.executables_of_kind(&StandardGate::CZ, 2) {
            let v = layer.vertex(id);
            edges.push((v.qubits[0], v.qubits[1], id));
        }
        if edges.is_empty() {
            return Err(MapError::EmptyBatch(0));
        }
        Ok(Self { edges })
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn vertex_for(&self, a: CircQubit, b: CircQubit) -> Option<VertexId> {
        self.edges
            .iter()
            .find(|&&(x, y, _)| (x == a && y == b) || (x == b && y == a))
            .map(|&(_, _, id)| id)
    }

    pub fn edges(&self) -> &[(CircQubit, CircQubit, VertexId)] {
        &self.edges
    }

    /// Computes the fixed/moveable column assignment: a greedy matching
    /// where the first-seen endpoint of each edge becomes fixed, the
    /// second becomes moveable, paired at the same column index.
    pub fn compute_sequence(&self) -> Sequence {
        let mut fixed = FxHashMap::default();
        let mut frame = FxHashMap::default();
        let mut seen: FxHashSet<CircQubit> = FxHashSet::default();
        let mut column = 0i64;

        for &(a, b, _) in &self.edges {
            if seen.contains(&a) || seen.contains(&b) {
                continue;
            }
            seen.insert(a);
            seen.insert(b);
            fixed.insert(a, column);
            frame.insert(b, column);
            column += 1;
        }

        Sequence {
            fixed,
            moveable: vec![frame],
        }
    }
}
