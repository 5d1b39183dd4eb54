//! Commutation-aware DAG over circuit operations.
//!
//! Vertices live in a single arena (a `Vec` owned by the [`Layer`]) and are
//! referenced by dense index rather than by a cyclic web of shared
//! pointers. The executable set is a plain set of indices, re-evaluated
//! by the Layer itself on every counter/threshold change.

use rustc_hash::FxHashSet;

use napp_ir::gate::{GateKind, StandardGate};
use napp_ir::instruction::{Instruction, InstructionKind};

use crate::mapping::CircQubit;

/// Dense index of a [`DagVertex`] within a [`Layer`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// One input operation, tracked for executability.
#[derive(Debug, Clone)]
pub struct DagVertex {
    pub instruction: Instruction,
    pub qubits: Vec<CircQubit>,
    executable_threshold: i64,
    executable_counter: i64,
    enabled_successors: Vec<VertexId>,
    disabled_successors: Vec<VertexId>,
    executed: bool,
}

impl DagVertex {
    fn new(instruction: Instruction, qubits: Vec<CircQubit>) -> Self {
        Self {
            instruction,
            qubits,
            executable_threshold: 0,
            executable_counter: 0,
            enabled_successors: vec![],
            disabled_successors: vec![],
            executed: false,
        }
    }

    pub fn is_executable(&self) -> bool {
        !self.executed && self.executable_counter == self.executable_threshold
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    /// Number of qubits this vertex's operation touches.
    pub fn num_targets(&self) -> usize {
        self.qubits.len()
    }

    /// Whether this vertex is a `(StandardGate::CZ, 2)`-style two-qubit
    /// gate of the given standard gate.
    pub fn is_standard_gate(&self, gate: &StandardGate) -> bool {
        matches!(
            &self.instruction.kind,
            InstructionKind::Gate(g) if matches!(&g.kind, GateKind::Standard(sg) if sg == gate)
        )
    }
}

/// Returns whether a gate is in the fixed diagonal-gate set: identity, Z,
/// S, S†, T, T†, phase, RZ, RZZ. Barriers are treated as diagonal too
/// (they impose no computational-basis constraint).
fn is_diagonal(instruction: &Instruction) -> bool {
    match &instruction.kind {
        InstructionKind::Barrier => true,
        InstructionKind::Gate(g) => matches!(
            &g.kind,
            GateKind::Standard(
                StandardGate::I
                    | StandardGate::Z
                    | StandardGate::S
                    | StandardGate::Sdg
                    | StandardGate::T
                    | StandardGate::Tdg
                    | StandardGate::P(_)
                    | StandardGate::Rz(_)
                    | StandardGate::RZZ(_)
            )
        ),
        _ => false,
    }
}

/// Self-inverse standard gates.
fn is_self_inverse(gate: &StandardGate) -> bool {
    matches!(
        gate,
        StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::SX
            | StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
    )
}

/// Two standard gates that are each other's inverse.
fn is_inverse_pair(a: &StandardGate, b: &StandardGate) -> bool {
    matches!(
        (a, b),
        (StandardGate::S, StandardGate::Sdg)
            | (StandardGate::Sdg, StandardGate::S)
            | (StandardGate::T, StandardGate::Tdg)
            | (StandardGate::Tdg, StandardGate::T)
            | (StandardGate::SX, StandardGate::SXdg)
            | (StandardGate::SXdg, StandardGate::SX)
    ) || (a == b && is_self_inverse(a))
}

/// Whether `a` and `b` are exact inverses of one another as *whole*
/// operations: same operand set (order-insensitive) and inverse gate
/// kinds.
fn are_exact_inverses(a: &Instruction, b: &Instruction) -> bool {
    let (InstructionKind::Gate(ga), InstructionKind::Gate(gb)) = (&a.kind, &b.kind) else {
        return false;
    };
    let (GateKind::Standard(sa), GateKind::Standard(sb)) = (&ga.kind, &gb.kind) else {
        return false;
    };
    if !is_inverse_pair(sa, sb) {
        return false;
    }
    let mut qa = a.qubits.clone();
    let mut qb = b.qubits.clone();
    qa.sort_by_key(|q| q.0);
    qb.sort_by_key(|q| q.0);
    qa == qb
}

/// Whether two operations that both touch qubit `q` require no ordering
/// edge between them on that qubit.
fn non_ordering(a: &Instruction, b: &Instruction) -> bool {
    (is_diagonal(a) && is_diagonal(b)) || are_exact_inverses(a, b)
}

/// Commutation-aware DAG with an incrementally-maintained executable set.
#[derive(Debug, Default)]
pub struct Layer {
    vertices: Vec<DagVertex>,
    executable_set: FxHashSet<VertexId>,
}

impl Layer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the DAG from a flat instruction stream. Each instruction's
    /// qubits are resolved against the previous *open* vertices touching
    /// that qubit: vertices that commute with the new instruction stay
    /// open (no edge, both remain roots or frontier members); vertices
    /// that don't get an enabled edge to the new vertex and leave the
    /// frontier (the new vertex inherits their transitive ordering).
    pub fn build(instructions: Vec<Instruction>) -> Self {
        let mut layer = Self::new();
        let mut frontier: Vec<Vec<VertexId>> = vec![];

        for instruction in instructions {
            let qubits: Vec<CircQubit> = instruction
                .qubits
                .iter()
                .map(|q| CircQubit(q.0 as usize))
                .collect();
            let needed = qubits.iter().map(|q| q.0 + 1).max().unwrap_or(0);
            if frontier.len() < needed {
                frontier.resize(needed, vec![]);
            }

            let id = layer.push_vertex(DagVertex::new(instruction, qubits.clone()));

            for &q in &qubits {
                let mut still_open = vec![];
                for &pred in &frontier[q.0] {
                    let commute = non_ordering(&layer.vertices[pred.0].instruction, &layer.vertices[id.0].instruction);
                    if commute {
                        still_open.push(pred);
                    } else {
                        layer.add_enabled_edge(pred, id);
                    }
                }
                still_open.push(id);
                frontier[q.0] = still_open;
            }
        }

        layer.rebuild_executable_set();
        layer
    }

    fn push_vertex(&mut self, vertex: DagVertex) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(vertex);
        id
    }

    /// Executing `pred` increments `succ`'s counter. Default edge kind.
    fn add_enabled_edge(&mut self, pred: VertexId, succ: VertexId) {
        self.vertices[pred.0].enabled_successors.push(succ);
        self.vertices[succ.0].executable_threshold += 1;
    }

    /// Executing `pred` decrements `succ`'s counter; the threshold is
    /// already lowered at construction time to compensate.
    #[allow(dead_code)]
    fn add_disabled_edge(&mut self, pred: VertexId, succ: VertexId) {
        self.vertices[pred.0].disabled_successors.push(succ);
        self.vertices[succ.0].executable_threshold -= 1;
    }

    fn rebuild_executable_set(&mut self) {
        self.executable_set = self
            .vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_executable())
            .map(|(i, _)| VertexId(i))
            .collect();
    }

    pub fn vertex(&self, id: VertexId) -> &DagVertex {
        &self.vertices[id.0]
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty_executable_set(&self) -> bool {
        self.executable_set.is_empty()
    }

    pub fn all_executed(&self) -> bool {
        self.vertices.iter().all(|v| v.executed)
    }

    /// Snapshot of all currently-executable vertices.
    pub fn executable_set(&self) -> Vec<VertexId> {
        self.executable_set.iter().copied().collect()
    }

    /// Executable vertices whose operation is a standard gate of the
    /// given kind with the given target count.
    pub fn executables_of_kind(&self, gate: &StandardGate, num_targets: usize) -> Vec<VertexId> {
        self.executable_set
            .iter()
            .copied()
            .filter(|&id| {
                let v = &self.vertices[id.0];
                v.is_standard_gate(gate) && v.num_targets() == num_targets
            })
            .collect()
    }

    /// Marks `id` executed and propagates counter updates to successors,
    /// re-checking executable-set membership for each one touched.
    pub fn execute(&mut self, id: VertexId) {
        debug_assert!(self.vertices[id.0].is_executable());
        self.vertices[id.0].executed = true;
        self.executable_set.remove(&id);

        let enabled = self.vertices[id.0].enabled_successors.clone();
        let disabled = self.vertices[id.0].disabled_successors.clone();

        for succ in enabled {
            self.vertices[succ.0].executable_counter += 1;
            self.refresh_membership(succ);
        }
        for succ in disabled {
            self.vertices[succ.0].executable_counter -= 1;
            self.refresh_membership(succ);
        }
    }

    fn refresh_membership(&mut self, id: VertexId) {
        if self.vertices[id.0].is_executable() {
            self.executable_set.insert(id);
        } else {
            self.executable_set.remove(&id);
        }
    }
}
