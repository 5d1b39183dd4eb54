//! Property-based tests for the mapper's testable invariants (P1-P8).
//!
//! Each test generates small random gate streams over a fixed 3-atom
//! geometry (2 storage sites + a 2-site interaction row) drawn only from
//! gate kinds the mapper can realise (global X, storage-local Z, CZ), so
//! `Mapper::map` always succeeds and the properties can be checked on its
//! output rather than on an error path.

use proptest::prelude::*;

use napp_core::geometry::{Point, Site, SiteId, Zone, ZoneId};
use napp_core::operation::ShuttlingKind;
use napp_core::{Geometry, Mapper, MapperConfig, Operation};
use napp_ir::gate::StandardGate;
use napp_ir::instruction::Instruction;
use napp_ir::qubit::QubitId;

const NUM_ATOMS: usize = 3;

fn geometry() -> Geometry {
    let zones = vec![
        Zone {
            id: ZoneId(0),
            name: "storage".into(),
            interaction_capable: false,
            local_gates: vec!["z".into()],
        },
        Zone {
            id: ZoneId(1),
            name: "interaction".into(),
            interaction_capable: true,
            local_gates: vec![],
        },
    ];
    let sites = vec![
        Site { id: SiteId(0), zone: ZoneId(0), row: 0, col: 0, position: Point::new(0, 0) },
        Site { id: SiteId(1), zone: ZoneId(0), row: 0, col: 1, position: Point::new(10, 0) },
        Site { id: SiteId(2), zone: ZoneId(0), row: 0, col: 2, position: Point::new(20, 0) },
        Site { id: SiteId(3), zone: ZoneId(1), row: 0, col: 0, position: Point::new(0, 100) },
        Site { id: SiteId(4), zone: ZoneId(1), row: 0, col: 1, position: Point::new(10, 100) },
        Site { id: SiteId(5), zone: ZoneId(1), row: 0, col: 2, position: Point::new(20, 100) },
    ];
    Geometry::new(zones, sites, ZoneId(1), 12.0, 20.0, 1, vec!["x".into()])
}

#[derive(Debug, Clone)]
enum GateOp {
    GlobalX,
    LocalZ(usize),
    Cz(usize, usize),
}

fn gate_op_strategy() -> impl Strategy<Value = GateOp> {
    prop_oneof![
        Just(GateOp::GlobalX),
        (0..NUM_ATOMS).prop_map(GateOp::LocalZ),
        (0..NUM_ATOMS, 0..NUM_ATOMS)
            .prop_filter("distinct qubits", |(a, b)| a != b)
            .prop_map(|(a, b)| GateOp::Cz(a, b)),
    ]
}

fn to_instruction(op: &GateOp) -> Instruction {
    match op {
        GateOp::GlobalX => Instruction::single_qubit_gate(StandardGate::X, QubitId(0)),
        GateOp::LocalZ(q) => Instruction::single_qubit_gate(StandardGate::Z, QubitId(*q as u32)),
        GateOp::Cz(a, b) => {
            Instruction::two_qubit_gate(StandardGate::CZ, QubitId(*a as u32), QubitId(*b as u32))
        }
    }
}

proptest! {
    /// P5 (DAG completion, observed through `Mapper::map`'s own
    /// all-executed assertion): any stream drawn from the realisable gate
    /// set maps successfully -- `map` returns `Err(InvariantViolation)`
    /// exactly when the DAG fails to drain, so a consistent `Ok` across
    /// arbitrary streams is evidence the executable set always empties.
    #[test]
    fn p5_dag_always_completes(ops in prop::collection::vec(gate_op_strategy(), 0..12)) {
        let geometry = geometry();
        let mapper = Mapper::new(&geometry, MapperConfig::default());
        let instrs: Vec<Instruction> = ops.iter().map(to_instruction).collect();
        let layout: Vec<SiteId> = (0..NUM_ATOMS).map(SiteId).collect();
        prop_assert!(mapper.map(instrs, layout).is_ok());
    }

    /// P3 (spacing): in every emitted shuttling batch, any two endpoints
    /// on the same row are at least `min_atom_distance` apart in x.
    #[test]
    fn p3_spacing_within_batches(ops in prop::collection::vec(gate_op_strategy(), 0..12)) {
        let geometry = geometry();
        let d = geometry.min_atom_distance();
        let mapper = Mapper::new(&geometry, MapperConfig::default());
        let instrs: Vec<Instruction> = ops.iter().map(to_instruction).collect();
        let layout: Vec<SiteId> = (0..NUM_ATOMS).map(SiteId).collect();
        let out = mapper.map(instrs, layout).unwrap();

        for op in &out.operations {
            if let Operation::Shuttling { start, end, .. } = op {
                for endpoints in [start, end] {
                    for i in 0..endpoints.len() {
                        for j in (i + 1)..endpoints.len() {
                            if endpoints[i].y == endpoints[j].y {
                                prop_assert!((endpoints[i].x - endpoints[j].x).abs() >= d);
                            }
                        }
                    }
                }
            }
        }
    }

    /// P4 (CZ realisation): the number of emitted global CZ pulses never
    /// exceeds the number of CZ gates in the input -- the mapper never
    /// fires more entangling pulses than the circuit asked for.
    #[test]
    fn p4_cz_pulses_bounded_by_input(ops in prop::collection::vec(gate_op_strategy(), 0..12)) {
        let geometry = geometry();
        let mapper = Mapper::new(&geometry, MapperConfig::default());
        let num_cz = ops.iter().filter(|o| matches!(o, GateOp::Cz(..))).count();
        let instrs: Vec<Instruction> = ops.iter().map(to_instruction).collect();
        let layout: Vec<SiteId> = (0..NUM_ATOMS).map(SiteId).collect();
        let out = mapper.map(instrs, layout).unwrap();

        let cz_pulses = out
            .operations
            .iter()
            .filter(|op| matches!(op, Operation::Global { gate } if gate.name() == "cz"))
            .count();
        prop_assert!(cz_pulses <= num_cz);
    }

    /// P7 (postprocessor idempotence on non-MOVE ops): a stream containing
    /// no MOVE operations passes through `postprocess::decompose_moves`
    /// byte-for-byte (length-for-length, since `Operation` carries no
    /// `PartialEq`).
    #[test]
    fn p7_non_move_ops_pass_through(ops in prop::collection::vec(gate_op_strategy(), 0..12)) {
        let geometry = geometry();
        let mapper = Mapper::new(&geometry, MapperConfig::default());
        let instrs: Vec<Instruction> = ops.iter().map(to_instruction).collect();
        let layout: Vec<SiteId> = (0..NUM_ATOMS).map(SiteId).collect();
        let out = mapper.map(instrs, layout).unwrap();

        let non_move: Vec<Operation> = out
            .operations
            .iter()
            .filter(|op| !matches!(op, Operation::Shuttling { kind: ShuttlingKind::Move, .. }))
            .cloned()
            .collect();
        let decomposed = napp_core::postprocess::decompose_moves(&non_move, &geometry, &out.initial_positions);
        prop_assert_eq!(decomposed.len(), non_move.len());
    }

    /// P8 (patch expansion): for an `(R, C)` patch, every operation's
    /// endpoint vectors grow by exactly a factor `R*C`.
    #[test]
    fn p8_patch_expansion_factor(
        ops in prop::collection::vec(gate_op_strategy(), 0..8),
        rows in 1u32..4,
        cols in 1u32..4,
    ) {
        let geometry = geometry();
        let mapper = Mapper::new(&geometry, MapperConfig::default());
        let instrs: Vec<Instruction> = ops.iter().map(to_instruction).collect();
        let layout: Vec<SiteId> = (0..NUM_ATOMS).map(SiteId).collect();
        let raw = mapper.map(instrs, layout).unwrap().operations;

        let config = MapperConfig { patch_rows: rows, patch_cols: cols, ..MapperConfig::default() };
        let expanded = napp_core::postprocess::expand_patches(&raw, &geometry, &config);
        prop_assert_eq!(expanded.len(), raw.len() * (rows * cols) as usize);
    }
}
