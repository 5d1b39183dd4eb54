//! Top-level entry point: compiles a gate-level instruction stream into
//! the neutral-atom operation stream.

use tracing::{debug, instrument};

use napp_ir::instruction::{Instruction, InstructionKind};

use crate::config::MapperConfig;
use crate::error::{MapError, MapResult};
use crate::geometry::{Geometry, Point, SiteId, ZoneId};
use crate::hardware::HardwareQubits;
use crate::layer::Layer;
use crate::mapping::Mapping;
use crate::operation::Operation;
use crate::placer::Placer;
use crate::postprocess;

/// Result of mapping one circuit onto one geometry.
#[derive(Debug, Clone)]
pub struct MapperOutput {
    pub operations: Vec<Operation>,
    pub mapping: Mapping,
    pub initial_positions: Vec<Point>,
}

/// Validates the instruction stream before the Layer/DAG is built.
///
/// Grounded on the original mapper's `preprocess()`: rejects operations
/// whose qubit count exceeds two as [`MapError::UnsupportedGate`],
/// rejects non-CZ two-qubit gates the same way (the interaction engine
/// only has a realisation strategy for CZ), and rejects single-qubit
/// gates the geometry permits in neither a local nor a global zone as
/// [`MapError::ArchitectureMismatch`].
fn preprocess(instructions: &[Instruction], geometry: &Geometry) -> MapResult<()> {
    for instruction in instructions {
        let InstructionKind::Gate(gate) = &instruction.kind else {
            continue;
        };
        let name = gate.name();
        let num_qubits = instruction.qubits.len();

        if num_qubits > 2 {
            return Err(MapError::UnsupportedGate(format!(
                "gate {name} acts on {num_qubits} qubits; only one- and two-qubit gates are supported"
            )));
        }

        if num_qubits == 2 {
            if name != "cz" {
                return Err(MapError::UnsupportedGate(format!(
                    "two-qubit gate {name} has no realisation strategy; only cz is supported"
                )));
            }
            continue;
        }

        let locally_allowed = geometry.zones().any(|z| z.allows_local(name));
        if !geometry.is_global_gate(name) && !locally_allowed {
            return Err(MapError::ArchitectureMismatch(format!(
                "gate {name} is permitted neither locally nor globally by the target geometry"
            )));
        }
    }
    Ok(())
}

/// Compiles gate-level circuits for a fixed target [`Geometry`].
pub struct Mapper<'g> {
    geometry: &'g Geometry,
    config: MapperConfig,
}

impl<'g> Mapper<'g> {
    pub fn new(geometry: &'g Geometry, config: MapperConfig) -> Self {
        Self { geometry, config }
    }

    /// Maps `instructions` (a flat gate stream over `num_qubits` circuit
    /// qubits) onto an initial hardware layout `initial_hw_to_coord`,
    /// returning the full operation stream plus the final mapping and the
    /// frozen initial atom positions.
    #[instrument(skip(self, instructions))]
    pub fn map(
        &self,
        instructions: Vec<Instruction>,
        initial_hw_to_coord: Vec<SiteId>,
    ) -> MapResult<MapperOutput> {
        let num_qubits = initial_hw_to_coord.len();
        if num_qubits > self.geometry.num_sites() {
            return Err(MapError::ArchitectureMismatch(format!(
                "{num_qubits} qubits requested but geometry has only {} sites",
                self.geometry.num_sites()
            )));
        }
        preprocess(&instructions, self.geometry)?;

        let mut layer = Layer::build(instructions);
        let mut mapping = Mapping::identity(num_qubits);
        let mut hardware = HardwareQubits::new(self.geometry, initial_hw_to_coord);

        let all_zones: Vec<ZoneId> = self.geometry.zones().map(|z| z.id).collect();
        let initial_zones = vec![all_zones; num_qubits];
        let mut placer = Placer::new(self.geometry, initial_zones);

        let raw_ops = placer.run(&mut layer, &mut mapping, &mut hardware)?;

        if !layer.all_executed() {
            return Err(MapError::InvariantViolation(
                "placer terminated with unexecuted DAG vertices remaining".into(),
            ));
        }
        debug!(operations = raw_ops.len(), "placer produced raw operation stream");

        let initial_positions = placer.initial_positions();
        let operations = postprocess::run(&raw_ops, self.geometry, &self.config, &initial_positions);

        Ok(MapperOutput {
            operations,
            mapping,
            initial_positions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Site, Zone};
    use napp_ir::gate::{Gate, StandardGate};
    use napp_ir::qubit::QubitId;

    fn geo() -> Geometry {
        let storage = Zone {
            id: ZoneId(0),
            name: "storage".into(),
            interaction_capable: false,
            local_gates: vec!["rz".into()],
        };
        let interaction = Zone {
            id: ZoneId(1),
            name: "interaction".into(),
            interaction_capable: true,
            local_gates: vec![],
        };
        let sites = vec![
            Site { id: SiteId(0), zone: ZoneId(0), row: 0, col: 0, position: Point::new(0, 0) },
            Site { id: SiteId(1), zone: ZoneId(0), row: 0, col: 1, position: Point::new(10, 0) },
            Site { id: SiteId(2), zone: ZoneId(1), row: 0, col: 0, position: Point::new(0, 100) },
            Site { id: SiteId(3), zone: ZoneId(1), row: 0, col: 1, position: Point::new(10, 100) },
        ];
        Geometry::new(vec![storage, interaction], sites, ZoneId(1), 12.0, 20.0, 1, vec!["x".into()])
    }

    #[test]
    fn empty_circuit_maps_to_empty_stream() {
        let geometry = geo();
        let mapper = Mapper::new(&geometry, MapperConfig::default());
        let out = mapper.map(vec![], vec![SiteId(0), SiteId(1)]).unwrap();
        assert!(out.operations.is_empty());
    }

    #[test]
    fn single_cz_realises_a_full_shuttle_sequence() {
        let geometry = geo();
        let mapper = Mapper::new(&geometry, MapperConfig::default());
        let instrs = vec![Instruction::gate(
            Gate::standard(StandardGate::CZ),
            [QubitId(0), QubitId(1)],
        )];
        let out = mapper.map(instrs, vec![SiteId(0), SiteId(1)]).unwrap();

        let has_load = out.operations.iter().any(|o| matches!(o, Operation::Shuttling { kind: crate::operation::ShuttlingKind::Load, .. }));
        let has_global_cz = out
            .operations
            .iter()
            .any(|o| matches!(o, Operation::Global { gate } if gate.name() == "cz"));
        assert!(has_load);
        assert!(has_global_cz);
    }

    #[test]
    fn too_many_qubits_is_an_architecture_mismatch() {
        let geometry = geo();
        let mapper = Mapper::new(&geometry, MapperConfig::default());
        let coords = vec![SiteId(0), SiteId(1), SiteId(2), SiteId(3), SiteId(0)];
        // Deliberately longer than distinct sites to trigger the qubit-count check.
        let err = mapper.map(vec![], coords).unwrap_err();
        assert!(matches!(err, MapError::ArchitectureMismatch(_)));
    }

    #[test]
    fn non_cz_two_qubit_gate_is_unsupported() {
        let geometry = geo();
        let mapper = Mapper::new(&geometry, MapperConfig::default());
        let instrs = vec![Instruction::gate(
            Gate::standard(StandardGate::CX),
            [QubitId(0), QubitId(1)],
        )];
        let err = mapper.map(instrs, vec![SiteId(0), SiteId(1)]).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedGate(_)));
    }

    #[test]
    fn three_qubit_gate_is_unsupported() {
        let geometry = geo();
        let mapper = Mapper::new(&geometry, MapperConfig::default());
        let instrs = vec![Instruction::gate(
            Gate::standard(StandardGate::CCX),
            [QubitId(0), QubitId(1), QubitId(2)],
        )];
        let err = mapper
            .map(instrs, vec![SiteId(0), SiteId(1), SiteId(2)])
            .unwrap_err();
        assert!(matches!(err, MapError::UnsupportedGate(_)));
    }

    #[test]
    fn gate_unsupported_by_geometry_is_an_architecture_mismatch() {
        let geometry = geo();
        let mapper = Mapper::new(&geometry, MapperConfig::default());
        // `geo()` permits only "x" globally and "rz" locally; "y" is neither.
        let instrs = vec![Instruction::single_qubit_gate(StandardGate::Y, QubitId(0))];
        let err = mapper.map(instrs, vec![SiteId(0), SiteId(1)]).unwrap_err();
        assert!(matches!(err, MapError::ArchitectureMismatch(_)));
    }
}
