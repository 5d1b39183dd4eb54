//! Pass wrapping the neutral-atom mapping/scheduling engine.
//!
//! Converts the DAG's topological instruction stream into the flat
//! `Vec<Instruction>` the mapper expects, runs it against a fixed
//! [`Geometry`], and stores the resulting [`MapperOutput`] in the
//! `PropertySet` for any downstream pass (or the caller) to consume.

use napp_core::geometry::SiteId;
use napp_core::{Geometry, MapError, Mapper, MapperConfig, MapperOutput};
use napp_ir::CircuitDag;

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Runs the neutral-atom placer/shuttler against a fixed target geometry.
pub struct NeutralAtomMapping {
    geometry: Geometry,
    config: MapperConfig,
}

impl NeutralAtomMapping {
    /// Create a new mapping pass targeting `geometry` with `config`.
    pub fn new(geometry: Geometry, config: MapperConfig) -> Self {
        Self { geometry, config }
    }
}

impl Pass for NeutralAtomMapping {
    fn name(&self) -> &str {
        "NeutralAtomMapping"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let instructions: Vec<_> = dag
            .topological_ops()
            .map(|(_, instruction)| instruction.clone())
            .collect();

        let num_qubits = dag.num_qubits();
        if num_qubits > self.geometry.num_sites() {
            return Err(MapError::ArchitectureMismatch(format!(
                "circuit has {num_qubits} qubits but geometry has only {} sites",
                self.geometry.num_sites()
            ))
            .into());
        }
        let initial_layout: Vec<SiteId> = self
            .geometry
            .sites()
            .take(num_qubits)
            .map(|site| site.id)
            .collect();

        let mapper = Mapper::new(&self.geometry, self.config);
        let output: MapperOutput = mapper.map(instructions, initial_layout)?;

        properties.insert(output);

        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.get::<MapperOutput>().is_none()
    }
}
