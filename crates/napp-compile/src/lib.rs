//! Napp Compilation Framework
//!
//! This crate provides the compilation infrastructure for transforming
//! gate-level quantum circuits into operation streams for neutral-atom
//! hardware. It implements a pass-based architecture similar to LLVM,
//! enabling modular and extensible compilation.
//!
//! # Overview
//!
//! A circuit DAG is compiled by running it through a series of passes
//! managed by a [`PassManager`]. Each pass may read and write a shared
//! [`PropertySet`] to communicate with later passes. The one built-in
//! target pass, [`passes::NeutralAtomMapping`], wraps `napp-core`'s
//! placer/shuttler engine: it flattens the DAG into a gate stream, maps it
//! onto a fixed `napp_core::Geometry`, and stores the resulting
//! `napp_core::MapperOutput` (operation stream, final mapping, initial
//! atom positions) in the `PropertySet`.
//!
//! # Architecture
//!
//! ```text
//! Input Circuit (CircuitDag)
//!       |
//!       v
//! +-------------+
//! | PassManager | <-- PropertySet (mapper output, custom analyses)
//! +-------------+
//!       |
//!       +-- NeutralAtomMapping (placer/shuttler against a fixed Geometry)
//!       |
//!       v
//! MapperOutput (operation stream for the target machine)
//! ```
//!
//! # Example: Basic Compilation
//!
//! ```rust
//! use napp_compile::PassManagerBuilder;
//! use napp_core::{Geometry, MapperConfig};
//! use napp_core::geometry::{Point, Site, SiteId, Zone, ZoneId};
//! use napp_ir::{Circuit, QubitId};
//!
//! let zones = vec![
//!     Zone { id: ZoneId(0), name: "storage".into(), interaction_capable: false, local_gates: vec![] },
//!     Zone { id: ZoneId(1), name: "interaction".into(), interaction_capable: true, local_gates: vec![] },
//! ];
//! let sites = vec![
//!     Site { id: SiteId(0), zone: ZoneId(0), row: 0, col: 0, position: Point::new(0, 0) },
//!     Site { id: SiteId(1), zone: ZoneId(0), row: 0, col: 1, position: Point::new(5, 0) },
//!     Site { id: SiteId(2), zone: ZoneId(1), row: 0, col: 0, position: Point::new(0, 12) },
//!     Site { id: SiteId(3), zone: ZoneId(1), row: 0, col: 1, position: Point::new(5, 12) },
//! ];
//! let geometry = Geometry::new(zones, sites, ZoneId(1), 12.0, 20.0, 1, vec!["x".into()]);
//!
//! let mut circuit = Circuit::with_size("bell", 2, 0);
//! circuit.cz(QubitId(0), QubitId(1)).unwrap();
//! let mut dag = circuit.into_dag();
//!
//! let (pm, mut props) = PassManagerBuilder::new()
//!     .with_target(geometry, MapperConfig::default())
//!     .build();
//! pm.run(&mut dag, &mut props).unwrap();
//! ```
//!
//! # Custom Passes
//!
//! Implement the [`Pass`] trait to create custom compilation passes:
//!
//! ```rust
//! use napp_compile::{Pass, PassKind, CompileResult, PropertySet};
//! use napp_ir::CircuitDag;
//!
//! struct MyCustomPass;
//!
//! impl Pass for MyCustomPass {
//!     fn name(&self) -> &str { "my_custom_pass" }
//!     fn kind(&self) -> PassKind { PassKind::Transformation }
//!
//!     fn run(&self, dag: &mut CircuitDag, props: &mut PropertySet) -> CompileResult<()> {
//!         // Your pass logic here
//!         Ok(())
//!     }
//! }
//! ```

pub mod error;
pub mod manager;
pub mod pass;
pub mod property;

// Built-in passes
pub mod passes;

pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{AnalysisPass, Pass, PassKind, TransformationPass};
pub use passes::NeutralAtomMapping;
pub use property::PropertySet;
