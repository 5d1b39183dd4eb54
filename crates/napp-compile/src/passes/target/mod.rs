//! Target-specific compilation passes.
//!
//! These passes require a fixed target [`napp_core::Geometry`] and produce
//! a neutral-atom operation stream for that geometry.

pub mod neutral_atom_mapping;

pub use neutral_atom_mapping::NeutralAtomMapping;
