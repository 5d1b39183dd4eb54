//! Built-in compilation passes.

pub mod target;

pub use target::NeutralAtomMapping;
