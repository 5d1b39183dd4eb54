//! `PropertySet`, the type-erased bag passes use to share data with each
//! other (mapping results, per-run statistics, anything a later pass
//! wants to read without the earlier pass needing to know about it).
//!
//! # Example
//!
//! ```
//! use napp_compile::PropertySet;
//!
//! #[derive(Debug, PartialEq)]
//! struct OptimizationStats {
//!     gates_removed: usize,
//! }
//!
//! let mut props = PropertySet::new();
//! props.insert(OptimizationStats { gates_removed: 3 });
//! assert_eq!(props.get::<OptimizationStats>(), Some(&OptimizationStats { gates_removed: 3 }));
//! ```

use std::any::{Any, TypeId};

use rustc_hash::FxHashMap;

/// Shared context passed through all compilation passes.
#[derive(Default)]
pub struct PropertySet {
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for PropertySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertySet")
            .field("custom_properties", &self.custom.len())
            .finish()
    }
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a custom property, replacing any existing value of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}
