//! Runtime placement state of a single circuit qubit, tracked by the
//! placer as it decides where atoms sit in the trap grid.

use crate::error::{MapError, MapResult};
use crate::geometry::{Point, ZoneId};

/// Placement of one circuit qubit.
///
/// An atom starts `Undefined` with the full list of zones it is still
/// permitted to occupy and is promoted to `Defined` the first time it is
/// picked up (or, for atoms the main loop never touches, during the
/// post-loop cleanup pass). Once `Defined`, `initial` is frozen forever
/// and only `current` moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    Undefined { zones: Vec<ZoneId> },
    Defined {
        initial: Point,
        current: Point,
        zones: Vec<ZoneId>,
    },
}

impl Atom {
    pub fn undefined(zones: Vec<ZoneId>) -> Self {
        Self::Undefined { zones }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Defined { .. })
    }

    pub fn zones(&self) -> &[ZoneId] {
        match self {
            Self::Undefined { zones } | Self::Defined { zones, .. } => zones,
        }
    }

    pub fn current_position(&self) -> Option<Point> {
        match self {
            Self::Undefined { .. } => None,
            Self::Defined { current, .. } => Some(*current),
        }
    }

    pub fn initial_position(&self) -> Option<Point> {
        match self {
            Self::Undefined { .. } => None,
            Self::Defined { initial, .. } => Some(*initial),
        }
    }

    /// Narrows the permitted zone list to `allowed`. No-op once `Defined`
    /// (only the zones it started in still matter once its position is
    /// fixed — it either satisfies a local constraint at that exact
    /// position, or it doesn't).
    pub fn narrow_zones(&mut self, allowed: &[ZoneId]) {
        if let Self::Undefined { zones } = self {
            zones.retain(|z| allowed.contains(z));
        }
    }

    /// Promotes to `Defined` at `position`. Returns
    /// [`MapError::InvariantViolation`] if already defined — a bug in
    /// the placer, not a user-facing error (an atom is picked up /
    /// placed exactly once before its position is ever read back).
    pub fn define(&mut self, position: Point) -> MapResult<()> {
        match self {
            Self::Defined { .. } => Err(MapError::InvariantViolation(
                "atom already defined".into(),
            )),
            Self::Undefined { zones } => {
                *self = Self::Defined {
                    initial: position,
                    current: position,
                    zones: std::mem::take(zones),
                };
                Ok(())
            }
        }
    }

    /// Updates the current position of an already-`Defined` atom.
    pub fn move_to(&mut self, position: Point) {
        if let Self::Defined { current, .. } = self {
            *current = position;
        }
    }
}
