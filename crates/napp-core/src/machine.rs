//! JSON-serializable machine description: the external interface through
//! which a geometry is loaded, independent of any in-memory [`Geometry`]
//! representation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{MapError, MapResult};
use crate::geometry::{Geometry, Point, Site, SiteId, Zone, ZoneId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub name: String,
    pub interaction_capable: bool,
    #[serde(default)]
    pub local_gates: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSpec {
    pub zone: usize,
    pub row: u32,
    pub col: u32,
    pub x: i64,
    pub y: i64,
}

/// Wire format for a machine description (trap geometry plus the global
/// physical constants the mapper needs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineDescription {
    pub zones: Vec<ZoneSpec>,
    pub sites: Vec<SiteSpec>,
    pub interaction_zone: usize,
    pub interaction_radius: f64,
    pub no_interaction_radius: f64,
    pub min_atom_distance: i64,
    #[serde(default)]
    pub global_gates: Vec<String>,
}

impl MachineDescription {
    /// Validates and lowers this description into an immutable [`Geometry`].
    pub fn into_geometry(self) -> MapResult<Geometry> {
        if self.interaction_zone >= self.zones.len() {
            return Err(MapError::InvalidMachine(format!(
                "interaction_zone index {} out of range ({} zones)",
                self.interaction_zone,
                self.zones.len()
            )));
        }

        let zones: Vec<Zone> = self
            .zones
            .iter()
            .enumerate()
            .map(|(i, z)| Zone {
                id: ZoneId(i),
                name: z.name.clone(),
                interaction_capable: z.interaction_capable,
                local_gates: z.local_gates.clone(),
            })
            .collect();

        let mut seen_positions = HashSet::new();
        let mut sites = Vec::with_capacity(self.sites.len());
        for (i, s) in self.sites.iter().enumerate() {
            if s.zone >= zones.len() {
                return Err(MapError::InvalidMachine(format!(
                    "site {i} references out-of-range zone {}",
                    s.zone
                )));
            }
            if !seen_positions.insert((s.x, s.y)) {
                return Err(MapError::InvalidMachine(format!(
                    "duplicate site position ({}, {})",
                    s.x, s.y
                )));
            }
            sites.push(Site {
                id: SiteId(i),
                zone: ZoneId(s.zone),
                row: s.row,
                col: s.col,
                position: Point::new(s.x, s.y),
            });
        }

        Ok(Geometry::new(
            zones,
            sites,
            ZoneId(self.interaction_zone),
            self.interaction_radius,
            self.no_interaction_radius,
            self.min_atom_distance,
            self.global_gates,
        ))
    }
}
