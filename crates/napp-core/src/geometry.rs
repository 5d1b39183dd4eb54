//! Static description of the machine's trap-site grid.
//!
//! A [`Geometry`] is immutable once built: it describes every trap site,
//! groups them into [`Zone`]s, and answers the directional and radius
//! queries the placer needs (nearest free neighbour, rows of a zone,
//! which sites lie within the interaction radius of a given site).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer 2D coordinate of a trap site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        dx.hypot(dy)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Dense index of a [`Site`] within a [`Geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiteId(pub usize);

/// Dense index of a [`Zone`] within a [`Geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(pub usize);

/// A cardinal direction used by directional nearest-site queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// An immutable trap, belonging to exactly one zone and one `(row, col)`
/// within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub zone: ZoneId,
    pub row: u32,
    pub col: u32,
    pub position: Point,
}

/// A named rectangular region of the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    /// Whether this zone can host the entangling (CZ) pulse.
    pub interaction_capable: bool,
    /// Gate kinds (by name, see [`napp_ir::gate::StandardGate::name`]) that
    /// may be fired as a *local* pulse while an atom sits in this zone.
    pub local_gates: Vec<String>,
}

impl Zone {
    pub fn allows_local(&self, gate_name: &str) -> bool {
        self.local_gates.iter().any(|g| g == gate_name)
    }
}

/// Static, immutable description of the machine's trap-site grid.
#[derive(Debug, Clone)]
pub struct Geometry {
    sites: Vec<Site>,
    zones: Vec<Zone>,
    interaction_zone: ZoneId,
    interaction_radius: f64,
    no_interaction_radius: f64,
    min_atom_distance: i64,
    /// Gate kinds that may be fired as a *global* pulse (every atom of the
    /// implied zone simultaneously), regardless of the zone's local list.
    global_gates: Vec<String>,
    rows_by_zone: FxHashMap<ZoneId, Vec<u32>>,
    sites_by_zone_row: FxHashMap<(ZoneId, u32), Vec<SiteId>>,
    position_index: FxHashMap<(i64, i64), SiteId>,
}

impl Geometry {
    /// Build a geometry from its sites and zones. Sites must reference an
    /// existing zone id and no two sites may share a position.
    pub fn new(
        zones: Vec<Zone>,
        sites: Vec<Site>,
        interaction_zone: ZoneId,
        interaction_radius: f64,
        no_interaction_radius: f64,
        min_atom_distance: i64,
        global_gates: Vec<String>,
    ) -> Self {
        let mut rows_by_zone: FxHashMap<ZoneId, Vec<u32>> = FxHashMap::default();
        let mut sites_by_zone_row: FxHashMap<(ZoneId, u32), Vec<SiteId>> = FxHashMap::default();
        let mut position_index = FxHashMap::default();

        for site in &sites {
            rows_by_zone.entry(site.zone).or_default().push(site.row);
            sites_by_zone_row
                .entry((site.zone, site.row))
                .or_default()
                .push(site.id);
            position_index.insert((site.position.x, site.position.y), site.id);
        }
        for rows in rows_by_zone.values_mut() {
            rows.sort_unstable();
            rows.dedup();
        }
        for row_sites in sites_by_zone_row.values_mut() {
            row_sites.sort_by_key(|s| sites[s.0].position.x);
        }

        Self {
            sites,
            zones,
            interaction_zone,
            interaction_radius,
            no_interaction_radius,
            min_atom_distance,
            global_gates,
            rows_by_zone,
            sites_by_zone_row,
            position_index,
        }
    }

    pub fn site(&self, id: SiteId) -> &Site {
        &self.sites[id.0]
    }

    pub fn zone(&self, id: ZoneId) -> &Zone {
        &self.zones[id.0]
    }

    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn sites(&self) -> impl Iterator<Item = &Site> {
        self.sites.iter()
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    pub fn interaction_zone(&self) -> ZoneId {
        self.interaction_zone
    }

    pub fn interaction_radius(&self) -> f64 {
        self.interaction_radius
    }

    pub fn no_interaction_radius(&self) -> f64 {
        self.no_interaction_radius
    }

    pub fn min_atom_distance(&self) -> i64 {
        self.min_atom_distance
    }

    pub fn storage_zones(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.zones
            .iter()
            .filter(|z| !z.interaction_capable)
            .map(|z| z.id)
    }

    pub fn is_global_gate(&self, name: &str) -> bool {
        self.global_gates.iter().any(|g| g == name)
    }

    pub fn site_at(&self, p: Point) -> Option<SiteId> {
        self.position_index.get(&(p.x, p.y)).copied()
    }

    /// Sorted row indices present in a zone.
    pub fn rows_in_zone(&self, zone: ZoneId) -> &[u32] {
        self.rows_by_zone.get(&zone).map_or(&[], |v| v.as_slice())
    }

    /// Sites of a zone's row, sorted ascending by x.
    pub fn row_sites(&self, zone: ZoneId, row: u32) -> &[SiteId] {
        self.sites_by_zone_row
            .get(&(zone, row))
            .map_or(&[], |v| v.as_slice())
    }

    /// The nearest site strictly to the left of `p` in the same row
    /// (`strict = true` requires `x < p.x`; `strict = false` allows `x <= p.x`).
    pub fn nearest_site_left(&self, p: Point, strict: bool) -> Option<SiteId> {
        self.sites
            .iter()
            .filter(|s| s.position.y == p.y && if strict { s.position.x < p.x } else { s.position.x <= p.x })
            .max_by_key(|s| s.position.x)
            .map(|s| s.id)
    }

    pub fn nearest_site_right(&self, p: Point, strict: bool) -> Option<SiteId> {
        self.sites
            .iter()
            .filter(|s| s.position.y == p.y && if strict { s.position.x > p.x } else { s.position.x >= p.x })
            .min_by_key(|s| s.position.x)
            .map(|s| s.id)
    }

    pub fn nearest_site_up(&self, p: Point, strict: bool) -> Option<SiteId> {
        self.sites
            .iter()
            .filter(|s| s.position.x == p.x && if strict { s.position.y < p.y } else { s.position.y <= p.y })
            .max_by_key(|s| s.position.y)
            .map(|s| s.id)
    }

    pub fn nearest_site_down(&self, p: Point, strict: bool) -> Option<SiteId> {
        self.sites
            .iter()
            .filter(|s| s.position.x == p.x && if strict { s.position.y > p.y } else { s.position.y >= p.y })
            .min_by_key(|s| s.position.y)
            .map(|s| s.id)
    }

    pub fn nearest_site(&self, p: Point, direction: Direction, strict: bool) -> Option<SiteId> {
        match direction {
            Direction::Left => self.nearest_site_left(p, strict),
            Direction::Right => self.nearest_site_right(p, strict),
            Direction::Up => self.nearest_site_up(p, strict),
            Direction::Down => self.nearest_site_down(p, strict),
        }
    }

    /// Sites whose position lies within the interaction radius of `site`
    /// (excluding `site` itself).
    pub fn sites_within_interaction_radius(&self, site: SiteId) -> Vec<SiteId> {
        let p = self.site(site).position;
        self.sites
            .iter()
            .filter(|s| s.id != site && p.distance(&s.position) < self.interaction_radius)
            .map(|s| s.id)
            .collect()
    }
}
