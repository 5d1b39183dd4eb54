//! Bidirectional mapping between hardware qubits and trap sites, plus the
//! cached swap-distance and nearby-qubit structures used by the pickup
//! heuristics.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::error::{MapError, MapResult};
use crate::geometry::{Direction, Geometry, SiteId};

/// Dense index of a hardware qubit (one per circuit qubit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HwQubit(pub usize);

/// A coordinate is just the index of the [`Site`](crate::geometry::Site) an
/// atom currently occupies.
pub type CoordIndex = SiteId;

/// Tracks where every hardware qubit currently sits, the swap-distance
/// memo between every pair, and each qubit's within-radius neighbours.
///
/// `nearbyQubits` is computed once from the *initial* layout and is never
/// recomputed after a [`move_to`](Self::move_to) — it is a coarse, cheap
/// approximation consumed only by the (optional) lookahead heuristic, not
/// by the placer's correctness-critical path. The swap-distance memo is
/// still cleared wholesale on every move for safety, even though with a
/// frozen neighbour graph the recomputed values are unchanged.
#[derive(Debug, Clone)]
pub struct HardwareQubits {
    hw_to_coord: Vec<CoordIndex>,
    coord_to_hw: FxHashMap<CoordIndex, HwQubit>,
    swap_distances: Vec<i64>,
    nearby_qubits: Vec<Vec<HwQubit>>,
    initial_hw_to_coord: Vec<CoordIndex>,
    n: usize,
}

impl HardwareQubits {
    /// Build hardware qubits from an initial, injective hw→coordinate
    /// assignment.
    pub fn new(geometry: &Geometry, initial_hw_to_coord: Vec<CoordIndex>) -> Self {
        let n = initial_hw_to_coord.len();
        let mut coord_to_hw = FxHashMap::default();
        for (hw, &coord) in initial_hw_to_coord.iter().enumerate() {
            coord_to_hw.insert(coord, HwQubit(hw));
        }

        let mut nearby_qubits = vec![Vec::new(); n];
        for (hw, &coord) in initial_hw_to_coord.iter().enumerate() {
            let mut nearby = vec![];
            for neighbour_site in geometry.sites_within_interaction_radius(coord) {
                if let Some(&other_hw) = coord_to_hw.get(&neighbour_site) {
                    nearby.push(other_hw);
                }
            }
            nearby_qubits[hw] = nearby;
        }

        Self {
            hw_to_coord: initial_hw_to_coord.clone(),
            coord_to_hw,
            swap_distances: vec![-1; n * n],
            nearby_qubits,
            initial_hw_to_coord,
            n,
        }
    }

    fn idx(&self, a: HwQubit, b: HwQubit) -> usize {
        a.0 * self.n + b.0
    }

    pub fn num_qubits(&self) -> usize {
        self.n
    }

    pub fn is_mapped(&self, coord: CoordIndex) -> bool {
        self.coord_to_hw.contains_key(&coord)
    }

    pub fn coord_of(&self, hw: HwQubit) -> CoordIndex {
        self.hw_to_coord[hw.0]
    }

    pub fn initial_coord_of(&self, hw: HwQubit) -> CoordIndex {
        self.initial_hw_to_coord[hw.0]
    }

    pub fn get_hw_qubit(&self, coord: CoordIndex) -> MapResult<HwQubit> {
        self.coord_to_hw
            .get(&coord)
            .copied()
            .ok_or_else(|| MapError::CoordinateEmpty(format!("no hardware qubit at coordinate {coord:?}")))
    }

    /// Moves a hardware qubit to a new coordinate. Fails if the coordinate
    /// is already occupied. Clears the entire swap-distance memo.
    pub fn move_to(&mut self, hw: HwQubit, new_coord: CoordIndex) -> MapResult<()> {
        if self.is_mapped(new_coord) {
            return Err(MapError::CoordinateOccupied(new_coord));
        }
        let old_coord = self.hw_to_coord[hw.0];
        self.coord_to_hw.remove(&old_coord);
        self.coord_to_hw.insert(new_coord, hw);
        self.hw_to_coord[hw.0] = new_coord;
        self.swap_distances.fill(-1);
        Ok(())
    }

    pub fn nearby_qubits(&self, q: HwQubit) -> &[HwQubit] {
        &self.nearby_qubits[q.0]
    }

    /// All `(q, q')` pairs for `q' ∈ nearbyQubits(q)`.
    pub fn nearby_swaps(&self, q: HwQubit) -> Vec<(HwQubit, HwQubit)> {
        self.nearby_qubits(q).iter().map(|&other| (q, other)).collect()
    }

    /// Swap distance between two hardware qubits: 0 if equal, otherwise a
    /// BFS over the `nearbyQubits` graph, filling the memo for every
    /// qubit discovered along the way. `close_by = false` adds one
    /// (landing adjacent to `b` rather than on its site).
    pub fn swap_distance(&mut self, a: HwQubit, b: HwQubit, close_by: bool) -> i64 {
        if a == b {
            return 0;
        }
        if self.swap_distances[self.idx(a, b)] < 0 {
            self.compute_swap_distance(a);
        }
        let base = self.swap_distances[self.idx(a, b)];
        if close_by { base } else { base + 1 }
    }

    fn compute_swap_distance(&mut self, from: HwQubit) {
        let mut queue = VecDeque::new();
        let fi = self.idx(from, from);
        self.swap_distances[fi] = 0;
        queue.push_back(from);
        while let Some(current) = queue.pop_front() {
            let dist = self.swap_distances[self.idx(from, current)];
            for &next in self.nearby_qubits(current).to_vec().iter() {
                let ni = self.idx(from, next);
                if self.swap_distances[ni] < 0 {
                    self.swap_distances[ni] = dist + 1;
                    queue.push_back(next);
                }
            }
        }
    }

    /// Minimum, over the free coordinates near `idx`, of the swap distance
    /// from `target` to that coordinate. `f64::INFINITY` if none are free.
    pub fn swap_distance_move(
        &mut self,
        geometry: &Geometry,
        idx: CoordIndex,
        target: HwQubit,
        free: &[bool],
    ) -> f64 {
        let mut best = f64::INFINITY;
        for neighbour in geometry.sites_within_interaction_radius(idx) {
            if !free[neighbour.0] {
                continue;
            }
            if let Ok(neighbour_hw) = self.get_hw_qubit(neighbour) {
                let d = self.swap_distance(target, neighbour_hw, true) as f64;
                best = best.min(d);
            } else {
                best = best.min(0.0);
            }
        }
        best
    }

    /// BFS over site neighbours restricted to the half-plane implied by
    /// `direction`, skipping `excluded` and occupied sites. Returns the
    /// path of coordinates to the first free site found (empty if none).
    pub fn find_closest_free_coord(
        &self,
        geometry: &Geometry,
        qubit: HwQubit,
        direction: Direction,
        excluded: &[CoordIndex],
        free: &[bool],
    ) -> Vec<CoordIndex> {
        let start = self.coord_of(qubit);
        let mut visited = vec![false; geometry.num_sites()];
        visited[start.0] = true;
        let mut parent: FxHashMap<CoordIndex, CoordIndex> = FxHashMap::default();
        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if current != start && free[current.0] && !excluded.contains(&current) {
                let mut path = vec![current];
                let mut node = current;
                while let Some(&p) = parent.get(&node) {
                    path.push(p);
                    node = p;
                }
                path.reverse();
                return path;
            }
            let here = geometry.site(current).position;
            if let Some(next) = geometry.nearest_site(here, direction, true) {
                if !visited[next.0] {
                    visited[next.0] = true;
                    parent.insert(next, current);
                    queue.push_back(next);
                }
            }
        }
        vec![]
    }

    /// `S` plus every hardware qubit whose interaction disc intersects the
    /// disc of some member of `S`.
    pub fn blocked_qubits(&self, s: &[HwQubit]) -> Vec<HwQubit> {
        let mut blocked: Vec<HwQubit> = s.to_vec();
        for &q in s {
            for &nearby in self.nearby_qubits(q) {
                if !blocked.contains(&nearby) {
                    blocked.push(nearby);
                }
            }
        }
        blocked
    }

    pub fn initial_hw_to_coord(&self) -> &[CoordIndex] {
        &self.initial_hw_to_coord
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Zone, ZoneId, Site};

    fn line_geometry(n: usize, spacing: i64) -> Geometry {
        let zone = Zone {
            id: ZoneId(0),
            name: "storage".into(),
            interaction_capable: false,
            local_gates: vec![],
        };
        let sites = (0..n)
            .map(|i| Site {
                id: SiteId(i),
                zone: ZoneId(0),
                row: 0,
                col: i as u32,
                position: Point::new(i as i64 * spacing, 0),
            })
            .collect();
        Geometry::new(vec![zone], sites, ZoneId(0), (spacing as f64) + 1.0, spacing as f64 * 2.0, 1, vec![])
    }

    #[test]
    fn swap_distance_adjacent_and_self() {
        let geo = line_geometry(4, 10);
        let initial = (0..4).map(SiteId).collect();
        let mut hw = HardwareQubits::new(&geo, initial);

        assert_eq!(hw.swap_distance(HwQubit(0), HwQubit(0), true), 0);
        assert_eq!(hw.swap_distance(HwQubit(0), HwQubit(1), true), 1);
        assert_eq!(hw.swap_distance(HwQubit(0), HwQubit(3), true), 3);
        // symmetry
        assert_eq!(hw.swap_distance(HwQubit(3), HwQubit(0), true), 3);
    }

    #[test]
    fn move_updates_bijection_and_clears_cache() {
        let geo = line_geometry(5, 10);
        let initial = (0..4).map(SiteId).collect();
        let mut hw = HardwareQubits::new(&geo, initial);
        assert_eq!(hw.swap_distance(HwQubit(0), HwQubit(3), true), 3);

        hw.move_to(HwQubit(0), SiteId(4)).unwrap();
        assert_eq!(hw.coord_of(HwQubit(0)), SiteId(4));
        assert!(!hw.is_mapped(SiteId(0)));
        assert_eq!(hw.get_hw_qubit(SiteId(4)).unwrap(), HwQubit(0));
    }

    #[test]
    fn move_to_occupied_fails() {
        let geo = line_geometry(4, 10);
        let initial = (0..4).map(SiteId).collect();
        let mut hw = HardwareQubits::new(&geo, initial);
        assert!(hw.move_to(HwQubit(0), SiteId(1)).is_err());
    }
}
