//! The placer/shuttler: the core of the mapper. Drains directly
//! applicable gates, then alternates interaction batches with shuttling.

use rustc_hash::{FxHashMap, FxHashSet};

use napp_ir::gate::StandardGate;
use napp_ir::instruction::InstructionKind;

use crate::atom::Atom;
use crate::error::{MapError, MapResult};
use crate::geometry::{Geometry, Point, SiteId, ZoneId};
use crate::hardware::HardwareQubits;
use crate::interaction::{InteractionGraph, Sequence};
use crate::layer::Layer;
use crate::mapping::{CircQubit, Mapping};
use crate::operation::{Operation, ShuttlingKind};

/// Runtime placement state for every circuit qubit plus the free-space
/// ledgers and the set of atoms currently held by the movable grid.
pub struct Placer<'g> {
    geometry: &'g Geometry,
    placement: Vec<Atom>,
    initial_free: Vec<bool>,
    current_free: Vec<bool>,
    currently_shuttling: Vec<CircQubit>,
}

impl<'g> Placer<'g> {
    pub fn new(geometry: &'g Geometry, initial_zones: Vec<Vec<ZoneId>>) -> Self {
        let num_sites = geometry.num_sites();
        Self {
            geometry,
            placement: initial_zones.into_iter().map(Atom::undefined).collect(),
            initial_free: vec![true; num_sites],
            current_free: vec![true; num_sites],
            currently_shuttling: vec![],
        }
    }

    pub fn placement(&self) -> &[Atom] {
        &self.placement
    }

    /// Runs the main loop until the executable set is empty, returning
    /// the emitted operation stream.
    pub fn run(
        &mut self,
        layer: &mut Layer,
        mapping: &mut Mapping,
        hardware: &mut HardwareQubits,
    ) -> MapResult<Vec<Operation>> {
        let mut ops = vec![];

        while !layer.is_empty_executable_set() {
            self.drain_applicable(layer, &mut ops)?;
            if layer.is_empty_executable_set() {
                break;
            }

            let graph = InteractionGraph::construct(layer)?;
            let seq = graph.compute_sequence();

            self.pick_up_side(&seq.fixed, &mut ops)?;
            self.deposit_fixed(&seq.fixed, mapping, hardware, &mut ops)?;

            let frame0 = seq.moveable.first().cloned().unwrap_or_default();
            self.pick_up_side(&frame0, &mut ops)?;

            self.apply_timeframes(&seq, &graph, layer, &mut ops)?;
            self.return_to_storage(&seq, mapping, hardware, &mut ops)?;
        }

        self.finalize_undefined_atoms()?;
        Ok(ops)
    }

    /// Step 1: repeatedly execute directly-applicable one-qubit / global
    /// operations until none remain in the executable set.
    fn drain_applicable(&mut self, layer: &mut Layer, ops: &mut Vec<Operation>) -> MapResult<()> {
        loop {
            let candidates = layer.executable_set();
            let mut chosen = None;

            for &id in &candidates {
                let v = layer.vertex(id);
                if v.num_targets() != 1 {
                    continue;
                }
                let InstructionKind::Gate(gate) = &v.instruction.kind else {
                    continue;
                };
                let name = gate.name().to_string();
                if self.geometry.is_global_gate(&name) {
                    chosen = Some((id, gate.clone(), name, true));
                    break;
                }
                let q = v.qubits[0];
                if self.local_applicable(q, &name) {
                    chosen = Some((id, gate.clone(), name, false));
                    break;
                }
            }

            let Some((id, gate, name, is_global)) = chosen else {
                break;
            };

            let mut batch = vec![id];
            for &other in &candidates {
                if other == id {
                    continue;
                }
                let ov = layer.vertex(other);
                if ov.num_targets() != 1 {
                    continue;
                }
                let InstructionKind::Gate(og) = &ov.instruction.kind else {
                    continue;
                };
                if og != &gate {
                    continue;
                }
                let oq = ov.qubits[0];
                let matches_mode = if is_global {
                    self.geometry.is_global_gate(&name)
                } else {
                    self.local_applicable(oq, &name)
                };
                if matches_mode {
                    batch.push(other);
                }
            }

            let mut positions = vec![];
            if !is_global {
                let allowed: Vec<ZoneId> = self
                    .geometry
                    .zones()
                    .filter(|z| z.allows_local(&name))
                    .map(|z| z.id)
                    .collect();
                for &bid in &batch {
                    let q = layer.vertex(bid).qubits[0];
                    self.placement[q.0].narrow_zones(&allowed);
                    if let Some(p) = self.placement[q.0].current_position() {
                        positions.push(p);
                    }
                }
            }

            if is_global {
                ops.push(Operation::Global { gate });
            } else if !positions.is_empty() {
                ops.push(Operation::Local { gate, positions });
            }

            for &bid in &batch {
                layer.execute(bid);
            }
        }
        Ok(())
    }

    fn local_applicable(&self, q: CircQubit, name: &str) -> bool {
        match &self.placement[q.0] {
            Atom::Undefined { zones } => zones
                .iter()
                .any(|&z| self.geometry.zone(z).allows_local(name)),
            Atom::Defined { current, .. } => self
                .geometry
                .site_at(*current)
                .map(|s| self.geometry.zone(self.geometry.site(s).zone).allows_local(name))
                .unwrap_or(false),
        }
    }

    /// Misplacement score from §4.3: 0 for atoms not yet `Defined`.
    fn misplacement(&self, q: CircQubit, target: &FxHashMap<CircQubit, i64>) -> i64 {
        let Some(init_q) = self.placement[q.0].initial_position() else {
            return 0;
        };
        let t_q = target[&q];
        let mut score = 0i64;
        for (&p, &t_p) in target {
            let Some(init_p) = self.placement[p.0].initial_position() else {
                continue;
            };
            if init_p.x > init_q.x && t_p < t_q {
                score += 1;
            }
            if init_p.x < init_q.x && t_p > t_q {
                score -= 1;
            }
            if t_p < t_q {
                score += 1;
            }
            if init_p.x < init_q.x {
                score -= 1;
            }
        }
        score
    }

    /// Lifts an already-positioned atom (`Defined`, wherever it sits) into
    /// the movable grid at `(x + d, y)`, freeing its site and recording the
    /// leg on `starts`/`ends`.
    fn lift_from(&mut self, q: CircQubit, starts: &mut Vec<Point>, ends: &mut Vec<Point>) -> MapResult<()> {
        let d = self.geometry.min_atom_distance();
        let start = self.placement[q.0]
            .current_position()
            .ok_or_else(|| MapError::InvariantViolation(format!("atom for qubit {} has no position to lift from", q.0)))?;
        if let Some(site) = self.geometry.site_at(start) {
            self.current_free[site.0] = true;
        }
        let end = Point::new(start.x + d, start.y);
        self.placement[q.0].move_to(end);
        self.currently_shuttling.push(q);
        starts.push(start);
        ends.push(end);
        Ok(())
    }

    fn find_storage_site(&self, zones: &[ZoneId]) -> MapResult<SiteId> {
        for &zone in zones {
            if !self.geometry.storage_zones().any(|z| z == zone) {
                continue;
            }
            for &row in self.geometry.rows_in_zone(zone) {
                for &site in self.geometry.row_sites(zone, row) {
                    if self.current_free[site.0] {
                        return Ok(site);
                    }
                }
            }
        }
        Err(MapError::OutOfRoom("no free storage site in any permitted zone".into()))
    }

    /// §4.3 step 3/5 storage-row selection for an `Undefined` atom being
    /// placed mid-sweep: among the rows in its permitted storage zones with
    /// at least `not_picked_left` free sites, take the one with the most
    /// free capacity, and place the atom at the `not_picked_left`-th free
    /// site of that row (so atoms sweep-picked later land further from the
    /// anchor's column, preserving row order). Falls back to the first
    /// free site anywhere permitted if no row clears the threshold.
    fn storage_site_for_sweep(&self, zones: &[ZoneId], not_picked_left: usize) -> MapResult<SiteId> {
        let mut best: Option<(ZoneId, u32, usize)> = None;
        for &zone in zones {
            if !self.geometry.storage_zones().any(|z| z == zone) {
                continue;
            }
            for &row in self.geometry.rows_in_zone(zone) {
                let free_count = self
                    .geometry
                    .row_sites(zone, row)
                    .iter()
                    .filter(|s| self.current_free[s.0])
                    .count();
                if free_count < not_picked_left {
                    continue;
                }
                if best.map(|(_, _, c)| free_count > c).unwrap_or(true) {
                    best = Some((zone, row, free_count));
                }
            }
        }
        let Some((zone, row, free_count)) = best else {
            return self.find_storage_site(zones);
        };
        let idx = not_picked_left.min(free_count.saturating_sub(1));
        self.geometry
            .row_sites(zone, row)
            .iter()
            .filter(|s| self.current_free[s.0])
            .nth(idx)
            .copied()
            .ok_or_else(|| MapError::OutOfRoom("row free-site index out of range during sweep placement".into()))
    }

    /// Defines `q` if still `Undefined` (via [`Self::storage_site_for_sweep`],
    /// using how many of its not-yet-picked-up left neighbours in
    /// `column_order` it must leave room for) and lifts it.
    fn sweep_pick_up(
        &mut self,
        q: CircQubit,
        idx: usize,
        column_order: &[CircQubit],
        picked: &FxHashSet<CircQubit>,
        starts: &mut Vec<Point>,
        ends: &mut Vec<Point>,
    ) -> MapResult<()> {
        if !self.placement[q.0].is_defined() {
            let not_picked_left = column_order[..idx].iter().filter(|p| !picked.contains(p)).count();
            let zones = self.placement[q.0].zones().to_vec();
            let site = self.storage_site_for_sweep(&zones, not_picked_left)?;
            let pos = self.geometry.site(site).position;
            self.placement[q.0].define(pos)?;
        }
        self.lift_from(q, starts, ends)
    }

    /// One step of the sweep away from the anchor (§4.3 step 3/5): a
    /// neighbour already shuttling from the other side of this same batch
    /// is realigned onto the anchor's row instead of re-lifted; a `Defined`
    /// neighbour is lifted in place; an `Undefined` one is placed via
    /// [`Self::sweep_pick_up`].
    #[allow(clippy::too_many_arguments)]
    fn sweep_step(
        &mut self,
        q: CircQubit,
        idx: usize,
        column_order: &[CircQubit],
        picked: &mut FxHashSet<CircQubit>,
        anchor_row_y: i64,
        starts: &mut Vec<Point>,
        ends: &mut Vec<Point>,
        realign_starts: &mut Vec<Point>,
        realign_ends: &mut Vec<Point>,
    ) -> MapResult<()> {
        if self.currently_shuttling.contains(&q) {
            let cur = self.placement[q.0]
                .current_position()
                .ok_or(MapError::UndecomposableMove(q.0))?;
            let realigned = Point::new(cur.x, anchor_row_y);
            self.placement[q.0].move_to(realigned);
            realign_starts.push(cur);
            realign_ends.push(realigned);
        } else if self.placement[q.0].is_defined() {
            self.lift_from(q, starts, ends)?;
        } else {
            self.sweep_pick_up(q, idx, column_order, picked, starts, ends)?;
        }
        picked.insert(q);
        Ok(())
    }

    /// Picks up every qubit in `target` in one pass, anchored at the most
    /// misplaced qubit and sweeping left then right through `target`'s
    /// column order (§4.3 step 3/5), co-lifting or realigning row
    /// neighbours along the way. Emits a single LOAD batch for everything
    /// newly lifted, preceded by a MOVE batch for anything realigned.
    fn pick_up_side(
        &mut self,
        target: &FxHashMap<CircQubit, i64>,
        ops: &mut Vec<Operation>,
    ) -> MapResult<()> {
        if target.is_empty() {
            return Ok(());
        }

        let mut column_order: Vec<CircQubit> = target.keys().copied().collect();
        column_order.sort_by_key(|&q| target[&q]);

        let anchor_idx = (0..column_order.len())
            .max_by_key(|&i| self.misplacement(column_order[i], target).abs())
            .expect("column_order is non-empty");

        let mut picked: FxHashSet<CircQubit> = FxHashSet::default();
        let mut starts = vec![];
        let mut ends = vec![];
        let mut realign_starts = vec![];
        let mut realign_ends = vec![];

        self.sweep_pick_up(column_order[anchor_idx], anchor_idx, &column_order, &picked, &mut starts, &mut ends)?;
        picked.insert(column_order[anchor_idx]);
        let anchor_row_y = ends[0].y;

        for j in (0..anchor_idx).rev() {
            let q = column_order[j];
            self.sweep_step(q, j, &column_order, &mut picked, anchor_row_y, &mut starts, &mut ends, &mut realign_starts, &mut realign_ends)?;
        }
        for j in (anchor_idx + 1)..column_order.len() {
            let q = column_order[j];
            self.sweep_step(q, j, &column_order, &mut picked, anchor_row_y, &mut starts, &mut ends, &mut realign_starts, &mut realign_ends)?;
        }

        if !realign_starts.is_empty() {
            ops.push(Operation::Shuttling {
                kind: ShuttlingKind::Move,
                start: realign_starts,
                end: realign_ends,
            });
        }
        ops.push(Operation::Shuttling {
            kind: ShuttlingKind::Load,
            start: starts,
            end: ends,
        });
        Ok(())
    }

    /// Step 4: move the fixed side into row 0 of the interaction zone and
    /// store them there.
    fn deposit_fixed(
        &mut self,
        fixed: &FxHashMap<CircQubit, i64>,
        mapping: &Mapping,
        hardware: &mut HardwareQubits,
        ops: &mut Vec<Operation>,
    ) -> MapResult<()> {
        if fixed.is_empty() {
            return Ok(());
        }
        let d = self.geometry.min_atom_distance();
        let izone = self.geometry.interaction_zone();
        let row = *self
            .geometry
            .rows_in_zone(izone)
            .first()
            .ok_or_else(|| MapError::InvalidMachine("interaction zone has no rows".into()))?;
        let row_sites = self.geometry.row_sites(izone, row);

        let mut ordered: Vec<(CircQubit, i64)> = fixed.iter().map(|(&q, &c)| (q, c)).collect();
        ordered.sort_by_key(|&(_, c)| c);

        let mut mid = vec![];
        let mut end = vec![];
        let mut start = vec![];
        for (q, col) in ordered {
            let idx = col.clamp(0, row_sites.len() as i64 - 1) as usize;
            let site = row_sites[idx];
            if !self.current_free[site.0] {
                return Err(MapError::InvalidMachine(format!(
                    "target site {site:?} in interaction zone unexpectedly occupied"
                )));
            }
            let pos = self.geometry.site(site).position;
            let cur = self.placement[q.0]
                .current_position()
                .ok_or(MapError::UndecomposableMove(q.0))?;
            start.push(cur);
            mid.push(Point::new(pos.x + d, pos.y));
            end.push(pos);
            self.placement[q.0].move_to(pos);
            self.current_free[site.0] = false;
            hardware.move_to(mapping.get_hw(q), site).ok();
        }
        self.currently_shuttling.clear();

        ops.push(Operation::Shuttling {
            kind: ShuttlingKind::Move,
            start,
            end: mid.clone(),
        });
        ops.push(Operation::Shuttling {
            kind: ShuttlingKind::Store,
            start: mid,
            end,
        });
        Ok(())
    }

    /// Step 6: translate every moveable qubit to its interaction
    /// destination, fire the global CZ pulse, and mark realised edges
    /// executed.
    fn apply_timeframes(
        &mut self,
        seq: &Sequence,
        graph: &InteractionGraph,
        layer: &mut Layer,
        ops: &mut Vec<Operation>,
    ) -> MapResult<()> {
        let Some(frame) = seq.moveable.first() else {
            return Ok(());
        };
        if frame.is_empty() {
            return Ok(());
        }
        let d = self.geometry.min_atom_distance();
        let dx = self.geometry.no_interaction_radius();
        let izone = self.geometry.interaction_zone();
        let row = *self
            .geometry
            .rows_in_zone(izone)
            .first()
            .ok_or_else(|| MapError::InvalidMachine("interaction zone has no rows".into()))?;
        let row_sites = self.geometry.row_sites(izone, row);

        let mut start = vec![];
        let mut end = vec![];
        let mut dest_by_q = FxHashMap::default();
        for (&q, &col) in frame {
            let dest = if col >= 0 && (col as usize) < row_sites.len() {
                let pos = self.geometry.site(row_sites[col as usize]).position;
                Point::new(pos.x, pos.y + d)
            } else if col < 0 {
                let anchor = self.geometry.site(*row_sites.first().unwrap()).position;
                Point::new(anchor.x + (col as f64 * dx) as i64, anchor.y + d)
            } else {
                let anchor = self.geometry.site(*row_sites.last().unwrap()).position;
                Point::new(anchor.x + (col as f64 * dx) as i64, anchor.y + d)
            };
            let cur = self.placement[q.0]
                .current_position()
                .ok_or(MapError::UndecomposableMove(q.0))?;
            start.push(cur);
            end.push(dest);
            self.placement[q.0].move_to(dest);
            dest_by_q.insert(q, dest);
        }
        ops.push(Operation::Shuttling {
            kind: ShuttlingKind::Move,
            start,
            end,
        });
        ops.push(Operation::Global {
            gate: napp_ir::gate::Gate::standard(StandardGate::CZ),
        });

        let r = self.geometry.interaction_radius();
        for (&p, &p_col) in &seq.fixed {
            let p_idx = p_col.clamp(0, row_sites.len() as i64 - 1) as usize;
            let p_pos = self.geometry.site(row_sites[p_idx]).position;
            for (&q, &q_pos) in &dest_by_q {
                if p_pos.distance(&q_pos) < r {
                    if let Some(vid) = graph.vertex_for(p, q) {
                        if layer.vertex(vid).is_executable() {
                            layer.execute(vid);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Step 7: return every currently-shuttling atom to storage rows,
    /// re-loading the fixed side off the interaction row first.
    fn return_to_storage(
        &mut self,
        seq: &Sequence,
        mapping: &Mapping,
        hardware: &mut HardwareQubits,
        ops: &mut Vec<Operation>,
    ) -> MapResult<()> {
        let moveable: Vec<CircQubit> = seq
            .moveable
            .first()
            .map(|f| f.keys().copied().collect())
            .unwrap_or_default();
        self.store_into_rows(&moveable, mapping, hardware, ops)?;

        let fixed: Vec<CircQubit> = seq.fixed.keys().copied().collect();
        if !fixed.is_empty() {
            let d = self.geometry.min_atom_distance();
            let mut starts = vec![];
            let mut ends = vec![];
            for &q in &fixed {
                let cur = self.placement[q.0]
                    .current_position()
                    .ok_or(MapError::UndecomposableMove(q.0))?;
                let site = self
                    .geometry
                    .site_at(cur)
                    .ok_or_else(|| MapError::InvalidMachine("fixed atom not on a site".into()))?;
                self.current_free[site.0] = true;
                let end = Point::new(cur.x + d, cur.y);
                self.placement[q.0].move_to(end);
                starts.push(cur);
                ends.push(end);
            }
            ops.push(Operation::Shuttling {
                kind: ShuttlingKind::Load,
                start: starts,
                end: ends,
            });
            self.store_into_rows(&fixed, mapping, hardware, ops)?;
        }
        Ok(())
    }

    fn store_into_rows(
        &mut self,
        qubits: &[CircQubit],
        mapping: &Mapping,
        hardware: &mut HardwareQubits,
        ops: &mut Vec<Operation>,
    ) -> MapResult<()> {
        if qubits.is_empty() {
            return Ok(());
        }
        let d = self.geometry.min_atom_distance();

        let mut rows: Vec<(ZoneId, u32)> = vec![];
        for zone in self.geometry.storage_zones() {
            for &row in self.geometry.rows_in_zone(zone) {
                rows.push((zone, row));
            }
        }
        rows.sort_by_key(|&(zone, row)| {
            let free = self
                .geometry
                .row_sites(zone, row)
                .iter()
                .filter(|s| self.current_free[s.0])
                .count();
            (std::cmp::Reverse(free), zone.0, row)
        });

        let mut targets = vec![];
        'outer: for (zone, row) in rows {
            for &site in self.geometry.row_sites(zone, row) {
                if self.current_free[site.0] {
                    targets.push(site);
                    if targets.len() == qubits.len() {
                        break 'outer;
                    }
                }
            }
        }
        if targets.len() < qubits.len() {
            return Err(MapError::OutOfRoom(format!(
                "storage rows have {} free sites, need {}",
                targets.len(),
                qubits.len()
            )));
        }

        let mut starts = vec![];
        let mut mids = vec![];
        let mut ends = vec![];
        for (&q, &site) in qubits.iter().zip(targets.iter()) {
            let pos = self.geometry.site(site).position;
            let cur = self.placement[q.0]
                .current_position()
                .ok_or(MapError::UndecomposableMove(q.0))?;
            starts.push(cur);
            mids.push(Point::new(pos.x + d, pos.y));
            ends.push(pos);
            self.placement[q.0].move_to(pos);
            self.current_free[site.0] = false;
            hardware.move_to(mapping.get_hw(q), site).ok();
        }
        ops.push(Operation::Shuttling {
            kind: ShuttlingKind::Move,
            start: starts,
            end: mids.clone(),
        });
        ops.push(Operation::Shuttling {
            kind: ShuttlingKind::Store,
            start: mids,
            end: ends,
        });
        self.currently_shuttling.clear();
        Ok(())
    }

    /// Post-loop: any atom that never got touched is placed at the first
    /// initially-free site of its first permitted zone.
    fn finalize_undefined_atoms(&mut self) -> MapResult<()> {
        for q in 0..self.placement.len() {
            if self.placement[q].is_defined() {
                continue;
            }
            let zones = self.placement[q].zones().to_vec();
            if let Ok(site) = self.find_storage_site(&zones) {
                let pos = self.geometry.site(site).position;
                self.placement[q].define(pos)?;
                self.initial_free[site.0] = false;
                self.current_free[site.0] = false;
            }
        }
        Ok(())
    }

    pub fn initial_positions(&self) -> Vec<Point> {
        self.placement
            .iter()
            .filter_map(|a| a.initial_position())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Site, Zone};
    use crate::layer::Layer;
    use crate::mapping::Mapping;
    use napp_ir::gate::Gate;
    use napp_ir::instruction::Instruction;
    use napp_ir::qubit::QubitId;

    fn small_geometry() -> Geometry {
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
        let mut sites = vec![
            Site { id: SiteId(0), zone: ZoneId(0), row: 0, col: 0, position: Point::new(0, 0) },
            Site { id: SiteId(1), zone: ZoneId(0), row: 0, col: 1, position: Point::new(10, 0) },
            Site { id: SiteId(2), zone: ZoneId(0), row: 0, col: 2, position: Point::new(20, 0) },
        ];
        sites.push(Site {
            id: SiteId(3),
            zone: ZoneId(1),
            row: 0,
            col: 0,
            position: Point::new(0, 100),
        });
        sites.push(Site {
            id: SiteId(4),
            zone: ZoneId(1),
            row: 0,
            col: 1,
            position: Point::new(10, 100),
        });
        Geometry::new(vec![storage, interaction], sites, ZoneId(1), 12.0, 20.0, 1, vec!["x".into()])
    }

    #[test]
    fn trivial_identity_emits_nothing() {
        let geo = small_geometry();
        let zones = vec![vec![ZoneId(0)]; 3];
        let mut placer = Placer::new(&geo, zones);
        let mut layer = Layer::build(vec![]);
        let mut mapping = Mapping::identity(3);
        let mut hw = HardwareQubits::new(&geo, vec![SiteId(0), SiteId(1), SiteId(2)]);

        let ops = placer.run(&mut layer, &mut mapping, &mut hw).unwrap();
        assert!(ops.is_empty());
        assert_eq!(placer.initial_positions().len(), 3);
    }

    #[test]
    fn sweep_pick_up_places_three_undefined_atoms_on_distinct_sites_in_one_batch() {
        let geo = small_geometry();
        let zones = vec![vec![ZoneId(0)]; 3];
        let mut placer = Placer::new(&geo, zones);
        let mut ops = vec![];
        let target: FxHashMap<CircQubit, i64> = [(CircQubit(0), 0), (CircQubit(1), 1), (CircQubit(2), 2)]
            .into_iter()
            .collect();

        placer.pick_up_side(&target, &mut ops).unwrap();

        assert_eq!(ops.len(), 1);
        let Operation::Shuttling { kind: ShuttlingKind::Load, start, end } = &ops[0] else {
            panic!("expected a single LOAD batch covering the whole sweep");
        };
        assert_eq!(start.len(), 3);
        assert_eq!(end.len(), 3);

        let mut initial: Vec<Point> = (0..3)
            .map(|q| placer.placement()[q].initial_position().unwrap())
            .collect();
        initial.sort_by_key(|p| p.x);
        initial.dedup();
        assert_eq!(initial.len(), 3, "all three atoms must land on distinct sites");
    }

    #[test]
    fn single_global_gate_emits_one_global_op() {
        let geo = small_geometry();
        let zones = vec![vec![ZoneId(0)]; 3];
        let mut placer = Placer::new(&geo, zones);
        // A global pulse applies to every atom; the front end emits it as
        // one single-qubit instruction per target rather than one wide
        // instruction, so the drain loop can batch them by (name, params).
        let instrs = vec![
            Instruction::gate(Gate::standard(StandardGate::X), [QubitId(0)]),
            Instruction::gate(Gate::standard(StandardGate::X), [QubitId(1)]),
            Instruction::gate(Gate::standard(StandardGate::X), [QubitId(2)]),
        ];
        let mut layer = Layer::build(instrs);
        let mut mapping = Mapping::identity(3);
        let mut hw = HardwareQubits::new(&geo, vec![SiteId(0), SiteId(1), SiteId(2)]);

        let ops = placer.run(&mut layer, &mut mapping, &mut hw).unwrap();
        let globals = ops.iter().filter(|o| matches!(o, Operation::Global { .. })).count();
        assert_eq!(globals, 1);
        assert!(ops.iter().all(|o| !matches!(o, Operation::Shuttling { .. })));
    }
}
