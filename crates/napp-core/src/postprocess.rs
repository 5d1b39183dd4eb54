//! Postprocessing: MOVE decomposition and patch-lattice replication.

use rustc_hash::FxHashSet;

use crate::config::MapperConfig;
use crate::geometry::{Geometry, Point};
use crate::operation::{Operation, ShuttlingKind};

fn sign(v: i64) -> i64 {
    v.cmp(&0) as i64
}

/// Whether a vertical leg at column `x` from `y0` to `y1` (exclusive of
/// both endpoints) crosses an occupied site.
fn vertical_path_blocked(occupied: &FxHashSet<Point>, x: i64, y0: i64, y1: i64) -> bool {
    let (lo, hi) = (y0.min(y1), y0.max(y1));
    ((lo + 1)..hi).any(|y| occupied.contains(&Point::new(x, y)))
}

/// Whether a horizontal leg at row `y` from `x0` to `x1` (exclusive of
/// both endpoints) crosses an occupied site.
fn horizontal_path_blocked(occupied: &FxHashSet<Point>, y: i64, x0: i64, x1: i64) -> bool {
    let (lo, hi) = (x0.min(x1), x0.max(x1));
    ((lo + 1)..hi).any(|x| occupied.contains(&Point::new(x, y)))
}

/// Decomposes one MOVE batch into its sub-legs, consulting `occupied` (the
/// static atoms parked at this point in the stream) so the detour is only
/// taken where a trajectory would actually collide, and only for the
/// trajectories that are actually diagonal. Non-diagonal trajectories in
/// the same batch stay put on any leg they don't need.
fn decompose_move_batch(start: &[Point], end: &[Point], d: i64, occupied: &FxHashSet<Point>) -> Vec<Operation> {
    let diagonal: Vec<bool> = start
        .iter()
        .zip(end)
        .map(|(s, e)| s.x != e.x && s.y != e.y)
        .collect();

    if !diagonal.iter().any(|&d| d) {
        return vec![Operation::Shuttling {
            kind: ShuttlingKind::Move,
            start: start.to_vec(),
            end: end.to_vec(),
        }];
    }

    let needs_h_offset: Vec<bool> = start
        .iter()
        .zip(end)
        .zip(&diagonal)
        .map(|((s, e), &diag)| diag && vertical_path_blocked(occupied, s.x, s.y, e.y))
        .collect();

    let offset_x: Vec<i64> = start
        .iter()
        .zip(end)
        .zip(&needs_h_offset)
        .map(|((s, e), &needs)| if needs { s.x + d * sign(e.x - s.x) } else { s.x })
        .collect();

    let needs_v_offset = start.iter().zip(end).zip(&offset_x).zip(&diagonal).any(
        |(((s, e), &ox), &diag)| diag && horizontal_path_blocked(occupied, e.y, ox, e.x),
    );

    let h_offset: Vec<Point> = start.iter().zip(&offset_x).map(|(s, &ox)| Point::new(ox, s.y)).collect();

    let v_move: Vec<Point> = start
        .iter()
        .zip(end)
        .zip(&offset_x)
        .zip(&diagonal)
        .map(|(((s, e), &ox), &diag)| {
            let y = if needs_v_offset && diag { e.y - d * sign(e.y - s.y) } else { e.y };
            Point::new(ox, y)
        })
        .collect();

    let h_move: Vec<Point> = end.iter().zip(&v_move).map(|(e, v)| Point::new(e.x, v.y)).collect();

    let mut legs = Vec::with_capacity(4);
    if needs_h_offset.iter().any(|&n| n) {
        legs.push(Operation::Shuttling {
            kind: ShuttlingKind::Move,
            start: start.to_vec(),
            end: h_offset.clone(),
        });
    }
    legs.push(Operation::Shuttling {
        kind: ShuttlingKind::Move,
        start: if legs.is_empty() { start.to_vec() } else { h_offset },
        end: v_move.clone(),
    });
    legs.push(Operation::Shuttling {
        kind: ShuttlingKind::Move,
        start: v_move,
        end: h_move.clone(),
    });
    if needs_v_offset {
        // h_move lands at `end.y - d` when offset; this final leg is the
        // small vertical correction onto the true destination row.
        legs.push(Operation::Shuttling {
            kind: ShuttlingKind::Move,
            start: h_move,
            end: end.to_vec(),
        });
    }
    // When `needs_v_offset` is false, `v_move.y == e.y` for every `e` in
    // `end`, so `h_move` already equals `end` and no correction leg is
    // needed.
    legs
}

/// Splits every diagonal MOVE into occupancy-conditional axis-aligned
/// sub-moves (hOffset, vMove, hMove, vOffset), simulating site occupancy
/// forward from `initial_positions` through LOAD/STORE operations so each
/// trajectory is only detoured where a static atom actually blocks it.
/// Non-MOVE operations and already axis-aligned MOVEs pass through
/// unchanged.
pub fn decompose_moves(ops: &[Operation], geometry: &Geometry, initial_positions: &[Point]) -> Vec<Operation> {
    let d = geometry.min_atom_distance();
    let mut occupied: FxHashSet<Point> = initial_positions.iter().copied().collect();
    let mut out = Vec::with_capacity(ops.len());

    for op in ops {
        match op {
            Operation::Shuttling { kind: ShuttlingKind::Load, start, .. } => {
                for s in start {
                    occupied.remove(s);
                }
                out.push(op.clone());
            }
            Operation::Shuttling { kind: ShuttlingKind::Store, end, .. } => {
                for e in end {
                    occupied.insert(*e);
                }
                out.push(op.clone());
            }
            Operation::Shuttling { kind: ShuttlingKind::Move, start, end } => {
                out.extend(decompose_move_batch(start, end, d, &occupied));
            }
            Operation::Global { .. } | Operation::Local { .. } => out.push(op.clone()),
        }
    }
    out
}

fn translate(op: &Operation, dx: i64, dy: i64) -> Operation {
    let shift = |p: &Point| Point::new(p.x + dx, p.y + dy);
    match op {
        Operation::Global { gate } => Operation::Global { gate: gate.clone() },
        Operation::Local { gate, positions } => Operation::Local {
            gate: gate.clone(),
            positions: positions.iter().map(shift).collect(),
        },
        Operation::Shuttling { kind, start, end } => Operation::Shuttling {
            kind: *kind,
            start: start.iter().map(shift).collect(),
            end: end.iter().map(shift).collect(),
        },
    }
}

/// Replicates the whole operation stream across a `patch_rows x
/// patch_cols` lattice of tiles, each offset by the geometry's bounding
/// extent plus a clearance margin. A `1x1` patch is the identity.
pub fn expand_patches(ops: &[Operation], geometry: &Geometry, config: &MapperConfig) -> Vec<Operation> {
    if config.patch_rows <= 1 && config.patch_cols <= 1 {
        return ops.to_vec();
    }

    let (max_x, max_y) = geometry
        .sites()
        .fold((0i64, 0i64), |(mx, my), s| (mx.max(s.position.x), my.max(s.position.y)));
    let margin = geometry.min_atom_distance() * 4;
    let pitch_x = max_x + margin;
    let pitch_y = max_y + margin;

    let mut out = Vec::with_capacity(ops.len() * (config.patch_rows * config.patch_cols) as usize);
    for r in 0..config.patch_rows {
        for c in 0..config.patch_cols {
            let dx = c as i64 * pitch_x;
            let dy = r as i64 * pitch_y;
            for op in ops {
                out.push(translate(op, dx, dy));
            }
        }
    }
    out
}

/// Runs both postprocessing passes: decomposition, then patch expansion.
pub fn run(ops: &[Operation], geometry: &Geometry, config: &MapperConfig, initial_positions: &[Point]) -> Vec<Operation> {
    let decomposed = decompose_moves(ops, geometry, initial_positions);
    expand_patches(&decomposed, geometry, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Site, SiteId, Zone, ZoneId};
    use napp_ir::gate::{Gate, StandardGate};

    fn geo() -> Geometry {
        let zone = Zone {
            id: ZoneId(0),
            name: "storage".into(),
            interaction_capable: false,
            local_gates: vec![],
        };
        let sites = vec![Site {
            id: SiteId(0),
            zone: ZoneId(0),
            row: 0,
            col: 0,
            position: Point::new(0, 0),
        }];
        Geometry::new(vec![zone], sites, ZoneId(0), 5.0, 9.0, 1, vec![])
    }

    #[test]
    fn non_move_ops_are_idempotent_under_decomposition() {
        let geometry = geo();
        let ops = vec![Operation::Global {
            gate: Gate::standard(StandardGate::X),
        }];
        let once = decompose_moves(&ops, &geometry, &[]);
        let twice = decompose_moves(&once, &geometry, &[]);
        assert_eq!(once.len(), 1);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn diagonal_move_becomes_four_axis_aligned_legs_when_blocked() {
        let geometry = geo();
        // A static atom sits directly in the vertical leg's path and in the
        // final horizontal leg's path, forcing both offsets to trigger.
        let occupied = [Point::new(0, 5), Point::new(5, 10)];
        let ops = vec![Operation::Shuttling {
            kind: ShuttlingKind::Move,
            start: vec![Point::new(0, 0)],
            end: vec![Point::new(10, 10)],
        }];
        let decomposed = decompose_moves(&ops, &geometry, &occupied);
        assert_eq!(decomposed.len(), 4);
        for op in &decomposed {
            let Operation::Shuttling { start, end, .. } = op else {
                panic!("expected shuttling op");
            };
            for (s, e) in start.iter().zip(end) {
                assert!(s.x == e.x || s.y == e.y);
            }
        }
    }

    #[test]
    fn unblocked_diagonal_move_skips_both_offsets() {
        let geometry = geo();
        let ops = vec![Operation::Shuttling {
            kind: ShuttlingKind::Move,
            start: vec![Point::new(0, 0)],
            end: vec![Point::new(10, 10)],
        }];
        let decomposed = decompose_moves(&ops, &geometry, &[]);
        // No static atoms anywhere: neither hOffset nor the final vOffset
        // correction is needed, just the vertical-then-horizontal pair.
        assert_eq!(decomposed.len(), 2);
        let Operation::Shuttling { end: first_end, .. } = &decomposed[0] else {
            panic!("expected shuttling op");
        };
        assert_eq!(first_end[0], Point::new(0, 10));
        let Operation::Shuttling { end: last_end, .. } = &decomposed[1] else {
            panic!("expected shuttling op");
        };
        assert_eq!(last_end[0], Point::new(10, 10));
    }

    #[test]
    fn axis_aligned_trajectory_is_untouched_by_a_diagonal_sibling() {
        let geometry = geo();
        // Two trajectories in one batch: qubit 0 is diagonal and unblocked,
        // qubit 1 is already purely horizontal. Qubit 1 must not be
        // perturbed into a vertical detour just because qubit 0 needed
        // decomposition.
        let ops = vec![Operation::Shuttling {
            kind: ShuttlingKind::Move,
            start: vec![Point::new(0, 0), Point::new(0, 20)],
            end: vec![Point::new(10, 10), Point::new(10, 20)],
        }];
        let decomposed = decompose_moves(&ops, &geometry, &[]);
        for op in &decomposed {
            let Operation::Shuttling { start, end, .. } = op else {
                panic!("expected shuttling op");
            };
            assert_eq!(start[1].y, 20);
            assert_eq!(end[1].y, 20);
        }
    }

    #[test]
    fn single_patch_is_identity() {
        let geometry = geo();
        let config = MapperConfig::default();
        let ops = vec![Operation::Global {
            gate: Gate::standard(StandardGate::X),
        }];
        let out = expand_patches(&ops, &geometry, &config);
        assert_eq!(out.len(), ops.len());
    }

    #[test]
    fn patch_expansion_multiplies_by_row_times_col() {
        let geometry = geo();
        let mut config = MapperConfig::default();
        config.patch_rows = 2;
        config.patch_cols = 3;
        let ops = vec![Operation::Global {
            gate: Gate::standard(StandardGate::X),
        }];
        let out = expand_patches(&ops, &geometry, &config);
        assert_eq!(out.len(), ops.len() * 6);
    }
}
