//! Collision and movement-validity queries against a static tile grid.
//!
//! Every query is a pure read of the grid, so any number of actors can be
//! resolved against the same service within a tick.

use std::f32::consts::FRAC_1_SQRT_2;

use maze_shooter_core::{CellCoord, LevelLayout, Margin, MoveOutcome, Position};
use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::grid::{InvalidGridError, TileGrid};

/// Longest distance between two samples when checking a path.
const PATH_SAMPLE_STEP: f32 = 0.25;

/// Tuning switches for collision queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionOptions {
    probe_diagonals: bool,
}

impl CollisionOptions {
    /// Creates a new option set.
    ///
    /// With `probe_diagonals` disabled, only the four axis-aligned margin
    /// probes are tested, which lets actors graze wall corners.
    #[must_use]
    pub const fn new(probe_diagonals: bool) -> Self {
        Self { probe_diagonals }
    }

    /// Reports whether diagonal margin probes are enabled.
    #[must_use]
    pub const fn probe_diagonals(&self) -> bool {
        self.probe_diagonals
    }
}

impl Default for CollisionOptions {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Zone around a point where random cell searches must not land.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnExclusion {
    /// Centre of the excluded zone.
    pub center: Position,
    /// Candidates closer than this to `center` are rejected.
    pub min_distance: f32,
}

impl SpawnExclusion {
    /// Creates an exclusion zone.
    #[must_use]
    pub const fn new(center: Position, min_distance: f32) -> Self {
        Self {
            center,
            min_distance,
        }
    }

    fn rejects(&self, candidate: Position) -> bool {
        candidate.distance(self.center) < self.min_distance
    }
}

/// Failure of a bounded random cell search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// No admissible cell was drawn before the attempt budget ran out.
    #[error("no admissible open cell found after {attempts} attempts")]
    NotFound {
        /// Number of samples drawn.
        attempts: u32,
    },
}

/// Result of resolving an attempted move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    /// Position the actor ends up at.
    pub position: Position,
    /// How the collision response shaped the move.
    pub outcome: MoveOutcome,
}

/// Answers whether actors may occupy positions on a static tile grid.
#[derive(Clone, Debug)]
pub struct CollisionService {
    grid: TileGrid,
    options: CollisionOptions,
    open_cells: Vec<CellCoord>,
}

impl CollisionService {
    /// Wraps a validated grid.
    #[must_use]
    pub fn new(grid: TileGrid, options: CollisionOptions) -> Self {
        let open_cells = grid.open_cells();
        debug!(
            width = grid.width(),
            height = grid.height(),
            open_cells = open_cells.len(),
            "collision grid ready"
        );
        Self {
            grid,
            options,
            open_cells,
        }
    }

    /// Decodes a level layout and wraps the resulting grid.
    pub fn from_layout(
        layout: &LevelLayout,
        options: CollisionOptions,
    ) -> Result<Self, InvalidGridError> {
        let grid = TileGrid::from_layout(layout)?;
        Ok(Self::new(grid, options))
    }

    /// Grid the service answers queries against.
    #[must_use]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Options the service was created with.
    #[must_use]
    pub const fn options(&self) -> CollisionOptions {
        self.options
    }

    /// Coordinates of every non-blocking cell in row-major order.
    #[must_use]
    pub fn open_cells(&self) -> &[CellCoord] {
        &self.open_cells
    }

    /// Reports whether an actor with the given margin may not stand at `position`.
    ///
    /// The centre cell is found by rounding to the nearest integer on each
    /// axis. The actor's body is then probed `margin` units away along both
    /// axes and, when enabled, along the diagonals. Any probe landing in a
    /// blocking cell or outside the grid blocks the position, as does a
    /// non-finite position.
    #[must_use]
    pub fn is_blocked(&self, position: Position, margin: Margin) -> bool {
        if self.point_blocked(position) {
            return true;
        }

        let reach = margin.get();
        if reach == 0.0 {
            return false;
        }

        let axis_probes = [(reach, 0.0), (-reach, 0.0), (0.0, reach), (0.0, -reach)];
        if axis_probes
            .iter()
            .any(|&(dx, dz)| self.point_blocked(position.offset(dx, dz)))
        {
            return true;
        }

        if !self.options.probe_diagonals {
            return false;
        }

        let diagonal = reach * FRAC_1_SQRT_2;
        let diagonal_probes = [
            (diagonal, diagonal),
            (diagonal, -diagonal),
            (-diagonal, diagonal),
            (-diagonal, -diagonal),
        ];
        diagonal_probes
            .iter()
            .any(|&(dx, dz)| self.point_blocked(position.offset(dx, dz)))
    }

    /// Resolves an attempted move, sliding along walls where possible.
    ///
    /// `old` must itself be unblocked for the returned position to be
    /// guaranteed unblocked.
    #[must_use]
    pub fn resolve_move(&self, old: Position, candidate: Position, margin: Margin) -> Position {
        self.resolve_move_detailed(old, candidate, margin).position
    }

    /// Same as [`Self::resolve_move`] but also reports how the move was shaped.
    ///
    /// When the full move is blocked, the X-only and Z-only moves are tested
    /// independently. If both are open the one with the larger displacement
    /// wins, with X preferred on ties, since combining them would recreate
    /// the blocked candidate.
    #[must_use]
    pub fn resolve_move_detailed(
        &self,
        old: Position,
        candidate: Position,
        margin: Margin,
    ) -> Resolution {
        if !self.is_blocked(candidate, margin) {
            return Resolution {
                position: candidate,
                outcome: MoveOutcome::Moved,
            };
        }

        // An axis without displacement cannot slide.
        let along_x = Position::new(candidate.x, old.z);
        let along_z = Position::new(old.x, candidate.z);
        let x_open = candidate.x != old.x && !self.is_blocked(along_x, margin);
        let z_open = candidate.z != old.z && !self.is_blocked(along_z, margin);

        let slide_x = Resolution {
            position: along_x,
            outcome: MoveOutcome::SlidAlongX,
        };
        let slide_z = Resolution {
            position: along_z,
            outcome: MoveOutcome::SlidAlongZ,
        };

        match (x_open, z_open) {
            (true, true) => {
                if (candidate.x - old.x).abs() >= (candidate.z - old.z).abs() {
                    slide_x
                } else {
                    slide_z
                }
            }
            (true, false) => slide_x,
            (false, true) => slide_z,
            (false, false) => Resolution {
                position: old,
                outcome: MoveOutcome::Blocked,
            },
        }
    }

    /// Reports whether any point on the segment from `from` to `to` is blocked.
    ///
    /// The segment is sampled at most a quarter cell apart, so a one-cell
    /// wall between the endpoints is always detected. `from` itself is not
    /// tested.
    #[must_use]
    pub fn is_path_blocked(&self, from: Position, to: Position, margin: Margin) -> bool {
        if self.is_blocked(to, margin) || !from.is_finite() {
            return true;
        }

        let distance = from.distance(to);
        let steps = (distance / PATH_SAMPLE_STEP).ceil().max(1.0) as u32;
        let dx = to.x - from.x;
        let dz = to.z - from.z;

        (1..steps).any(|step| {
            let t = step as f32 / steps as f32;
            self.is_blocked(from.offset(dx * t, dz * t), margin)
        })
    }

    /// Draws a random open cell, returning its centre.
    ///
    /// Candidates are sampled uniformly among non-blocking cells. When an
    /// exclusion zone is given, candidates inside it are rejected. The search
    /// gives up after `max_attempts` draws.
    pub fn find_random_open_cell<R>(
        &self,
        rng: &mut R,
        exclude_near: Option<SpawnExclusion>,
        max_attempts: u32,
    ) -> Result<Position, SpawnError>
    where
        R: Rng + ?Sized,
    {
        self.find_random_cell_among(
            &self.open_cells,
            rng,
            exclude_near,
            Margin::ZERO,
            max_attempts,
        )
    }

    /// Draws a random cell from `candidates` whose centre is clear for `margin`.
    ///
    /// Behaves like [`Self::find_random_open_cell`] but restricted to a
    /// caller-provided candidate list, such as a level's monster spawn cells.
    /// Cells too narrow for `margin` count as rejected draws.
    pub fn find_random_cell_among<R>(
        &self,
        candidates: &[CellCoord],
        rng: &mut R,
        exclude_near: Option<SpawnExclusion>,
        margin: Margin,
        max_attempts: u32,
    ) -> Result<Position, SpawnError>
    where
        R: Rng + ?Sized,
    {
        if candidates.is_empty() {
            return Err(SpawnError::NotFound { attempts: 0 });
        }

        for _ in 0..max_attempts {
            let position = candidates[rng.gen_range(0..candidates.len())].center();
            if self.is_blocked(position, margin) {
                continue;
            }
            if exclude_near.is_some_and(|zone| zone.rejects(position)) {
                continue;
            }

            return Ok(position);
        }

        Err(SpawnError::NotFound {
            attempts: max_attempts,
        })
    }

    fn point_blocked(&self, point: Position) -> bool {
        point
            .cell()
            .map_or(true, |cell| self.grid.is_cell_blocked(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_shooter_core::CellKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn margin(value: f32) -> Margin {
        Margin::new(value).expect("valid margin")
    }

    fn service(codes: &[&[u8]]) -> CollisionService {
        let layout = LevelLayout {
            width: codes[0].len() as u32,
            height: codes.len() as u32,
            cells: codes.iter().map(|row| row.to_vec()).collect(),
            player_start: Position::new(1.0, 1.0),
        };
        CollisionService::from_layout(&layout, CollisionOptions::default()).expect("valid layout")
    }

    fn walled_room() -> CollisionService {
        service(&[&[1, 1, 1], &[1, 0, 1], &[1, 1, 1]])
    }

    fn open_field() -> CollisionService {
        service(&[
            &[1, 1, 1, 1, 1, 1, 1],
            &[1, 0, 0, 0, 0, 0, 1],
            &[1, 0, 0, 0, 0, 0, 1],
            &[1, 0, 0, 0, 0, 0, 1],
            &[1, 0, 0, 0, 0, 0, 1],
            &[1, 0, 0, 0, 0, 0, 1],
            &[1, 1, 1, 1, 1, 1, 1],
        ])
    }

    #[test]
    fn centre_of_walled_room_is_open() {
        let room = walled_room();
        assert!(!room.is_blocked(Position::new(1.0, 1.0), margin(0.3)));
    }

    #[test]
    fn wall_cell_is_blocked() {
        let room = walled_room();
        assert!(room.is_blocked(Position::new(0.0, 1.0), margin(0.3)));
    }

    #[test]
    fn blocking_cells_block_regardless_of_margin() {
        let field = service(&[&[0, 0, 0], &[0, 2, 0], &[0, 0, 0]]);
        for value in [0.0, 0.1, 0.3, 0.8] {
            assert!(field.is_blocked(Position::new(1.2, 0.8), margin(value)));
            assert!(field.is_blocked(Position::new(1.0, 1.0), margin(value)));
        }
    }

    #[test]
    fn positions_inside_clear_neighbourhood_are_open() {
        let field = open_field();
        for step_x in 0..10 {
            for step_z in 0..10 {
                let position = Position::new(2.55 + step_x as f32 * 0.1, 2.55 + step_z as f32 * 0.1);
                assert!(
                    !field.is_blocked(position, margin(0.5)),
                    "{position:?} should be open"
                );
            }
        }
    }

    #[test]
    fn integer_positions_outside_grid_are_blocked() {
        let field = open_field();
        let (width, height) = (field.grid().width() as i32, field.grid().height() as i32);
        for column in -2..width + 2 {
            for row in -2..height + 2 {
                let inside = (0..width).contains(&column) && (0..height).contains(&row);
                if inside {
                    continue;
                }
                let position = CellCoord::new(column, row).center();
                assert!(field.is_blocked(position, Margin::ZERO), "{position:?}");
            }
        }
    }

    #[test]
    fn non_finite_positions_are_blocked() {
        let field = open_field();
        assert!(field.is_blocked(Position::new(f32::NAN, 2.0), Margin::ZERO));
        assert!(field.is_blocked(Position::new(2.0, f32::NEG_INFINITY), Margin::ZERO));
    }

    #[test]
    fn margin_catches_adjacent_wall() {
        let room = walled_room();
        let near_wall = Position::new(1.3, 1.0);
        assert!(!room.is_blocked(near_wall, Margin::ZERO));
        assert!(room.is_blocked(near_wall, margin(0.3)));
    }

    #[test]
    fn diagonal_probes_catch_corners() {
        let field = service(&[&[0, 0, 0], &[0, 0, 0], &[0, 0, 1]]);
        let near_corner = Position::new(1.3, 1.3);
        let axis_only = CollisionService::new(field.grid().clone(), CollisionOptions::new(false));

        assert!(field.is_blocked(near_corner, margin(0.4)));
        assert!(!axis_only.is_blocked(near_corner, margin(0.4)));
    }

    #[test]
    fn moving_to_current_position_is_identity() {
        let field = open_field();
        for position in [Position::new(1.0, 1.0), Position::new(3.2, 4.7), Position::new(5.0, 5.0)] {
            assert_eq!(field.resolve_move(position, position, margin(0.3)), position);
        }
    }

    #[test]
    fn slides_along_wall_on_positive_x_side() {
        let field = open_field();
        let old = Position::new(5.0, 3.0);
        let candidate = Position::new(5.4, 3.4);

        let resolution = field.resolve_move_detailed(old, candidate, margin(0.3));

        assert_eq!(resolution.position, Position::new(old.x, candidate.z));
        assert_eq!(resolution.outcome, MoveOutcome::SlidAlongZ);
    }

    #[test]
    fn move_into_corner_is_rejected() {
        let room = walled_room();
        let old = Position::new(1.0, 1.0);
        let candidate = Position::new(1.0, 1.9);

        let resolution = room.resolve_move_detailed(old, candidate, margin(0.3));

        assert_eq!(resolution.position, old);
        assert_eq!(resolution.outcome, MoveOutcome::Blocked);
        assert!(!room.is_blocked(resolution.position, margin(0.3)));
    }

    #[test]
    fn fully_blocked_move_keeps_old_position() {
        let room = walled_room();
        let old = Position::new(1.0, 1.0);
        let candidate = Position::new(1.6, 1.6);

        let resolution = room.resolve_move_detailed(old, candidate, margin(0.3));

        assert_eq!(resolution.position, old);
        assert_eq!(resolution.outcome, MoveOutcome::Blocked);
    }

    #[test]
    fn resolved_positions_are_never_blocked() {
        let field = open_field();
        let old = Position::new(3.0, 3.0);
        for dx in -12..=12 {
            for dz in -12..=12 {
                let candidate = old.offset(dx as f32 * 0.25, dz as f32 * 0.25);
                let resolved = field.resolve_move(old, candidate, margin(0.3));
                assert!(!field.is_blocked(resolved, margin(0.3)), "{candidate:?}");
            }
        }
    }

    #[test]
    fn path_through_wall_is_blocked() {
        let field = service(&[&[0, 0, 1, 0, 0]]);
        let from = Position::new(0.0, 0.0);
        assert!(field.is_path_blocked(from, Position::new(4.0, 0.0), Margin::ZERO));
        assert!(!field.is_path_blocked(from, Position::new(1.0, 0.0), Margin::ZERO));
    }

    #[test]
    fn random_open_cell_lands_on_open_floor() {
        let field = open_field();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let position = field
                .find_random_open_cell(&mut rng, None, 8)
                .expect("open cell");
            let cell = position.cell().expect("finite");
            assert_eq!(field.grid().kind_at(cell), Some(CellKind::Empty));
        }
    }

    #[test]
    fn random_open_cell_honours_exclusion_zone() {
        let field = open_field();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let zone = SpawnExclusion::new(Position::new(1.0, 1.0), 4.0);
        for _ in 0..50 {
            match field.find_random_open_cell(&mut rng, Some(zone), 64) {
                Ok(position) => assert!(position.distance(zone.center) >= 4.0),
                Err(SpawnError::NotFound { attempts }) => assert_eq!(attempts, 64),
            }
        }
    }

    #[test]
    fn random_open_cell_reports_exhaustion() {
        let solid = service(&[&[1, 1], &[1, 2]]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(
            solid.find_random_open_cell(&mut rng, None, 100),
            Err(SpawnError::NotFound { attempts: 0 })
        );

        let single = service(&[&[1, 0, 1]]);
        let zone = SpawnExclusion::new(Position::new(1.0, 0.0), 1.0);
        assert_eq!(
            single.find_random_open_cell(&mut rng, Some(zone), 5),
            Err(SpawnError::NotFound { attempts: 5 })
        );
    }

    #[test]
    fn cell_search_skips_cells_too_narrow_for_margin() {
        let field = open_field();
        let mut rng = ChaCha8Rng::seed_from_u64(19);
        let wide = margin(0.6);
        for _ in 0..100 {
            let position = field
                .find_random_cell_among(field.open_cells(), &mut rng, None, wide, 64)
                .expect("inner cells are clear");
            assert!(!field.is_blocked(position, wide), "{position:?}");
            assert!((2.0..=4.0).contains(&position.x) && (2.0..=4.0).contains(&position.z));
        }

        let hugging = [CellCoord::new(1, 1), CellCoord::new(5, 3)];
        assert_eq!(
            field.find_random_cell_among(&hugging, &mut rng, None, wide, 7),
            Err(SpawnError::NotFound { attempts: 7 })
        );
    }
}
