#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Shooter engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! Spatial conventions: the level is a grid of unit cells. World positions use
//! the `(x, z)` ground plane, where `x` runs along grid columns and `z` along
//! grid rows. A cell at column `c`, row `r` is centred on `(c, r)` and covers
//! `[c - 0.5, c + 0.5) x [r - 0.5, r + 0.5)`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that an actor move toward the provided position.
    ///
    /// The world resolves the request against the level's collision grid, so
    /// the actor may end up sliding along a wall or staying in place.
    MoveActor {
        /// Identifier of the actor attempting to move.
        actor: ActorId,
        /// Position the actor would like to occupy after the move.
        to: Position,
    },
    /// Requests that a new monster be placed on a random open cell.
    SpawnMonster,
    /// Requests removal of a monster from the world.
    DespawnMonster {
        /// Identifier of the monster targeted for removal.
        actor: ActorId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an actor changed position.
    ActorMoved {
        /// Identifier of the actor that moved.
        actor: ActorId,
        /// Position occupied before the move.
        from: Position,
        /// Position occupied after collision resolution.
        to: Position,
        /// How the collision response shaped the move.
        outcome: MoveOutcome,
    },
    /// Reports that an actor's move was rejected entirely.
    ActorBlocked {
        /// Identifier of the actor that could not move.
        actor: ActorId,
        /// Position the actor remains at.
        at: Position,
    },
    /// Confirms that a monster entered the maze.
    MonsterSpawned {
        /// Identifier assigned to the monster.
        actor: ActorId,
        /// Position the monster occupies after spawning.
        position: Position,
    },
    /// Reports that a spawn request found no admissible cell.
    SpawnFailed {
        /// Number of samples drawn before giving up.
        attempts: u32,
    },
    /// Confirms that a monster was removed from the maze.
    MonsterDespawned {
        /// Identifier of the removed monster.
        actor: ActorId,
    },
    /// Reports that the player picked up an item.
    ItemCollected {
        /// Kind of the collected item.
        item: ItemKind,
        /// Cell the item was lying on.
        cell: CellCoord,
    },
}

/// Unique identifier assigned to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Roles an actor can play inside the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorKind {
    /// The single actor driven by player input.
    Player,
    /// Hostile actor that chases the player.
    Monster,
}

/// Continuous position on the ground plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Coordinate along the grid's column axis.
    pub x: f32,
    /// Coordinate along the grid's row axis.
    pub z: f32,
}

impl Position {
    /// Creates a position from its two ground-plane coordinates.
    #[must_use]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Reports whether both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.z.is_finite()
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance(self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Returns the position shifted by the provided offsets.
    #[must_use]
    pub fn offset(self, dx: f32, dz: f32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    /// Cell the position stands in, rounding each axis to the nearest integer.
    ///
    /// Returns `None` for non-finite positions. The returned coordinate may lie
    /// outside any particular grid.
    #[must_use]
    pub fn cell(self) -> Option<CellCoord> {
        if !self.is_finite() {
            return None;
        }

        let column = (self.x + 0.5).floor();
        let row = (self.z + 0.5).floor();
        Some(CellCoord::new(column as i32, row as i32))
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that positions left of or above the grid map to
/// representable (and always blocked) cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// World position at the centre of the cell.
    #[must_use]
    pub fn center(self) -> Position {
        Position::new(self.column as f32, self.row as f32)
    }
}

/// Items that a level may place on the floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Ammunition refill.
    Ammo,
    /// Health kit.
    Health,
}

/// Classification of a single level cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Open floor.
    Empty,
    /// Solid maze wall.
    Wall,
    /// Free-standing column; blocks like a wall but is drawn differently.
    Column,
    /// Open floor that starts with an item lying on it.
    ItemSpawn(ItemKind),
    /// Open floor where monsters prefer to appear.
    MonsterSpawn,
}

impl CellKind {
    /// Reports whether actors are barred from entering the cell.
    #[must_use]
    pub const fn is_blocking(self) -> bool {
        matches!(self, Self::Wall | Self::Column)
    }

    /// Decodes a level-file cell code.
    ///
    /// Codes: `0` empty, `1` wall, `2` column, `3` ammo spawn, `4` health
    /// spawn, `5` monster spawn. Unknown codes yield `None`.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Empty),
            1 => Some(Self::Wall),
            2 => Some(Self::Column),
            3 => Some(Self::ItemSpawn(ItemKind::Ammo)),
            4 => Some(Self::ItemSpawn(ItemKind::Health)),
            5 => Some(Self::MonsterSpawn),
            _ => None,
        }
    }

    /// Level-file code that represents the cell kind.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Wall => 1,
            Self::Column => 2,
            Self::ItemSpawn(ItemKind::Ammo) => 3,
            Self::ItemSpawn(ItemKind::Health) => 4,
            Self::MonsterSpawn => 5,
        }
    }
}

/// Clearance an actor keeps between its centre and blocking cells.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Margin(f32);

impl Margin {
    /// Margin that only tests the actor's centre point.
    pub const ZERO: Self = Self(0.0);

    /// Default clearance kept by the player.
    pub const PLAYER: Self = Self(0.3);

    /// Default clearance kept by monsters.
    pub const MONSTER: Self = Self(0.4);

    /// Creates a margin, rejecting negative and non-finite values.
    #[must_use]
    pub fn new(value: f32) -> Option<Self> {
        if value.is_finite() && value >= 0.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Retrieves the margin in world units.
    #[must_use]
    pub const fn get(&self) -> f32 {
        self.0
    }
}

/// How the collision response shaped an attempted move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    /// The full move was accepted.
    Moved,
    /// Only the X component of the move was kept.
    SlidAlongX,
    /// Only the Z component of the move was kept.
    SlidAlongZ,
    /// The move was rejected where it met a wall.
    Blocked,
}

/// Level description handed over by whichever component parsed the level file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    /// Number of cell columns.
    pub width: u32,
    /// Number of cell rows.
    pub height: u32,
    /// Row-major cell codes, see [`CellKind::from_code`].
    pub cells: Vec<Vec<u8>>,
    /// Where the player enters the level.
    pub player_start: Position,
}

/// Immutable representation of a single actor's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Unique identifier assigned to the actor.
    pub id: ActorId,
    /// Role of the actor.
    pub kind: ActorKind,
    /// Current position of the actor.
    pub position: Position,
}

/// Read-only snapshot describing every actor in the maze.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the player, if present.
    #[must_use]
    pub fn player(&self) -> Option<&ActorSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.kind == ActorKind::Player)
    }

    /// Iterator over monster snapshots in deterministic order.
    pub fn monsters(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.kind == ActorKind::Monster)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ActorSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_rounds_to_nearest() {
        assert_eq!(Position::new(1.49, 0.5).cell(), Some(CellCoord::new(1, 1)));
        assert_eq!(Position::new(-0.5, -0.51).cell(), Some(CellCoord::new(0, -1)));
        assert_eq!(Position::new(2.0, 2.0).cell(), Some(CellCoord::new(2, 2)));
    }

    #[test]
    fn non_finite_positions_have_no_cell() {
        assert_eq!(Position::new(f32::NAN, 0.0).cell(), None);
        assert_eq!(Position::new(0.0, f32::INFINITY).cell(), None);
    }

    #[test]
    fn cell_codes_decode_and_encode() {
        for code in 0..=5 {
            let kind = CellKind::from_code(code).expect("known code");
            assert_eq!(kind.code(), code);
        }
        assert_eq!(CellKind::from_code(6), None);
    }

    #[test]
    fn only_walls_and_columns_block() {
        assert!(CellKind::Wall.is_blocking());
        assert!(CellKind::Column.is_blocking());
        assert!(!CellKind::Empty.is_blocking());
        assert!(!CellKind::ItemSpawn(ItemKind::Health).is_blocking());
        assert!(!CellKind::MonsterSpawn.is_blocking());
    }

    #[test]
    fn margin_rejects_negative_and_nan() {
        assert!(Margin::new(-0.1).is_none());
        assert!(Margin::new(f32::NAN).is_none());
        assert_eq!(Margin::new(0.3).map(|margin| margin.get()), Some(0.3));
    }

    #[test]
    fn level_layout_decodes_from_json() {
        let json = r#"{
            "width": 3,
            "height": 2,
            "cells": [[1, 1, 1], [1, 0, 1]],
            "player_start": { "x": 1.0, "z": 1.0 }
        }"#;
        let layout: LevelLayout = serde_json::from_str(json).expect("layout parses");
        assert_eq!(layout.width, 3);
        assert_eq!(layout.cells[1], vec![1, 0, 1]);
        assert_eq!(layout.player_start, Position::new(1.0, 1.0));
    }

    #[test]
    fn actor_view_sorts_and_filters() {
        let view = ActorView::from_snapshots(vec![
            ActorSnapshot {
                id: ActorId::new(2),
                kind: ActorKind::Monster,
                position: Position::new(3.0, 3.0),
            },
            ActorSnapshot {
                id: ActorId::new(0),
                kind: ActorKind::Player,
                position: Position::new(1.0, 1.0),
            },
        ]);
        assert_eq!(view.iter().next().map(|actor| actor.id), Some(ActorId::new(0)));
        assert_eq!(view.player().map(|actor| actor.id), Some(ActorId::new(0)));
        assert_eq!(view.monsters().count(), 1);
    }
}
