#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Shooter.
//!
//! The world owns the level's collision service and every actor position.
//! It is created in one step from an already-parsed [`LevelLayout`] and is
//! mutated only through [`apply`], so no movement can be resolved before the
//! collision grid exists.

pub mod collision;
pub mod grid;

use std::time::Duration;

use maze_shooter_core::{
    ActorId, ActorKind, ActorSnapshot, CellCoord, CellKind, Command, Event, ItemKind, LevelLayout,
    Margin, MoveOutcome, Position,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use collision::{CollisionOptions, CollisionService, Resolution, SpawnError, SpawnExclusion};
pub use grid::{InvalidGridError, TileGrid};

const DEFAULT_RNG_SEED: u64 = 0x5eed_0f_ba11_d00d;
const DEFAULT_SPAWN_MIN_DISTANCE: f32 = 5.0;
const DEFAULT_SPAWN_ATTEMPTS: u32 = 64;
const DEFAULT_PICKUP_RADIUS: f32 = 0.5;

/// Longest distance an actor covers in one collision sub-step.
const MAX_SUBSTEP: f32 = 0.5;
/// Moves needing more sub-steps than this are rejected outright.
const MAX_SUBSTEPS: u32 = 64;

const PLAYER_ID: ActorId = ActorId::new(0);

/// Configuration parameters required to construct the world.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    player_margin: Margin,
    monster_margin: Margin,
    spawn_min_distance: f32,
    spawn_attempts: u32,
    pickup_radius: f32,
    rng_seed: u64,
    collision: CollisionOptions,
}

impl Config {
    /// Creates a configuration with explicit actor margins and random seed.
    #[must_use]
    pub const fn new(player_margin: Margin, monster_margin: Margin, rng_seed: u64) -> Self {
        Self {
            player_margin,
            monster_margin,
            spawn_min_distance: DEFAULT_SPAWN_MIN_DISTANCE,
            spawn_attempts: DEFAULT_SPAWN_ATTEMPTS,
            pickup_radius: DEFAULT_PICKUP_RADIUS,
            rng_seed,
            collision: CollisionOptions::new(true),
        }
    }

    /// Overrides how far from the player monsters must spawn and how many
    /// cells the spawn search may draw.
    #[must_use]
    pub const fn with_spawn_rules(mut self, min_distance: f32, attempts: u32) -> Self {
        self.spawn_min_distance = min_distance;
        self.spawn_attempts = attempts;
        self
    }

    /// Overrides the distance at which the player picks up items.
    #[must_use]
    pub const fn with_pickup_radius(mut self, radius: f32) -> Self {
        self.pickup_radius = radius;
        self
    }

    /// Overrides the collision query options.
    #[must_use]
    pub const fn with_collision_options(mut self, options: CollisionOptions) -> Self {
        self.collision = options;
        self
    }

    /// Clearance kept by actors of the given kind.
    #[must_use]
    pub const fn margin_for(&self, kind: ActorKind) -> Margin {
        match kind {
            ActorKind::Player => self.player_margin,
            ActorKind::Monster => self.monster_margin,
        }
    }

    /// Minimum distance between the player and a freshly spawned monster.
    #[must_use]
    pub const fn spawn_min_distance(&self) -> f32 {
        self.spawn_min_distance
    }

    /// Number of cells the spawn search may draw before giving up.
    #[must_use]
    pub const fn spawn_attempts(&self) -> u32 {
        self.spawn_attempts
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Margin::PLAYER, Margin::MONSTER, DEFAULT_RNG_SEED)
    }
}

/// Reasons a level cannot be turned into a world.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum WorldError {
    /// The level's cell data is malformed.
    #[error("invalid level grid: {0}")]
    InvalidGrid(#[from] InvalidGridError),
    /// The player would start inside or against a wall.
    #[error("player start ({}, {}) is blocked", .position.x, .position.z)]
    BlockedPlayerStart {
        /// The rejected start position.
        position: Position,
    },
}

/// Represents the authoritative Maze Shooter world state.
#[derive(Debug)]
pub struct World {
    collision: CollisionService,
    config: Config,
    player: Actor,
    monsters: Vec<Actor>,
    items: Vec<Item>,
    monster_spawn_cells: Vec<CellCoord>,
    rng: ChaCha8Rng,
    next_actor_id: u32,
    tick_index: u64,
    elapsed: Duration,
}

impl World {
    /// Loads a level and places the player at its start position.
    pub fn new(layout: &LevelLayout, config: Config) -> Result<Self, WorldError> {
        let collision = CollisionService::from_layout(layout, config.collision)?;

        let start = layout.player_start;
        if collision.is_blocked(start, config.player_margin) {
            return Err(WorldError::BlockedPlayerStart { position: start });
        }

        let items: Vec<Item> = collision
            .grid()
            .cells()
            .filter_map(|(cell, kind)| match kind {
                CellKind::ItemSpawn(item) => Some(Item { cell, kind: item }),
                _ => None,
            })
            .collect();
        let monster_spawn_cells = collision
            .grid()
            .cells_where(|kind| kind == CellKind::MonsterSpawn);

        info!(
            width = collision.grid().width(),
            height = collision.grid().height(),
            items = items.len(),
            monster_spawns = monster_spawn_cells.len(),
            "level loaded"
        );

        Ok(Self {
            player: Actor {
                id: PLAYER_ID,
                kind: ActorKind::Player,
                position: start,
            },
            monsters: Vec::new(),
            items,
            monster_spawn_cells,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            next_actor_id: PLAYER_ID.get() + 1,
            tick_index: 0,
            elapsed: Duration::ZERO,
            collision,
            config,
        })
    }

    fn actor(&self, id: ActorId) -> Option<&Actor> {
        if id == self.player.id {
            Some(&self.player)
        } else {
            self.monsters.iter().find(|monster| monster.id == id)
        }
    }

    fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        if id == self.player.id {
            Some(&mut self.player)
        } else {
            self.monsters.iter_mut().find(|monster| monster.id == id)
        }
    }

    fn move_actor(&mut self, id: ActorId, to: Position, out_events: &mut Vec<Event>) {
        let Some(actor) = self.actor(id).copied() else {
            warn!(actor = id.get(), "move requested for unknown actor");
            return;
        };

        let margin = self.config.margin_for(actor.kind);
        let from = actor.position;
        let Some((position, outcome)) = self.resolve_in_substeps(from, to, margin) else {
            warn!(actor = id.get(), ?to, "move rejected as unresolvable");
            out_events.push(Event::ActorBlocked { actor: id, at: from });
            return;
        };

        if position == from {
            if from != to {
                out_events.push(Event::ActorBlocked { actor: id, at: from });
            }
            return;
        }

        if let Some(actor) = self.actor_mut(id) {
            actor.position = position;
        }
        debug!(actor = id.get(), ?from, ?position, ?outcome, "actor moved");
        out_events.push(Event::ActorMoved {
            actor: id,
            from,
            to: position,
            outcome,
        });

        if actor.kind == ActorKind::Player {
            self.collect_items(position, out_events);
        }
    }

    fn resolve_in_substeps(
        &self,
        from: Position,
        to: Position,
        margin: Margin,
    ) -> Option<(Position, MoveOutcome)> {
        if !to.is_finite() {
            return None;
        }

        let distance = from.distance(to);
        let steps = (distance / MAX_SUBSTEP).ceil().max(1.0);
        if steps > MAX_SUBSTEPS as f32 {
            return None;
        }
        let steps = steps as u32;

        let step_x = (to.x - from.x) / steps as f32;
        let step_z = (to.z - from.z) / steps as f32;
        let mut current = from;
        let mut outcome = MoveOutcome::Moved;

        for _ in 0..steps {
            let resolution =
                self.collision
                    .resolve_move_detailed(current, current.offset(step_x, step_z), margin);
            current = resolution.position;
            if outcome == MoveOutcome::Moved {
                outcome = resolution.outcome;
            }
            if resolution.outcome == MoveOutcome::Blocked {
                break;
            }
        }

        Some((current, outcome))
    }

    fn collect_items(&mut self, position: Position, out_events: &mut Vec<Event>) {
        let radius = self.config.pickup_radius;
        let mut remaining = Vec::with_capacity(self.items.len());
        for item in self.items.drain(..) {
            if item.cell.center().distance(position) <= radius {
                out_events.push(Event::ItemCollected {
                    item: item.kind,
                    cell: item.cell,
                });
            } else {
                remaining.push(item);
            }
        }
        self.items = remaining;
    }

    fn spawn_monster(&mut self, out_events: &mut Vec<Event>) {
        let exclusion = SpawnExclusion::new(self.player.position, self.config.spawn_min_distance);
        let candidates = if self.monster_spawn_cells.is_empty() {
            self.collision.open_cells()
        } else {
            &self.monster_spawn_cells
        };
        let found = self.collision.find_random_cell_among(
            candidates,
            &mut self.rng,
            Some(exclusion),
            self.config.monster_margin,
            self.config.spawn_attempts,
        );

        let position = match found {
            Ok(position) => position,
            Err(SpawnError::NotFound { attempts }) => {
                warn!(attempts, "no admissible monster spawn cell");
                out_events.push(Event::SpawnFailed { attempts });
                return;
            }
        };

        let id = ActorId::new(self.next_actor_id);
        self.next_actor_id = self.next_actor_id.saturating_add(1);
        self.monsters.push(Actor {
            id,
            kind: ActorKind::Monster,
            position,
        });
        debug!(actor = id.get(), ?position, "monster spawned");
        out_events.push(Event::MonsterSpawned {
            actor: id,
            position,
        });
    }

    fn despawn_monster(&mut self, id: ActorId, out_events: &mut Vec<Event>) {
        let Some(index) = self.monsters.iter().position(|monster| monster.id == id) else {
            warn!(actor = id.get(), "despawn requested for unknown monster");
            return;
        };

        let _ = self.monsters.remove(index);
        out_events.push(Event::MonsterDespawned { actor: id });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::MoveActor { actor, to } => world.move_actor(actor, to, out_events),
        Command::SpawnMonster => world.spawn_monster(out_events),
        Command::DespawnMonster { actor } => world.despawn_monster(actor, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use maze_shooter_core::{ActorSnapshot, ActorView, CellCoord, ItemKind};

    use super::{CollisionService, TileGrid, World};

    /// Item lying on the floor, waiting to be collected.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ItemSnapshot {
        /// Cell the item lies on.
        pub cell: CellCoord,
        /// Kind of the item.
        pub kind: ItemKind,
    }

    /// Provides read-only access to the level's collision service.
    #[must_use]
    pub fn collision(world: &World) -> &CollisionService {
        &world.collision
    }

    /// Provides read-only access to the level's tile grid.
    #[must_use]
    pub fn tile_grid(world: &World) -> &TileGrid {
        world.collision.grid()
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> ActorSnapshot {
        world.player.snapshot()
    }

    /// Captures a read-only view of every actor in the maze.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        let snapshots = std::iter::once(&world.player)
            .chain(world.monsters.iter())
            .map(|actor| actor.snapshot())
            .collect();
        ActorView::from_snapshots(snapshots)
    }

    /// Number of monsters currently in the maze.
    #[must_use]
    pub fn monster_count(world: &World) -> usize {
        world.monsters.len()
    }

    /// Items still lying on the floor in row-major cell order.
    #[must_use]
    pub fn items(world: &World) -> Vec<ItemSnapshot> {
        world
            .items
            .iter()
            .map(|item| ItemSnapshot {
                cell: item.cell,
                kind: item.kind,
            })
            .collect()
    }

    /// Number of ticks applied since the level loaded.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Simulated time elapsed since the level loaded.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }
}

#[derive(Clone, Copy, Debug)]
struct Actor {
    id: ActorId,
    kind: ActorKind,
    position: Position,
}

impl Actor {
    fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Item {
    cell: CellCoord,
    kind: ItemKind,
}
