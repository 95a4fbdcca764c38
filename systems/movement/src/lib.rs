#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that steers monsters toward the player.

use std::time::Duration;

use glam::Vec2;
use maze_shooter_core::{ActorSnapshot, ActorView, Command, Event, Position};

const DEFAULT_MONSTER_SPEED: f32 = 1.5;
const DEFAULT_ARRIVE_DISTANCE: f32 = 0.8;

/// Configuration parameters required to construct the movement system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    monster_speed: f32,
    arrive_distance: f32,
}

impl Config {
    /// Creates a new configuration.
    ///
    /// `monster_speed` is measured in world units per second. Monsters closer
    /// than `arrive_distance` to the player stop advancing.
    #[must_use]
    pub const fn new(monster_speed: f32, arrive_distance: f32) -> Self {
        Self {
            monster_speed,
            arrive_distance,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_MONSTER_SPEED, DEFAULT_ARRIVE_DISTANCE)
    }
}

/// Pure system that reacts to world events and emits monster move commands.
#[derive(Debug)]
pub struct Movement {
    config: Config,
}

impl Movement {
    /// Creates a new movement system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Consumes world events and the actor view to emit movement commands.
    ///
    /// Time is taken from `TimeAdvanced` events; without one, nothing moves.
    /// Commands are emitted in ascending actor order.
    pub fn handle(&mut self, events: &[Event], actors: &ActorView, out: &mut Vec<Command>) {
        let elapsed = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        if elapsed.is_zero() {
            return;
        }

        let Some(player) = actors.player() else {
            return;
        };
        let target = to_vec(player.position);
        let reach = self.config.monster_speed * elapsed.as_secs_f32();

        for monster in actors.monsters() {
            if let Some(to) = self.chase_step(monster, target, reach) {
                out.push(Command::MoveActor {
                    actor: monster.id,
                    to,
                });
            }
        }
    }

    fn chase_step(&self, monster: &ActorSnapshot, target: Vec2, reach: f32) -> Option<Position> {
        let origin = to_vec(monster.position);
        let offset = target - origin;
        let distance = offset.length();
        if distance <= self.config.arrive_distance {
            return None;
        }

        let travel = reach.min(distance - self.config.arrive_distance);
        let step = offset.normalize_or_zero() * travel;
        if step == Vec2::ZERO {
            return None;
        }

        let destination = origin + step;
        Some(Position::new(destination.x, destination.y))
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn to_vec(position: Position) -> Vec2 {
    Vec2::new(position.x, position.z)
}
