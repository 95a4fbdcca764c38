#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting monster spawn commands.

use std::time::Duration;

use maze_shooter_core::{Command, Event};

const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_MAX_MONSTERS: usize = 15;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    max_monsters: usize,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence and population cap.
    #[must_use]
    pub const fn new(spawn_interval: Duration, max_monsters: usize) -> Self {
        Self {
            spawn_interval,
            max_monsters,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SPAWN_INTERVAL, DEFAULT_MAX_MONSTERS)
    }
}

/// Pure system that emits spawn commands on a fixed cadence.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    max_monsters: usize,
    accumulator: Duration,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            max_monsters: config.max_monsters,
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes events and the current monster population to emit spawn commands.
    ///
    /// One spawn is requested per elapsed interval while the population,
    /// including spawns requested in this call, stays below the cap. Intervals
    /// that elapse while the maze is full are discarded rather than banked.
    pub fn handle(&mut self, events: &[Event], monster_count: usize, out: &mut Vec<Command>) {
        if self.spawn_interval.is_zero() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let spawn_attempts = self.resolve_spawn_attempts();
        let room = self.max_monsters.saturating_sub(monster_count);

        for _ in 0..spawn_attempts.min(room) {
            out.push(Command::SpawnMonster);
        }
    }

    fn resolve_spawn_attempts(&mut self) -> usize {
        if self.spawn_interval.is_zero() {
            return 0;
        }

        let interval = self.spawn_interval.as_nanos();
        let accumulated = self.accumulator.as_nanos();
        self.accumulator = duration_from_nanos(accumulated % interval);
        usize::try_from(accumulated / interval).unwrap_or(usize::MAX)
    }
}

fn duration_from_nanos(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    let secs = u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX);
    Duration::new(secs, (nanos % NANOS_PER_SEC) as u32)
}

impl Default for Spawning {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
