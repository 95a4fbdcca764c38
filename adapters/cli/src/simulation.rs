//! Headless fixed-step driver wiring the world to its systems.

use std::time::Duration;

use maze_shooter_core::{ActorId, Command, Event, ItemKind, MoveOutcome, Position};
use maze_shooter_system_movement::Movement;
use maze_shooter_system_spawning::Spawning;
use maze_shooter_world::{self as world, query, World};
use serde::Serialize;
use tracing::{debug, info};

/// Scripted player behaviour: walk along a heading, turn a quarter circle
/// whenever a wall stops the player outright.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PlayerScript {
    heading: f32,
    speed: f32,
}

impl PlayerScript {
    /// Creates a script walking at `speed` units per second along
    /// `heading_deg`, measured from the +X axis toward +Z.
    pub(crate) fn new(heading_deg: f32, speed: f32) -> Self {
        Self {
            heading: heading_deg.to_radians(),
            speed,
        }
    }

    fn target(&self, from: Position, dt: Duration) -> Position {
        let reach = self.speed * dt.as_secs_f32();
        from.offset(self.heading.cos() * reach, self.heading.sin() * reach)
    }

    fn turn(&mut self) {
        self.heading += std::f32::consts::FRAC_PI_2;
    }
}

/// Tallies gathered over a run, printed once the loop ends.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub(crate) struct Summary {
    pub(crate) ticks: u64,
    pub(crate) elapsed_secs: f32,
    pub(crate) player: Position,
    pub(crate) player_distance: f32,
    pub(crate) player_slides: u32,
    pub(crate) player_blocks: u32,
    pub(crate) monster_moves: u32,
    pub(crate) monster_slides: u32,
    pub(crate) monster_blocks: u32,
    pub(crate) monsters_spawned: u32,
    pub(crate) spawn_failures: u32,
    pub(crate) monsters_alive: usize,
    pub(crate) ammo_collected: u32,
    pub(crate) health_collected: u32,
    pub(crate) nearest_monster: Option<f32>,
}

impl Summary {
    fn record(&mut self, event: &Event, player_id: ActorId) {
        match event {
            Event::ActorMoved {
                actor,
                from,
                to,
                outcome,
            } => {
                let is_player = *actor == player_id;
                if is_player {
                    self.player_distance += from.distance(*to);
                }
                let (slides, blocks) = if is_player {
                    (&mut self.player_slides, &mut self.player_blocks)
                } else {
                    self.monster_moves += 1;
                    (&mut self.monster_slides, &mut self.monster_blocks)
                };
                match outcome {
                    MoveOutcome::Moved => {}
                    MoveOutcome::SlidAlongX | MoveOutcome::SlidAlongZ => *slides += 1,
                    MoveOutcome::Blocked => *blocks += 1,
                }
            }
            Event::ActorBlocked { actor, .. } => {
                if *actor == player_id {
                    self.player_blocks += 1;
                } else {
                    self.monster_blocks += 1;
                }
            }
            Event::MonsterSpawned { .. } => self.monsters_spawned += 1,
            Event::SpawnFailed { .. } => self.spawn_failures += 1,
            Event::ItemCollected { item, .. } => match item {
                ItemKind::Ammo => self.ammo_collected += 1,
                ItemKind::Health => self.health_collected += 1,
            },
            Event::TimeAdvanced { .. } | Event::MonsterDespawned { .. } => {}
        }
    }
}

/// Owns the world together with the systems reacting to it.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    movement: Movement,
    spawning: Spawning,
    script: PlayerScript,
    summary: Summary,
}

impl Simulation {
    pub(crate) fn new(
        world: World,
        movement: Movement,
        spawning: Spawning,
        script: PlayerScript,
    ) -> Self {
        Self {
            world,
            movement,
            spawning,
            script,
            summary: Summary::default(),
        }
    }

    /// Advances the simulation by one fixed step.
    pub(crate) fn step(&mut self, dt: Duration) {
        let mut tick_events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut tick_events);

        let player = query::player(&self.world);
        let mut player_events = Vec::new();
        world::apply(
            &mut self.world,
            Command::MoveActor {
                actor: player.id,
                to: self.script.target(player.position, dt),
            },
            &mut player_events,
        );
        let stopped = player_events.iter().any(|event| {
            matches!(
                event,
                Event::ActorBlocked { .. }
                    | Event::ActorMoved {
                        outcome: MoveOutcome::Blocked,
                        ..
                    }
            )
        });
        if stopped {
            self.script.turn();
            debug!(tick = query::tick_index(&self.world), "player turned at a wall");
        }
        self.record_all(&player_events);

        let mut commands = Vec::new();
        self.movement
            .handle(&tick_events, &query::actor_view(&self.world), &mut commands);
        self.spawning.handle(
            &tick_events,
            query::monster_count(&self.world),
            &mut commands,
        );

        for command in commands {
            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events);
            self.record_all(&events);
        }
    }

    fn record_all(&mut self, events: &[Event]) {
        let player_id = query::player(&self.world).id;
        for event in events {
            if let Event::MonsterSpawned { actor, position } = event {
                info!(actor = actor.get(), x = position.x, z = position.z, "monster entered the maze");
            }
            self.summary.record(event, player_id);
        }
    }

    /// Runs `ticks` fixed steps of `dt` and returns the final tallies.
    pub(crate) fn run(mut self, ticks: u64, dt: Duration) -> Summary {
        for _ in 0..ticks {
            self.step(dt);
        }
        self.finish()
    }

    fn finish(mut self) -> Summary {
        let view = query::actor_view(&self.world);
        let player = query::player(&self.world).position;
        self.summary.ticks = query::tick_index(&self.world);
        self.summary.elapsed_secs = query::elapsed(&self.world).as_secs_f32();
        self.summary.player = player;
        self.summary.monsters_alive = query::monster_count(&self.world);
        self.summary.nearest_monster = view
            .monsters()
            .map(|monster| monster.position.distance(player))
            .min_by(f32::total_cmp);
        self.summary
    }
}
