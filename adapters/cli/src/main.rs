#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Maze Shooter simulation.

mod level_file;
mod simulation;

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use maze_shooter_core::Margin;
use maze_shooter_system_movement::Movement;
use maze_shooter_system_spawning::Spawning;
use maze_shooter_world::{Config, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::simulation::{PlayerScript, Simulation, Summary};

/// Runs a maze level without rendering and reports what happened.
#[derive(Debug, Parser)]
#[command(name = "maze-shooter", version)]
struct CliArgs {
    /// JSON level file; a built-in arena is used when omitted.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,
    /// Number of fixed steps to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u64,
    /// Length of one step in milliseconds.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Seed for monster spawn placement.
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,
    /// Clearance the player keeps from walls.
    #[arg(long, value_parser = parse_margin, default_value = "0.3")]
    player_margin: Margin,
    /// Clearance monsters keep from walls.
    #[arg(long, value_parser = parse_margin, default_value = "0.4")]
    monster_margin: Margin,
    /// Direction the player starts walking in, in degrees from +X toward +Z.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    heading_deg: f32,
    /// Player walking speed in units per second.
    #[arg(long, default_value_t = 3.0)]
    player_speed: f32,
    /// Print the summary as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn parse_margin(value: &str) -> Result<Margin, String> {
    let parsed: f32 = value
        .parse()
        .map_err(|error| format!("'{value}' is not a number: {error}"))?;
    Margin::new(parsed).ok_or_else(|| format!("margin must be finite and non-negative, got {value}"))
}

/// Entry point for the Maze Shooter command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    ensure!(args.tick_ms > 0, "--tick-ms must be greater than zero");
    ensure!(
        args.player_speed.is_finite() && args.player_speed >= 0.0,
        "--player-speed must be finite and non-negative"
    );
    ensure!(args.heading_deg.is_finite(), "--heading-deg must be finite");

    let layout = match &args.level {
        Some(path) => level_file::load(path)?,
        None => level_file::demo()?,
    };

    let config = Config::new(args.player_margin, args.monster_margin, args.seed);
    let world = World::new(&layout, config).context("failed to build the level")?;
    info!(
        ticks = args.ticks,
        tick_ms = args.tick_ms,
        seed = args.seed,
        "starting simulation"
    );

    let simulation = Simulation::new(
        world,
        Movement::default(),
        Spawning::default(),
        PlayerScript::new(args.heading_deg, args.player_speed),
    );
    let summary = simulation.run(args.ticks, Duration::from_millis(args.tick_ms));

    if args.json {
        let text = serde_json::to_string_pretty(&summary).context("failed to encode summary")?;
        println!("{text}");
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    println!(
        "simulated {} ticks ({:.2}s)",
        summary.ticks, summary.elapsed_secs
    );
    println!(
        "player at ({:.2}, {:.2}) after walking {:.2} units, {} slides, {} stops",
        summary.player.x,
        summary.player.z,
        summary.player_distance,
        summary.player_slides,
        summary.player_blocks
    );
    println!(
        "items collected: {} ammo, {} health",
        summary.ammo_collected, summary.health_collected
    );
    println!(
        "monsters: {} spawned, {} spawn failures, {} alive",
        summary.monsters_spawned, summary.spawn_failures, summary.monsters_alive
    );
    println!(
        "monster moves: {} ({} slides, {} stops)",
        summary.monster_moves, summary.monster_slides, summary.monster_blocks
    );
    match summary.nearest_monster {
        Some(distance) => println!("nearest monster is {distance:.2} units away"),
        None => println!("no monsters in the maze"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let args = CliArgs::try_parse_from(["maze-shooter"]).expect("defaults are valid");
        assert_eq!(args.player_margin, Margin::PLAYER);
        assert_eq!(args.monster_margin, Margin::MONSTER);
        assert!(args.level.is_none());
    }

    #[test]
    fn negative_margin_is_rejected() {
        let result = CliArgs::try_parse_from(["maze-shooter", "--player-margin", "-0.1"]);
        assert!(result.is_err());
    }

    #[test]
    fn negative_heading_is_accepted() {
        let args = CliArgs::try_parse_from(["maze-shooter", "--heading-deg", "-90"])
            .expect("negative headings parse");
        assert_eq!(args.heading_deg, -90.0);
    }
}
