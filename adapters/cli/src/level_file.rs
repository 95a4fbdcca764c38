use std::{fs, path::Path};

use anyhow::{Context, Result};
use maze_shooter_core::LevelLayout;

/// Arena used when no level file is supplied on the command line.
const DEMO_LEVEL: &str = r#"{
    "width": 14,
    "height": 10,
    "cells": [
        [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
        [1, 0, 0, 3, 0, 0, 1, 1, 0, 0, 0, 5, 0, 1],
        [1, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 1],
        [1, 0, 2, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 1],
        [1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1],
        [1, 0, 0, 0, 0, 1, 0, 0, 0, 4, 0, 0, 0, 1],
        [1, 0, 5, 0, 0, 0, 0, 0, 0, 0, 0, 0, 5, 1],
        [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
        [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1]
    ],
    "player_start": { "x": 2.0, "z": 2.0 }
}"#;

/// Reads and decodes a JSON level file.
///
/// Only the JSON shape is checked here; grid validation happens when the
/// world is built from the returned layout.
pub(crate) fn load(path: &Path) -> Result<LevelLayout> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file {}", path.display()))?;
    parse(&text).with_context(|| format!("failed to parse level file {}", path.display()))
}

/// Decodes a level from its JSON text.
pub(crate) fn parse(text: &str) -> Result<LevelLayout, serde_json::Error> {
    serde_json::from_str(text)
}

/// Built-in arena with walls, columns, items and monster spawn points.
pub(crate) fn demo() -> Result<LevelLayout> {
    parse(DEMO_LEVEL).context("built-in demo level is malformed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_shooter_core::Position;
    use maze_shooter_world::{Config, World};

    #[test]
    fn demo_level_builds_a_world() {
        let layout = demo().expect("demo level parses");
        assert_eq!((layout.width, layout.height), (14, 10));
        assert_eq!(layout.player_start, Position::new(2.0, 2.0));

        let world = World::new(&layout, Config::default());
        assert!(world.is_ok(), "{world:?}");
    }

    #[test]
    fn missing_fields_are_reported() {
        let error = parse(r#"{ "width": 2, "height": 2 }"#).expect_err("cells are required");
        assert!(error.to_string().contains("cells"), "{error}");
    }

    #[test]
    fn missing_file_names_the_path() {
        let error = load(Path::new("definitely/not/here.json")).expect_err("file is absent");
        assert!(format!("{error:#}").contains("definitely/not/here.json"));
    }
}
