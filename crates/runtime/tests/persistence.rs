//! Collision maps surviving restarts through the file repository.
mod common;

use std::sync::Arc;

use common::Lockstep;
use dbot_core::{CollisionMap, CollisionState, Location, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use runtime::{
    Bot, CollisionRepository, FileCollisionRepository, RuntimeConfig, SimMap, SimulatedServer,
};
use tempfile::TempDir;

const ROOM: &str = "\
#######
#.....#
#.#.#.#
#.....#
#######";

fn config(dir: &TempDir) -> RuntimeConfig {
    RuntimeConfig {
        data_dir: dir.path().to_path_buf(),
        ..RuntimeConfig::default()
    }
}

fn explorer(dir: &TempDir) -> Bot {
    let mut bot = Bot::builder("alpha")
        .config(config(dir))
        .seed(11)
        .build()
        .expect("file-backed bot should build");
    bot.start_exploration(None);
    bot
}

fn explore_room(bot: Bot) -> Lockstep {
    let mut world = Lockstep::new(SimulatedServer::new().with_map(SimMap::parse("room", ROOM)));
    world.join(bot, Location::new("room", Point::new(1, 1)));
    world
        .run_until(1_000, |world| world.bots[0].action_count() == 0)
        .expect("exploration should finish");
    world
}

#[test]
fn random_maps_survive_a_save_and_load() {
    let dir = TempDir::new().expect("tempdir");
    let repo = FileCollisionRepository::new(dir.path()).expect("repository");
    let mut rng = StdRng::seed_from_u64(2024);

    let mut saved = Vec::new();
    for index in 0..8 {
        let mut map = CollisionMap::new(format!("map_{index}"));
        for _ in 0..rng.random_range(1..60) {
            let point = Point::new(rng.random_range(-20..20), rng.random_range(-20..20));
            map.classify(point, rng.random_bool(0.4));
        }
        if rng.random_bool(0.5) {
            map.record_transport(
                Point::new(rng.random_range(30..40), 0),
                Location::new("overworld", Point::new(rng.random_range(0..50), 32)),
            );
        }
        repo.save(&map).expect("save");
        saved.push(map);
    }

    let mut names = repo.list_maps().expect("list");
    names.sort();
    assert_eq!(names.len(), saved.len());
    for map in &saved {
        assert!(repo.exists(map.name()));
        assert_eq!(repo.load(map.name()).expect("load").as_ref(), Some(map));
    }
}

/// Exploration finished by one process is not repeated by the next.
///
/// Phases:
/// 1. Explore the room with a file-backed bot; cleanup writes the map
/// 2. Start a fresh bot on the same data directory
/// 3. It declares the room complete without taking a step
#[test]
fn explored_map_is_reused_after_restart() {
    let dir = TempDir::new().expect("tempdir");

    // ============================================================================
    // Phase 1: first session explores and saves
    // ============================================================================
    let world = explore_room(explorer(&dir));
    assert!(world.said("alpha", "room map complete."));
    let path = config(&dir).maps_dir("alpha").join("room.json");
    assert!(path.exists(), "{} should be written", path.display());
    println!("✓ Saved {}", path.display());

    let on_disk = FileCollisionRepository::new(config(&dir).maps_dir("alpha"))
        .expect("repository")
        .load("room")
        .expect("load")
        .expect("room was saved");
    assert_eq!(on_disk.state_of(Point::new(2, 2)), CollisionState::Blocked);
    assert_eq!(on_disk.state_of(Point::new(5, 3)), CollisionState::Open);

    // ============================================================================
    // Phase 2: second session starts from the saved map
    // ============================================================================
    let mut world = Lockstep::new(SimulatedServer::new().with_map(SimMap::parse("room", ROOM)));
    world.join(explorer(&dir), Location::new("room", Point::new(1, 1)));
    let rounds = world
        .run_until(5, |world| world.bots[0].action_count() == 0)
        .expect("nothing left to explore");
    assert!(rounds <= 3);
    assert!(world.said("alpha", "room map complete."));
    assert_eq!(
        world.server.location_of("alpha"),
        Some(&Location::new("room", Point::new(1, 1)))
    );
    println!("✓ Restarted bot finished in {} rounds", rounds);
}
