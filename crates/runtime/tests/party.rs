//! Two bots forming a party through the simulator's click UI.
mod common;

use common::Lockstep;
use dbot_core::{Location, Point};
use runtime::{Bot, InMemoryCollisionRepo, SimMap, SimulatedServer};
use std::sync::Arc;

const HALL: &str = "\
##########
#........#
#........#
#........#
#........#
#........#
#........#
#........#
##########";

fn bot(name: &str, friend: &str) -> Bot {
    Bot::builder(name)
        .repository(Arc::new(InMemoryCollisionRepo::new()))
        .friends([friend])
        .seed(5)
        .build()
        .expect("bot should build")
}

/// Leader waits in place while the follower walks over and accepts.
///
/// Phases:
/// 1. alpha (leader) and beta (follower) sign in apart
/// 2. Both are asked for the same party
/// 3. Run until both actions finish; the server's roster must match
#[test]
fn leader_and_follower_end_up_in_one_party() {
    let mut world = Lockstep::new(SimulatedServer::new().with_map(SimMap::parse("hall", HALL)));
    world.join(bot("alpha", "beta"), Location::new("hall", Point::new(2, 2)));
    world.join(bot("beta", "alpha"), Location::new("hall", Point::new(6, 6)));

    // Let both see each other before asking for the party.
    world.round();
    for bot in &mut world.bots {
        bot.join_party(["beta", "alpha"]);
    }

    let rounds = world
        .run_until(200, |world| world.bots.iter().all(|bot| bot.action_count() == 0))
        .expect("party should form");
    println!("✓ Party formed in {} rounds", rounds);

    let roster = vec!["alpha".to_string(), "beta".to_string()];
    assert_eq!(world.server.party_of("alpha"), Some(roster.as_slice()));
    for bot in &world.bots {
        assert!(bot.party().is_complete(), "{} is not done", bot.name());
    }
    assert!(world.said("alpha", "ready!"));
    assert!(!world.said("beta", "ready!"));

    // beta stood beside its leader to accept
    let beta = world.server.location_of("beta").expect("beta is online");
    assert_eq!(beta.point, Point::new(1, 2));
}

/// Asking for a party of one is answered in chat without an action.
#[test]
fn solo_party_needs_no_action() {
    let mut world = Lockstep::new(SimulatedServer::new().with_map(SimMap::parse("hall", HALL)));
    world.join(bot("alpha", "beta"), Location::new("hall", Point::new(2, 2)));
    world.bots[0].join_party(["alpha"]);
    assert_eq!(world.bots[0].action_count(), 0);
    world.round();
    assert!(world.said("alpha", "I'm solo"));
}
