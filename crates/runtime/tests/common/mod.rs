//! Lock-step driver running bots against an in-process server.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use dbot_core::Location;
use runtime::{Bot, InMemoryCollisionRepo, OutboundCommand, SimulatedServer};

/// `TEST_MAP` from the pathing tests with every cell observed.
pub const TEST_GRID: &str = "\
##########
#.....#..#
#.###.##.#
#.###..#.#
#.###.##.#
#..##.#..#
#...#.#.##
#.....#..#
#.#.....##
##########";

pub fn bot(name: &str, friends: &[&str]) -> Bot {
    Bot::builder(name)
        .repository(Arc::new(InMemoryCollisionRepo::new()))
        .friends(friends.iter().copied())
        .seed(42)
        .build()
        .expect("in-memory bot should build")
}

pub struct Lockstep {
    pub server: SimulatedServer,
    pub bots: Vec<Bot>,
    pub now: Instant,
    pub chat: Vec<(String, String)>,
}

impl Lockstep {
    pub fn new(server: SimulatedServer) -> Self {
        Self {
            server,
            bots: Vec::new(),
            now: Instant::now(),
            chat: Vec::new(),
        }
    }

    /// Connects `bot` at `location` and returns its index.
    pub fn join(&mut self, bot: Bot, location: Location) -> usize {
        self.server.connect(bot.name(), location);
        self.bots.push(bot);
        self.bots.len() - 1
    }

    /// One action tick: deliver events, step every bot, apply their
    /// commands, move the avatars.
    pub fn round(&mut self) {
        for bot in &mut self.bots {
            for event in self.server.drain_events(bot.name()) {
                bot.handle_event(event);
            }
        }
        for bot in &mut self.bots {
            bot.step(self.now);
            let name = bot.name().to_string();
            for command in bot.drain_commands() {
                if let OutboundCommand::Chat { message, .. } = &command {
                    self.chat.push((name.clone(), message.clone()));
                }
                self.server.apply(&name, command);
            }
        }
        self.server.tick();
        self.now += Duration::from_millis(500);
    }

    /// Runs rounds until `done` holds. Returns the rounds taken, or `None`
    /// if `limit` ran out first.
    pub fn run_until(&mut self, limit: usize, mut done: impl FnMut(&mut Self) -> bool) -> Option<usize> {
        for round in 0..limit {
            if done(self) {
                return Some(round);
            }
            self.round();
        }
        None
    }

    pub fn said(&self, name: &str, message: &str) -> bool {
        self.chat.iter().any(|(who, what)| who == name && what == message)
    }
}
