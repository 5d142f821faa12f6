//! Party membership: who is grouped now and who should be.
//!
//! `players` mirrors the roster last confirmed by the server while `target`
//! is the composition the bot is working toward. The first name of each list
//! is its leader. Both lists hold at most [`ExplorationConfig::MAX_PARTY_SIZE`]
//! names; exceeding that is a logic bug and panics.
use std::collections::BTreeSet;

use crate::config::ExplorationConfig;

/// Which side of party formation a bot plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Leader,
    Follower,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Party {
    me: String,
    players: Vec<String>,
    target: Vec<String>,
}

impl Party {
    /// A party of one: this bot alone, aiming for nothing more.
    pub fn new(me: impl Into<String>) -> Self {
        let me = me.into();
        Self {
            players: vec![me.clone()],
            target: vec![me.clone()],
            me,
        }
    }

    pub fn me(&self) -> &str {
        &self.me
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn target(&self) -> &[String] {
        &self.target
    }

    pub fn leader(&self) -> Option<&str> {
        self.players.first().map(String::as_str)
    }

    pub fn leader_is_me(&self) -> bool {
        self.leader() == Some(self.me.as_str())
    }

    /// Index of this bot in the live roster.
    pub fn position(&self) -> Option<usize> {
        self.players.iter().position(|name| *name == self.me)
    }

    pub fn target_leader(&self) -> Option<&str> {
        self.target.first().map(String::as_str)
    }

    pub fn target_leader_is_me(&self) -> bool {
        self.target_leader() == Some(self.me.as_str())
    }

    /// Index of this bot in the target composition.
    pub fn target_position(&self) -> Option<usize> {
        self.target.iter().position(|name| *name == self.me)
    }

    /// Role this bot plays while forming the target party.
    pub fn target_role(&self) -> Role {
        if self.target_leader_is_me() {
            Role::Leader
        } else {
            Role::Follower
        }
    }

    /// Live roster equals the target, ignoring order.
    pub fn is_complete(&self) -> bool {
        let players: BTreeSet<&String> = self.players.iter().collect();
        let target: BTreeSet<&String> = self.target.iter().collect();
        players == target
    }

    pub fn solo(&self) -> bool {
        self.players.len() == 1
    }

    pub fn in_party(&self) -> bool {
        self.players.len() > 1
    }

    /// Sets the composition to work toward. Names are sorted so every bot
    /// given the same group agrees on its leader.
    pub fn set_target(&mut self, target: impl IntoIterator<Item = impl Into<String>>) {
        let mut target: Vec<String> = target.into_iter().map(Into::into).collect();
        assert!(
            target.len() <= ExplorationConfig::MAX_PARTY_SIZE,
            "party target exceeds {} members: {target:?}",
            ExplorationConfig::MAX_PARTY_SIZE
        );
        target.sort();
        self.target = target;
    }

    /// Replaces the live roster with a server-confirmed one.
    pub fn update_party(&mut self, players: impl IntoIterator<Item = impl Into<String>>) {
        let players: Vec<String> = players.into_iter().map(Into::into).collect();
        assert!(
            players.len() <= ExplorationConfig::MAX_PARTY_SIZE,
            "party roster exceeds {} members: {players:?}",
            ExplorationConfig::MAX_PARTY_SIZE
        );
        tracing::debug!("new party: {players:?}");
        self.players = players;
    }

    /// Forgets a player who went offline.
    pub fn player_left(&mut self, player: &str) {
        self.players.retain(|name| name != player);
        self.target.retain(|name| name != player);
    }

    /// Group this bot belongs to when `logged_in` bots are split into parties.
    ///
    /// The logged-in names (minus `exclude`) are sorted and chunked into
    /// groups of [`ExplorationConfig::MAX_PARTY_SIZE`]; a bot missing from
    /// every chunk goes alone.
    pub fn identify_party<'a>(
        &self,
        logged_in: impl IntoIterator<Item = &'a str>,
        exclude: &[&str],
    ) -> Vec<String> {
        let friends: BTreeSet<&str> = logged_in
            .into_iter()
            .filter(|name| !exclude.contains(name))
            .collect();
        let friends: Vec<&str> = friends.into_iter().collect();

        friends
            .chunks(ExplorationConfig::MAX_PARTY_SIZE)
            .find(|group| group.contains(&self.me.as_str()))
            .map(|group| group.iter().map(|name| name.to_string()).collect())
            .unwrap_or_else(|| vec![self.me.clone()])
    }
}
