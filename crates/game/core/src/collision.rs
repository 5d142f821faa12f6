//! Incrementally learned occupancy grid for one named map.
//!
//! Every cell is in exactly one of four states: never observed
//! ([`CollisionState::Unknown`]), walkable ([`CollisionState::Open`]),
//! rejected by the server ([`CollisionState::Blocked`]), or a tile that
//! relocates the avatar ([`CollisionState::Transport`]).
//!
//! Several bot processes report into copies of the same map, so conflicting
//! observations are expected. They are logged and the newest observation
//! wins, except that a plain open/blocked report never erases a transport.
use std::collections::HashMap;

use crate::types::{Location, Point};

/// Classification of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CollisionState {
    Unknown,
    Open,
    Blocked,
    Transport,
}

impl CollisionState {
    #[inline]
    pub fn is_open(self) -> bool {
        matches!(self, CollisionState::Open)
    }

    #[inline]
    pub fn is_known(self) -> bool {
        !matches!(self, CollisionState::Unknown)
    }
}

/// What a write did to the map. Anomalies have already been logged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recorded {
    /// The cell was unknown and is now classified.
    New,
    /// The cell already held the same observation.
    Unchanged,
    /// A different open/blocked classification was replaced.
    Conflict { previous: CollisionState },
    /// A transport sits on the cell; the open/blocked report was dropped.
    TransportKept,
    /// A transport replaced an open/blocked classification or another target.
    TransportReplaced { previous: CollisionState },
}

impl Recorded {
    pub fn is_anomaly(&self) -> bool {
        !matches!(self, Recorded::New | Recorded::Unchanged)
    }
}

/// Sparse collision grid plus the transport edges discovered on one map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollisionMap {
    name: String,
    cells: HashMap<Point, bool>,
    transports: HashMap<Point, Location>,
}

impl CollisionMap {
    /// Creates an empty map: every cell unknown.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: HashMap::new(),
            transports: HashMap::new(),
        }
    }

    /// Rebuilds a map from previously persisted parts.
    ///
    /// Cells that also carry a transport are dropped so the loaded map keeps
    /// the one-state-per-cell invariant.
    pub fn from_parts(
        name: impl Into<String>,
        cells: impl IntoIterator<Item = (Point, bool)>,
        transports: impl IntoIterator<Item = (Point, Location)>,
    ) -> Self {
        let name = name.into();
        let transports: HashMap<Point, Location> = transports.into_iter().collect();
        let cells = cells
            .into_iter()
            .filter(|(point, _)| {
                let shadowed = transports.contains_key(point);
                if shadowed {
                    tracing::warn!("dropping cell {name}{point} shadowed by a transport");
                }
                !shadowed
            })
            .collect();
        Self {
            name,
            cells,
            transports,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state_of(&self, point: Point) -> CollisionState {
        if self.transports.contains_key(&point) {
            return CollisionState::Transport;
        }
        match self.cells.get(&point) {
            Some(true) => CollisionState::Blocked,
            Some(false) => CollisionState::Open,
            None => CollisionState::Unknown,
        }
    }

    pub fn transport_at(&self, point: Point) -> Option<&Location> {
        self.transports.get(&point)
    }

    /// Marks a cell open (`blocked == false`) or blocked.
    pub fn classify(&mut self, point: Point, blocked: bool) -> Recorded {
        if let Some(destination) = self.transports.get(&point) {
            tracing::warn!(
                "ignoring {} report at {}{} over transport to {}",
                if blocked { "blocked" } else { "open" },
                self.name,
                point,
                destination
            );
            return Recorded::TransportKept;
        }

        match self.cells.insert(point, blocked) {
            None => Recorded::New,
            Some(previous) if previous == blocked => Recorded::Unchanged,
            Some(previous) => {
                tracing::warn!("conflicting info at {}{}", self.name, point);
                Recorded::Conflict {
                    previous: if previous {
                        CollisionState::Blocked
                    } else {
                        CollisionState::Open
                    },
                }
            }
        }
    }

    /// Records that stepping on `point` relocates the avatar to `destination`.
    pub fn record_transport(&mut self, point: Point, destination: Location) -> Recorded {
        let previous = self.state_of(point);
        let outcome = match previous {
            CollisionState::Unknown => Recorded::New,
            CollisionState::Transport if self.transports.get(&point) == Some(&destination) => {
                Recorded::Unchanged
            }
            CollisionState::Transport => {
                tracing::warn!("conflicting transport at {}{}", self.name, point);
                Recorded::TransportReplaced { previous }
            }
            CollisionState::Open | CollisionState::Blocked => {
                tracing::warn!(
                    "transport overriding {} cell at {}{}",
                    previous,
                    self.name,
                    point
                );
                self.cells.remove(&point);
                Recorded::TransportReplaced { previous }
            }
        };
        self.transports.insert(point, destination);
        outcome
    }

    /// The four orthogonal neighbors of `point` with their states.
    pub fn neighbors(&self, point: Point) -> [(Point, CollisionState); 4] {
        point
            .neighbors()
            .map(|neighbor| (neighbor, self.state_of(neighbor)))
    }

    /// Iterates classified open/blocked cells as `(point, blocked)`.
    pub fn cells(&self) -> impl Iterator<Item = (Point, bool)> + '_ {
        self.cells.iter().map(|(point, blocked)| (*point, *blocked))
    }

    pub fn transports(&self) -> impl Iterator<Item = (Point, &Location)> + '_ {
        self.transports.iter().map(|(point, to)| (*point, to))
    }

    /// Number of cells in any known state.
    pub fn known_count(&self) -> usize {
        self.cells.len() + self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn fresh_map_is_unknown_everywhere() {
        let map = CollisionMap::new("town");
        assert_eq!(map.state_of(point(0, 0)), CollisionState::Unknown);
        assert!(map.is_empty());
    }

    #[test]
    fn classify_then_conflict_is_last_write_wins() {
        let mut map = CollisionMap::new("town");
        assert_eq!(map.classify(point(1, 1), false), Recorded::New);
        assert_eq!(map.classify(point(1, 1), false), Recorded::Unchanged);

        let outcome = map.classify(point(1, 1), true);
        assert_eq!(
            outcome,
            Recorded::Conflict {
                previous: CollisionState::Open
            }
        );
        assert!(outcome.is_anomaly());
        assert_eq!(map.state_of(point(1, 1)), CollisionState::Blocked);
    }

    #[test]
    fn classify_never_erases_a_transport() {
        let mut map = CollisionMap::new("town");
        map.record_transport(point(4, 0), Location::new("overworld", point(9, 9)));

        assert_eq!(map.classify(point(4, 0), true), Recorded::TransportKept);
        assert_eq!(map.state_of(point(4, 0)), CollisionState::Transport);
    }

    #[test]
    fn transport_replaces_cell_classification() {
        let mut map = CollisionMap::new("town");
        map.classify(point(2, 2), false);

        let outcome = map.record_transport(point(2, 2), Location::new("inn", point(1, 1)));
        assert_eq!(
            outcome,
            Recorded::TransportReplaced {
                previous: CollisionState::Open
            }
        );
        assert_eq!(map.state_of(point(2, 2)), CollisionState::Transport);
        assert_eq!(map.cells().count(), 0);
    }

    #[test]
    fn transport_to_a_new_target_is_reported() {
        let mut map = CollisionMap::new("town");
        let first = Location::new("inn", point(1, 1));
        let second = Location::new("shop", point(3, 3));
        assert_eq!(map.record_transport(point(0, 5), first.clone()), Recorded::New);
        assert_eq!(map.record_transport(point(0, 5), first), Recorded::Unchanged);
        assert!(map.record_transport(point(0, 5), second.clone()).is_anomaly());
        assert_eq!(map.transport_at(point(0, 5)), Some(&second));
    }

    #[test]
    fn neighbors_are_orthogonal_only() {
        let mut map = CollisionMap::new("town");
        map.classify(point(5, 4), true);
        map.classify(point(6, 5), false);

        let neighbors = map.neighbors(point(5, 5));
        assert_eq!(
            neighbors,
            [
                (point(5, 4), CollisionState::Blocked),
                (point(5, 6), CollisionState::Unknown),
                (point(4, 5), CollisionState::Unknown),
                (point(6, 5), CollisionState::Open),
            ]
        );
    }

    #[test]
    fn from_parts_drops_cells_shadowed_by_transports() {
        let map = CollisionMap::from_parts(
            "town",
            [(point(0, 0), false), (point(1, 0), true)],
            [(point(1, 0), Location::new("inn", point(2, 2)))],
        );
        assert_eq!(map.state_of(point(0, 0)), CollisionState::Open);
        assert_eq!(map.state_of(point(1, 0)), CollisionState::Transport);
        assert_eq!(map.known_count(), 2);
    }
}
