//! Path search over a partially learned [`CollisionMap`].
//!
//! [`find_path`] is A* with a Manhattan heuristic: moves cost one tile and
//! are 4-directional, so the heuristic never overestimates. Only
//! [`CollisionState::Open`] cells are expanded, but the goal itself may be in
//! any state; that is how the explorer walks into cells nobody has visited.
//!
//! Open-set ties are broken by insertion order, so a fixed map always yields
//! the same path.
//!
//! [`reachable_frontier`] is a breadth-first flood fill that collects the
//! unknown cells bordering the open region around a start point.
use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque};

use crate::collision::{CollisionMap, CollisionState};
use crate::types::{Direction, Point};

/// Entry in the A* open set (min-heap via reversed ordering).
#[derive(Debug, PartialEq, Eq)]
struct OpenEntry {
    f_score: u32,
    sequence: u64,
    point: Point,
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: smallest f_score, then oldest entry, is "greatest".
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Shortest 4-connected path from `from` to `to`, both inclusive.
///
/// The start cell is recorded as open first when it is unknown or blocked:
/// the bot is standing on it, so it cannot be a wall. Returns `None` when no
/// chain of open cells connects the two points.
pub fn find_path(map: &mut CollisionMap, from: Point, to: Point) -> Option<Vec<Point>> {
    match map.state_of(from) {
        CollisionState::Unknown => {
            tracing::debug!("recording start {}{} as open", map.name(), from);
            map.classify(from, false);
        }
        CollisionState::Blocked => {
            tracing::warn!("standing on {}{} recorded as blocked", map.name(), from);
            map.classify(from, false);
        }
        CollisionState::Open | CollisionState::Transport => {}
    }
    search(map, from, to)
}

fn search(map: &CollisionMap, from: Point, to: Point) -> Option<Vec<Point>> {
    let mut open = BinaryHeap::new();
    let mut came_from: HashMap<Point, Point> = HashMap::new();
    let mut g_score: HashMap<Point, u32> = HashMap::from([(from, 0)]);
    let mut closed: HashSet<Point> = HashSet::new();
    let mut sequence = 0u64;

    open.push(OpenEntry {
        f_score: from.manhattan(to),
        sequence,
        point: from,
    });

    while let Some(OpenEntry { point: current, .. }) = open.pop() {
        if current == to {
            return Some(reconstruct(&came_from, from, to));
        }
        if !closed.insert(current) {
            continue;
        }
        // Anything may be a destination, but only open cells are walked through.
        if !map.state_of(current).is_open() {
            continue;
        }

        let current_g = g_score.get(&current).copied().unwrap_or(u32::MAX);
        for (neighbor, state) in map.neighbors(current) {
            if closed.contains(&neighbor) || (neighbor != to && !state.is_open()) {
                continue;
            }
            let tentative = current_g + 1;
            if tentative < g_score.get(&neighbor).copied().unwrap_or(u32::MAX) {
                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative);
                sequence += 1;
                open.push(OpenEntry {
                    f_score: tentative + neighbor.manhattan(to),
                    sequence,
                    point: neighbor,
                });
            }
        }
    }

    tracing::info!("no path to {}{}", map.name(), to);
    None
}

fn reconstruct(came_from: &HashMap<Point, Point>, from: Point, to: Point) -> Vec<Point> {
    let mut path = vec![to];
    let mut current = to;
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    debug_assert_eq!(path.last(), Some(&from));
    path.reverse();
    path
}

/// Unknown cells adjacent to the open region reachable from `from`.
///
/// The start cell is treated as reached whatever its state. Every cell is
/// visited at most once, so cyclic open regions terminate.
pub fn reachable_frontier(map: &CollisionMap, from: Point) -> BTreeSet<Point> {
    let mut frontier = BTreeSet::new();
    let mut visited = HashSet::from([from]);
    let mut queue = VecDeque::from([from]);

    while let Some(current) = queue.pop_front() {
        for (neighbor, state) in map.neighbors(current) {
            if !visited.insert(neighbor) {
                continue;
            }
            match state {
                CollisionState::Open => queue.push_back(neighbor),
                CollisionState::Unknown => {
                    frontier.insert(neighbor);
                }
                CollisionState::Blocked | CollisionState::Transport => {}
            }
        }
    }

    frontier
}

/// Reduces a 4-connected path to its turning points.
///
/// Locomotion holds one key per straight segment, so only the first point,
/// every corner, and the final point are kept. A path containing anything
/// other than unit orthogonal steps is returned unchanged.
pub fn condense(path: &[Point]) -> Vec<Point> {
    if path.len() < 3 {
        return path.to_vec();
    }

    let mut directions = Vec::with_capacity(path.len() - 1);
    for pair in path.windows(2) {
        match Direction::between(pair[0], pair[1]) {
            Some(direction) => directions.push(direction),
            None => {
                tracing::error!("cannot condense path with hop {} -> {}", pair[0], pair[1]);
                return path.to_vec();
            }
        }
    }

    let mut condensed = vec![path[0]];
    for (index, pair) in directions.windows(2).enumerate() {
        if pair[0] != pair[1] {
            condensed.push(path[index + 1]);
        }
    }
    condensed.push(path[path.len() - 1]);
    condensed
}
