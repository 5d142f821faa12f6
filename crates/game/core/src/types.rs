//! Grid coordinates and directions.
use std::fmt;

/// Discrete grid position expressed in tile coordinates.
///
/// The game uses screen orientation: `y` grows downward, so moving
/// [`Direction::Up`] decrements `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance, the exact move count on an open 4-connected grid.
    pub fn manhattan(self, other: Point) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The neighboring tile one step in `direction`.
    pub fn step(self, direction: Direction) -> Point {
        let (dx, dy) = direction.delta();
        Point::new(self.x + dx, self.y + dy)
    }

    /// The four orthogonal neighbors in [`Direction::ALL`] order.
    pub fn neighbors(self) -> [Point; 4] {
        Direction::ALL.map(|direction| self.step(direction))
    }

    /// True when `other` is within one tile on both axes (diagonals included).
    pub fn is_near(self, other: Point) -> bool {
        self.x.abs_diff(other.x) <= 1 && self.y.abs_diff(other.y) <= 1
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis of travel, used to track which movement was rejected by the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// One of the four directional inputs the game accepts.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::Up | Direction::Down => Axis::Vertical,
            Direction::Left | Direction::Right => Axis::Horizontal,
        }
    }

    /// Keyboard key bound to this direction in the game client.
    pub fn key(self) -> &'static str {
        match self {
            Direction::Up => "w",
            Direction::Down => "s",
            Direction::Left => "a",
            Direction::Right => "d",
        }
    }

    /// Direction of a single orthogonal step from `from` to `to`.
    pub fn between(from: Point, to: Point) -> Option<Direction> {
        match (to.x - from.x, to.y - from.y) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }
}

/// A point on a named map.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub map: String,
    pub point: Point,
}

impl Location {
    pub fn new(map: impl Into<String>, point: Point) -> Self {
        Self {
            map: map.into(),
            point,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.map, self.point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn up_decrements_y() {
        assert_eq!(Point::new(3, 3).step(Direction::Up), Point::new(3, 2));
        assert_eq!(Point::new(3, 3).step(Direction::Right), Point::new(4, 3));
    }

    #[test]
    fn between_rejects_diagonals_and_jumps() {
        let origin = Point::new(0, 0);
        assert_eq!(
            Direction::between(origin, Point::new(0, 1)),
            Some(Direction::Down)
        );
        assert_eq!(Direction::between(origin, Point::new(1, 1)), None);
        assert_eq!(Direction::between(origin, Point::new(0, 2)), None);
    }

    #[test]
    fn location_display_matches_transport_encoding() {
        let location = Location::new("town", Point::new(10, -2));
        assert_eq!(location.to_string(), "town(10, -2)");
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("UP".parse::<Direction>().ok(), Some(Direction::Up));
        assert_eq!(Direction::Left.to_string(), "left");
    }
}
