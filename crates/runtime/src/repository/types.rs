//! On-disk shape of a collision map.
//!
//! Coordinates are stored as nested string maps (`x -> y -> value`) and
//! transport destinations as `"mapname(x, y)"` strings, so files stay
//! readable and diffable by hand.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dbot_core::{CollisionMap, Location, Point};

use super::error::{RepositoryError, Result};

type Nested<T> = BTreeMap<String, BTreeMap<String, T>>;

/// Serialized collision map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionMapFile {
    pub name: String,
    /// `x -> y -> blocked`.
    #[serde(alias = "map")]
    pub cells: Nested<bool>,
    /// `x -> y -> "mapname(x, y)"`.
    #[serde(default)]
    pub transports: Nested<String>,
}

impl From<&CollisionMap> for CollisionMapFile {
    fn from(map: &CollisionMap) -> Self {
        let mut cells: Nested<bool> = BTreeMap::new();
        for (point, blocked) in map.cells() {
            cells
                .entry(point.x.to_string())
                .or_default()
                .insert(point.y.to_string(), blocked);
        }

        let mut transports: Nested<String> = BTreeMap::new();
        for (point, destination) in map.transports() {
            transports
                .entry(point.x.to_string())
                .or_default()
                .insert(point.y.to_string(), encode_location(destination));
        }

        Self {
            name: map.name().to_string(),
            cells,
            transports,
        }
    }
}

impl TryFrom<CollisionMapFile> for CollisionMap {
    type Error = RepositoryError;

    fn try_from(file: CollisionMapFile) -> Result<Self> {
        let mut cells = Vec::new();
        for (x, column) in &file.cells {
            for (y, blocked) in column {
                cells.push((parse_point(x, y)?, *blocked));
            }
        }

        let mut transports = Vec::new();
        for (x, column) in &file.transports {
            for (y, destination) in column {
                transports.push((parse_point(x, y)?, decode_location(destination)?));
            }
        }

        Ok(CollisionMap::from_parts(file.name, cells, transports))
    }
}

fn parse_point(x: &str, y: &str) -> Result<Point> {
    let parse = |value: &str| {
        value
            .trim()
            .parse::<i32>()
            .map_err(|_| RepositoryError::CorruptedData(format!("bad coordinate {value:?}")))
    };
    Ok(Point::new(parse(x)?, parse(y)?))
}

/// Formats a transport destination as `mapname(x, y)`.
pub fn encode_location(location: &Location) -> String {
    location.to_string()
}

/// Parses `mapname(x, y)` back into a [`Location`].
pub fn decode_location(encoded: &str) -> Result<Location> {
    let corrupted = || RepositoryError::CorruptedData(format!("bad transport {encoded:?}"));

    let open = encoded.rfind('(').ok_or_else(corrupted)?;
    let (map, rest) = encoded.split_at(open);
    let inner = rest
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(corrupted)?;
    let (x, y) = inner.split_once(',').ok_or_else(corrupted)?;
    if map.is_empty() {
        return Err(corrupted());
    }

    Ok(Location::new(map, parse_point(x, y)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_strings_decode() {
        assert_eq!(
            decode_location("town(39, 0)").unwrap(),
            Location::new("town", Point::new(39, 0))
        );
        assert_eq!(
            decode_location("cave(-3,12)").unwrap(),
            Location::new("cave", Point::new(-3, 12))
        );
    }

    #[test]
    fn malformed_transport_strings_are_corrupted_data() {
        for bad in ["town", "town(1)", "town(1, y)", "(1, 2)", "town(1, 2"] {
            assert!(
                matches!(decode_location(bad), Err(RepositoryError::CorruptedData(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn file_uses_nested_string_keys() {
        let mut map = CollisionMap::new("inn");
        map.classify(Point::new(2, 7), true);
        map.record_transport(Point::new(4, 9), Location::new("town", Point::new(32, 16)));

        let json = serde_json::to_value(CollisionMapFile::from(&map)).unwrap();
        assert_eq!(json["cells"]["2"]["7"], serde_json::json!(true));
        assert_eq!(json["transports"]["4"]["9"], serde_json::json!("town(32, 16)"));
    }

    #[test]
    fn legacy_map_key_is_accepted() {
        let file: CollisionMapFile = serde_json::from_str(
            r#"{"name": "shop", "map": {"1": {"1": false}}, "transports": {}}"#,
        )
        .unwrap();
        let map = CollisionMap::try_from(file).unwrap();
        assert_eq!(map.state_of(Point::new(1, 1)), dbot_core::CollisionState::Open);
    }
}
