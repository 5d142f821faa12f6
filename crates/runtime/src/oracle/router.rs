//! Static way-point routes between named maps.
use std::collections::HashMap;

use dbot_core::{Location, Point};

/// Knows how to leave one map toward another.
pub trait MapRouter: Send + Sync {
    /// Way-points on `from.map` that lead toward `goal_map`, or `None` when no
    /// route is known.
    fn route_to_map(&self, from: &Location, goal_map: &str) -> Option<Vec<Point>>;
}

/// Router backed by a fixed table of `(from map, to map) -> way-points`.
#[derive(Clone, Debug, Default)]
pub struct StaticRouter {
    routes: HashMap<(String, String), Vec<Point>>,
}

impl StaticRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(
        mut self,
        from_map: impl Into<String>,
        to_map: impl Into<String>,
        points: impl IntoIterator<Item = (i32, i32)>,
    ) -> Self {
        self.routes.insert(
            (from_map.into(), to_map.into()),
            points.into_iter().map(Point::from).collect(),
        );
        self
    }

    /// Exits from the buildings around town back onto its streets.
    pub fn town() -> Self {
        Self::new()
            .with_route("overworld", "town", [(19, 29), (19, 32)])
            .with_route("inn", "town", [(22, 12), (22, 16)])
            .with_route("shop", "town", [(13, 16), (13, 20)])
            .with_route("armory", "town", [(16, 16), (16, 20)])
            .with_route("maika", "town", [(14, 11), (14, 15)])
            .with_route("clothier", "town", [(11, 16), (11, 20)])
            .with_route("town", "overworld", [(39, 6), (39, 0)])
    }
}

impl MapRouter for StaticRouter {
    fn route_to_map(&self, from: &Location, goal_map: &str) -> Option<Vec<Point>> {
        self.routes
            .get(&(from.map.clone(), goal_map.to_string()))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn town_router_knows_building_exits() {
        let router = StaticRouter::town();
        let from = Location::new("inn", Point::new(5, 5));
        assert_eq!(
            router.route_to_map(&from, "town"),
            Some(vec![Point::new(22, 12), Point::new(22, 16)])
        );
        assert_eq!(router.route_to_map(&from, "overworld"), None);
    }
}
