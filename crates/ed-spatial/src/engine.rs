//! Point-to-point shortest paths: validate → snap → route.

use log::debug;
use rayon::prelude::*;

use ed_core::{Budget, GeoPoint};

use crate::router::{DijkstraRouter, Route, Router};
use crate::{RoadGraph, SpatialError, SpatialResult};

/// Answers "shortest road path between these two coordinates".
///
/// The engine holds no graph state: each query borrows an immutable
/// [`RoadGraph`], so one engine can serve any number of threads at once.
///
/// ```
/// use ed_core::GeoPoint;
/// use ed_spatial::{RoadGraphBuilder, ShortestPathEngine};
///
/// let mut b = RoadGraphBuilder::new();
/// let a = b.add_node(1, GeoPoint::new(0.0, 0.0));
/// let c = b.add_node(2, GeoPoint::new(0.0, 1.0));
/// b.add_road(a, c);
/// let graph = b.build().unwrap();
///
/// let route = ShortestPathEngine::new()
///     .find_shortest_path(&graph, GeoPoint::new(0.0, 0.1), GeoPoint::new(0.0, 0.9))
///     .unwrap();
/// assert_eq!(route.nodes.len(), 2);
/// assert!((route.distance_km() - 111.19).abs() < 0.01);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ShortestPathEngine<R: Router = DijkstraRouter> {
    router: R,
}

impl ShortestPathEngine<DijkstraRouter> {
    pub fn new() -> Self {
        Self { router: DijkstraRouter }
    }
}

impl<R: Router> ShortestPathEngine<R> {
    pub fn with_router(router: R) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    /// Shortest path from the node nearest `start` to the node nearest `end`.
    ///
    /// # Errors
    ///
    /// - [`SpatialError::InvalidCoordinate`] if either point is out of range.
    /// - [`SpatialError::EmptyGraph`] if `graph` has no nodes.
    /// - [`SpatialError::NoPathFound`] if the snapped end is unreachable.
    pub fn find_shortest_path(
        &self,
        graph: &RoadGraph,
        start: GeoPoint,
        end: GeoPoint,
    ) -> SpatialResult<Route> {
        self.find_shortest_path_within(graph, start, end, &Budget::unbounded())
    }

    /// Like [`find_shortest_path`](Self::find_shortest_path), giving up with
    /// [`SpatialError::Interrupted`] once `budget` is exhausted.
    pub fn find_shortest_path_within(
        &self,
        graph: &RoadGraph,
        start: GeoPoint,
        end: GeoPoint,
        budget: &Budget,
    ) -> SpatialResult<Route> {
        start.validate()?;
        end.validate()?;

        let (Some(from), Some(to)) = (graph.snap(start), graph.snap(end)) else {
            return Err(SpatialError::EmptyGraph);
        };
        debug!("route {start} → {end}: snapped to {from} → {to}");

        let route = self.router.route(graph, from, to, budget)?;
        debug!("route {from} → {to}: {} nodes, {:.1} m", route.nodes.len(), route.total_m);
        Ok(route)
    }

    /// Run independent queries concurrently against one shared graph.
    ///
    /// Results are returned in query order.  Each query gets its own
    /// Dijkstra state; only `graph` is shared.
    pub fn route_many(
        &self,
        graph: &RoadGraph,
        queries: &[(GeoPoint, GeoPoint)],
        budget: &Budget,
    ) -> Vec<SpatialResult<Route>> {
        queries
            .par_iter()
            .map(|&(start, end)| self.find_shortest_path_within(graph, start, end, budget))
            .collect()
    }
}
