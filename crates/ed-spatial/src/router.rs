//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! [`ShortestPathEngine`](crate::ShortestPathEngine) calls routing via the
//! [`Router`] trait, so applications can swap in A* or contraction
//! hierarchies without touching snapping or validation.
//!
//! # Cost units
//!
//! Edge weight is the geodesic length of the edge in **metres** (`f64`).
//! `Route` stores metres; [`Route::distance_km`] converts once at the API
//! boundary.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use ed_core::{Budget, GeoPoint, NodeId};

use crate::graph::RoadGraph;
use crate::{SpatialError, SpatialResult};

/// Pops between two budget polls.  The first pop always polls.
const BUDGET_POLL_INTERVAL: u32 = 256;

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query: the node sequence from source to
/// destination (both inclusive) and its total geodesic length.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Nodes to traverse in order.  Never empty.
    pub nodes: Vec<NodeId>,
    /// Sum of edge lengths along `nodes`, in metres.
    pub total_m: f64,
}

impl Route {
    #[inline]
    pub fn distance_km(&self) -> f64 {
        self.total_m / 1_000.0
    }

    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Node positions along the route, ready to draw as a polyline.
    pub fn coordinates(&self, graph: &RoadGraph) -> Vec<GeoPoint> {
        graph.coordinates(&self.nodes)
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one instance can serve
/// concurrent queries against a shared [`RoadGraph`].
pub trait Router: Send + Sync {
    /// Compute a route from `from` to `to`.
    ///
    /// `from == to` yields a single-node route of length 0.  An unreachable
    /// `to` yields [`SpatialError::NoPathFound`]; an exhausted `budget`
    /// yields [`SpatialError::Interrupted`].
    fn route(
        &self,
        graph: &RoadGraph,
        from: NodeId,
        to: NodeId,
        budget: &Budget,
    ) -> SpatialResult<Route>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Single-source Dijkstra over the CSR road graph, stopping as soon as the
/// destination is settled.
///
/// Weights are non-negative geodesic lengths, so the first time the
/// destination leaves the queue its distance is final.  The heap is keyed by
/// `(distance, NodeId)`; equal-distance frontiers therefore settle in
/// ascending `NodeId` order and the result is deterministic.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(
        &self,
        graph: &RoadGraph,
        from: NodeId,
        to: NodeId,
        budget: &Budget,
    ) -> SpatialResult<Route> {
        dijkstra(graph, from, to, budget)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

fn dijkstra(
    graph: &RoadGraph,
    from: NodeId,
    to: NodeId,
    budget: &Budget,
) -> SpatialResult<Route> {
    for node in [from, to] {
        if !graph.contains(node) {
            return Err(SpatialError::NodeNotFound(node));
        }
    }
    if from == to {
        return Ok(Route { nodes: vec![from], total_m: 0.0 });
    }

    let n = graph.node_count();
    // dist[v] = best known length (m) to reach v.
    let mut dist = vec![f64::INFINITY; n];
    // prev[v] = node that reached v; INVALID for unreached nodes.
    let mut prev = vec![NodeId::INVALID; n];

    dist[from.index()] = 0.0;

    // Min-heap: Reverse makes BinaryHeap (max) behave as min-heap.
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((OrderedFloat(0.0), from)));

    let mut pops: u32 = 0;
    while let Some(Reverse((OrderedFloat(cost), node))) = heap.pop() {
        if pops % BUDGET_POLL_INTERVAL == 0 && budget.is_exhausted() {
            return Err(SpatialError::Interrupted);
        }
        pops = pops.wrapping_add(1);

        if node == to {
            return Ok(reconstruct(&prev, from, to, cost));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in graph.out_edges(node) {
            let neighbor = graph.edge_to[edge.index()];
            let new_cost = cost + graph.edge_length_m(edge);

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev[neighbor.index()] = node;
                heap.push(Reverse((OrderedFloat(new_cost), neighbor)));
            }
        }
    }

    Err(SpatialError::NoPathFound { from, to })
}

fn reconstruct(prev: &[NodeId], from: NodeId, to: NodeId, total_m: f64) -> Route {
    let mut nodes = vec![to];
    let mut cur = to;
    while cur != from {
        cur = prev[cur.index()];
        nodes.push(cur);
    }
    nodes.reverse();
    Route { nodes, total_m }
}
