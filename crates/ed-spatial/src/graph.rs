//! Road graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Edges carry no stored weight.  [`RoadGraph::edge_length_m`] derives the
//! length from the endpoint positions on demand, so the graph can never
//! disagree with the distance metric.
//!
//! # Connectivity
//!
//! By default [`RoadGraphBuilder::build`] keeps only the largest strongly
//! connected component, so every query between two in-graph nodes has a
//! path.  [`ComponentPolicy::KeepAll`] disables the restriction.
//!
//! # Snapping
//!
//! [`RoadGraph::snap`] maps an arbitrary point to the nearest node.  The
//! default is a linear haversine scan (ties → lowest `NodeId`).
//! [`SnapStrategy::Indexed`] bulk-loads an R-tree (via `rstar`) over
//! unit-sphere coordinates.  Chord length is monotonic in great-circle
//! distance, so both strategies agree except at floating-point near-ties,
//! where the two metrics can round differently.

use std::cmp::Reverse;
use std::fmt;

use log::{debug, info};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::{FxHashMap, FxHashSet};

use ed_core::{EdgeId, GeoPoint, NodeId, haversine_km};

use crate::{SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a unit-sphere `[x, y, z]` point
/// with the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 3],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared chord length between unit vectors.
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

// ── Policies ──────────────────────────────────────────────────────────────────

/// How [`RoadGraph::snap`] finds the nearest node.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum SnapStrategy {
    /// O(n) haversine scan over all nodes.
    #[default]
    Linear,
    /// R-tree nearest-neighbour query, O(log n) per snap.
    Indexed,
}

/// Which nodes survive [`RoadGraphBuilder::build`].
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum ComponentPolicy {
    /// Keep the largest strongly connected component.  Ties go to the
    /// component containing the earliest-added node.
    #[default]
    LargestStronglyConnected,
    /// Keep every node and edge.
    KeepAll,
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Immutable directed road graph in CSR format.
///
/// `RoadGraph` is `Send + Sync` and never mutated after construction; share a
/// single instance across concurrent queries with `Arc<RoadGraph>`.
///
/// Do not construct directly; use [`RoadGraphBuilder`].
pub struct RoadGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Geographic position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    /// External key (e.g. the map provider's node id) of each node.
    pub node_key: Vec<u64>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    /// Source node of each edge.
    pub edge_from: Vec<NodeId>,

    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,

    key_index:   FxHashMap<u64, NodeId>,
    spatial_idx: Option<RTree<NodeEntry>>,
}

impl RoadGraph {
    /// Construct an empty graph with no nodes or edges.
    ///
    /// Every routing request against it fails with
    /// [`SpatialError::EmptyGraph`].
    pub fn empty() -> Self {
        assemble(Vec::new(), Vec::new(), Vec::new(), SnapStrategy::Linear)
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    pub fn snap_strategy(&self) -> SnapStrategy {
        if self.spatial_idx.is_some() { SnapStrategy::Indexed } else { SnapStrategy::Linear }
    }

    // ── Node lookup ───────────────────────────────────────────────────────

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    /// Position of `node`.
    ///
    /// # Panics
    /// Panics if `node` does not belong to this graph.
    #[inline]
    pub fn position(&self, node: NodeId) -> GeoPoint {
        self.node_pos[node.index()]
    }

    /// Resolve an external node key to this graph's `NodeId`.
    ///
    /// Returns `None` for unknown keys and for nodes dropped by the
    /// strongly-connected restriction.
    pub fn node_by_key(&self, key: u64) -> Option<NodeId> {
        self.key_index.get(&key).copied()
    }

    /// Positions of `nodes`, in order.  Used to turn a route into a polyline.
    pub fn coordinates(&self, nodes: &[NodeId]) -> Vec<GeoPoint> {
        nodes.iter().map(|&n| self.position(n)).collect()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// A contiguous index range; no allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Out-degree of `node` (number of outgoing edges).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// Destinations of `node`'s outgoing edges, in insertion order.
    #[inline]
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges(node).map(|e| self.edge_to[e.index()])
    }

    /// Geodesic length of `edge` in metres, computed from its endpoints.
    #[inline]
    pub fn edge_length_m(&self, edge: EdgeId) -> f64 {
        let from = self.node_pos[self.edge_from[edge.index()].index()];
        let to   = self.node_pos[self.edge_to[edge.index()].index()];
        from.distance_m(to)
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` of the node nearest to `pos`.
    ///
    /// Equidistant candidates resolve to the lowest `NodeId`.  The indexed
    /// strategy measures chord length, so at floating-point near-ties it may
    /// pick a different node than the linear scan.  Returns `None` only if
    /// the graph has no nodes.
    pub fn snap(&self, pos: GeoPoint) -> Option<NodeId> {
        match &self.spatial_idx {
            Some(idx) => snap_indexed(idx, pos),
            None      => self.snap_linear(pos),
        }
    }

    fn snap_linear(&self, pos: GeoPoint) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for (i, &p) in self.node_pos.iter().enumerate() {
            let d = haversine_km(pos, p);
            // Strict `<` keeps the first-encountered node on ties.
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((NodeId(i as u32), d));
            }
        }
        best.map(|(id, _)| id)
    }
}

impl fmt::Debug for RoadGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoadGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .field("snapping", &self.snap_strategy())
            .finish()
    }
}

fn snap_indexed(idx: &RTree<NodeEntry>, pos: GeoPoint) -> Option<NodeId> {
    let query = pos.to_unit_vector();
    let mut iter = idx.nearest_neighbor_iter_with_distance_2(&query);
    let (first, best_d2) = iter.next()?;
    let mut best = first.id;
    // The iterator yields in non-decreasing distance; scan the tied run.
    for (entry, d2) in iter {
        if d2 > best_d2 {
            break;
        }
        best = best.min(entry.id);
    }
    Some(best)
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// `NodeId`s returned by [`add_node`](Self::add_node) are provisional: the
/// strongly-connected restriction renumbers surviving nodes (preserving
/// their relative order).  Use [`RoadGraph::node_by_key`] afterwards.
///
/// # Example
///
/// ```
/// use ed_core::GeoPoint;
/// use ed_spatial::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new();
/// let a = b.add_node(1, GeoPoint::new(27.70, 85.31));
/// let c = b.add_node(2, GeoPoint::new(27.71, 85.32));
/// b.add_road(a, c);
/// let graph = b.build().unwrap();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 2); // bidirectional
/// ```
pub struct RoadGraphBuilder {
    keys:      Vec<u64>,
    positions: Vec<GeoPoint>,
    raw_edges: Vec<RawEdge>,
    policy:    ComponentPolicy,
    snapping:  SnapStrategy,
}

#[derive(Copy, Clone)]
struct RawEdge {
    from: NodeId,
    to:   NodeId,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self {
            keys:      Vec::new(),
            positions: Vec::new(),
            raw_edges: Vec::new(),
            policy:    ComponentPolicy::default(),
            snapping:  SnapStrategy::default(),
        }
    }

    /// Pre-allocate for the expected number of nodes and edges to reduce
    /// reallocations when bulk-loading an export.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            keys:      Vec::with_capacity(nodes),
            positions: Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
            ..Self::new()
        }
    }

    pub fn component_policy(mut self, policy: ComponentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn snapping(mut self, snapping: SnapStrategy) -> Self {
        self.snapping = snapping;
        self
    }

    /// Add a node under external `key` and return its provisional `NodeId`
    /// (sequential from 0).
    pub fn add_node(&mut self, key: u64, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.positions.len() as u32);
        self.keys.push(key);
        self.positions.push(pos);
        id
    }

    /// Add a **directed** edge from `from` to `to`.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId) {
        self.raw_edges.push(RawEdge { from, to });
    }

    /// Convenience: add edges in **both directions** for a two-way road.
    pub fn add_road(&mut self, a: NodeId, b: NodeId) {
        self.add_directed_edge(a, b);
        self.add_directed_edge(b, a);
    }

    pub fn node_count(&self) -> usize { self.positions.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// # Errors
    ///
    /// - [`SpatialError::InvalidCoordinate`] for a node outside legal ranges.
    /// - [`SpatialError::DuplicateNodeKey`] if a key was added twice.
    /// - [`SpatialError::NodeNotFound`] for an edge endpoint never added.
    pub fn build(self) -> SpatialResult<RoadGraph> {
        let node_count = self.positions.len();

        for &pos in &self.positions {
            pos.validate()?;
        }

        let mut seen: FxHashSet<u64> = FxHashSet::default();
        seen.reserve(node_count);
        for &key in &self.keys {
            if !seen.insert(key) {
                return Err(SpatialError::DuplicateNodeKey(key));
            }
        }

        for e in &self.raw_edges {
            for end in [e.from, e.to] {
                if end.index() >= node_count {
                    return Err(SpatialError::NodeNotFound(end));
                }
            }
        }

        let keep = match self.policy {
            ComponentPolicy::KeepAll => vec![true; node_count],
            ComponentPolicy::LargestStronglyConnected => {
                largest_strongly_connected(node_count, &self.raw_edges)
            }
        };

        // Renumber survivors in insertion order.
        let mut remap = vec![NodeId::INVALID; node_count];
        let mut positions = Vec::with_capacity(node_count);
        let mut keys = Vec::with_capacity(node_count);
        for (i, &kept) in keep.iter().enumerate() {
            if kept {
                remap[i] = NodeId(positions.len() as u32);
                positions.push(self.positions[i]);
                keys.push(self.keys[i]);
            }
        }

        let edges: Vec<RawEdge> = self
            .raw_edges
            .iter()
            .filter(|e| keep[e.from.index()] && keep[e.to.index()])
            .map(|e| RawEdge { from: remap[e.from.index()], to: remap[e.to.index()] })
            .collect();

        let dropped = node_count - positions.len();
        if dropped > 0 {
            info!(
                "road graph: dropped {dropped} of {node_count} nodes outside the largest strongly connected component"
            );
        }

        let graph = assemble(positions, keys, edges, self.snapping);
        info!(
            "road graph built: {} nodes, {} edges, {:?} snapping",
            graph.node_count(),
            graph.edge_count(),
            graph.snap_strategy()
        );
        Ok(graph)
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Build helpers ─────────────────────────────────────────────────────────────

/// Membership mask of the largest strongly connected component.
fn largest_strongly_connected(node_count: usize, edges: &[RawEdge]) -> Vec<bool> {
    let mut g: DiGraph<(), ()> = DiGraph::with_capacity(node_count, edges.len());
    for _ in 0..node_count {
        g.add_node(());
    }
    for e in edges {
        g.add_edge(NodeIndex::new(e.from.index()), NodeIndex::new(e.to.index()), ());
    }

    let components = tarjan_scc(&g);
    debug!("road graph: {} strongly connected components", components.len());

    let mut keep = vec![false; node_count];
    let largest = components.iter().max_by_key(|c| {
        let first = c.iter().map(|n| n.index()).min().unwrap_or(usize::MAX);
        (c.len(), Reverse(first))
    });
    if let Some(component) = largest {
        for n in component {
            keep[n.index()] = true;
        }
    }
    keep
}

/// Lay out CSR arrays and (optionally) the R-tree.  Inputs must already be
/// validated.
fn assemble(
    positions: Vec<GeoPoint>,
    keys: Vec<u64>,
    mut edges: Vec<RawEdge>,
    snapping: SnapStrategy,
) -> RoadGraph {
    let node_count = positions.len();

    // Stable sort keeps each node's neighbours in insertion order.
    edges.sort_by_key(|e| e.from.0);

    let edge_from: Vec<NodeId> = edges.iter().map(|e| e.from).collect();
    let edge_to:   Vec<NodeId> = edges.iter().map(|e| e.to).collect();

    let mut node_out_start = vec![0u32; node_count + 1];
    for e in &edges {
        node_out_start[e.from.index() + 1] += 1;
    }
    for i in 1..=node_count {
        node_out_start[i] += node_out_start[i - 1];
    }
    debug_assert_eq!(node_out_start[node_count] as usize, edges.len());

    let key_index: FxHashMap<u64, NodeId> = keys
        .iter()
        .enumerate()
        .map(|(i, &k)| (k, NodeId(i as u32)))
        .collect();

    let spatial_idx = match snapping {
        SnapStrategy::Linear  => None,
        SnapStrategy::Indexed => {
            let entries: Vec<NodeEntry> = positions
                .iter()
                .enumerate()
                .map(|(i, &pos)| NodeEntry { point: pos.to_unit_vector(), id: NodeId(i as u32) })
                .collect();
            Some(RTree::bulk_load(entries))
        }
    };

    RoadGraph {
        node_pos: positions,
        node_key: keys,
        node_out_start,
        edge_from,
        edge_to,
        key_index,
        spatial_idx,
    }
}
