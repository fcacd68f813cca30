//! Road-graph loader for pre-built node/edge exports.
//!
//! # CSV formats
//!
//! ```csv
//! id,latitude,longitude
//! 1001,27.7172,85.3240
//! 1002,27.7180,85.3251
//! ```
//!
//! ```csv
//! from,to,oneway
//! 1001,1002,false
//! 1002,1003,yes
//! ```
//!
//! `oneway` is optional; absent or falsy rows add both directions.  Node ids
//! are the export's own identifiers and survive as node keys
//! ([`RoadGraph::node_by_key`]).
//!
//! Edges that name an unknown node are skipped with a warning.  Everything
//! else, including the largest-component restriction, is left to
//! [`RoadGraphBuilder::build`].

use std::io::Read;
use std::path::Path;

use log::{info, warn};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use ed_core::{GeoPoint, NodeId};
use ed_spatial::{RoadGraph, RoadGraphBuilder};

use crate::records::read_rows;
use crate::{DataError, DataResult};

#[derive(Deserialize)]
struct NodeRecord {
    id:        u64,
    latitude:  f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct EdgeRecord {
    from:   u64,
    to:     u64,
    #[serde(default)]
    oneway: Option<String>,
}

/// Load a road graph from node and edge CSV files.
///
/// `builder` carries the component policy and snapping strategy; pass
/// `RoadGraphBuilder::new()` for the defaults.
pub fn load_road_graph_csv(
    nodes: &Path,
    edges: &Path,
    builder: RoadGraphBuilder,
) -> DataResult<RoadGraph> {
    load_road_graph_reader(std::fs::File::open(nodes)?, std::fs::File::open(edges)?, builder)
}

/// Like [`load_road_graph_csv`] but accepts any `Read` sources.
pub fn load_road_graph_reader<N: Read, E: Read>(
    nodes: N,
    edges: E,
    mut builder: RoadGraphBuilder,
) -> DataResult<RoadGraph> {
    let node_rows: Vec<NodeRecord> = read_rows(nodes, Ok)?;
    let mut by_key: FxHashMap<u64, NodeId> =
        FxHashMap::with_capacity_and_hasher(node_rows.len(), Default::default());
    for row in node_rows {
        let id = builder.add_node(row.id, GeoPoint::new(row.latitude, row.longitude));
        by_key.insert(row.id, id);
    }

    let edge_rows: Vec<EdgeRecord> = read_rows(edges, Ok)?;
    let mut skipped = 0usize;
    for row in edge_rows {
        let (Some(&from), Some(&to)) = (by_key.get(&row.from), by_key.get(&row.to)) else {
            skipped += 1;
            continue;
        };
        if parse_flag(row.oneway.as_deref())? {
            builder.add_directed_edge(from, to);
        } else {
            builder.add_road(from, to);
        }
    }
    if skipped > 0 {
        warn!("road graph export: skipped {skipped} edges with unknown endpoints");
    }

    info!(
        "road graph export read: {} nodes, {} directed edges",
        builder.node_count(),
        builder.edge_count()
    );
    Ok(builder.build()?)
}

fn parse_flag(s: Option<&str>) -> DataResult<bool> {
    match s.map(str::trim).unwrap_or("") {
        "" => Ok(false),
        v if v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") || v == "1" => Ok(true),
        v if v.eq_ignore_ascii_case("false") || v.eq_ignore_ascii_case("no") || v == "0" => Ok(false),
        v => Err(DataError::Parse(format!("invalid oneway flag {v:?}"))),
    }
}
