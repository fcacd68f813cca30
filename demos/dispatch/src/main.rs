//! dispatch — one incident through the whole pipeline.
//!
//! Loads the sample snapshot under `data/` (a 6 × 6 street grid in central
//! Kathmandu, five ambulances, three hospitals, three risk zones), picks one
//! event at random and prints the resulting plan as JSON.
//!
//! ```text
//! dispatch [DATA_DIR] [CONFIG_JSON]
//! ```
//!
//! Set `RUST_LOG=debug` to watch the ring search and routing.  Set
//! `DISPATCH_SEED` to make the event choice repeatable.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use ed_core::DispatchConfig;
use ed_data::{load_events_csv, load_resources_csv, load_road_graph_csv, load_zones_csv};
use ed_dispatch::Dispatcher;
use ed_spatial::{RoadGraphBuilder, SnapStrategy};

// ── Setup ─────────────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<DispatchConfig> {
    let config = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("reading config {}", p.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", p.display()))?
        }
        None => DispatchConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn rng() -> Result<SmallRng> {
    Ok(match std::env::var("DISPATCH_SEED") {
        Ok(s) => SmallRng::seed_from_u64(s.parse().context("DISPATCH_SEED must be a u64")?),
        Err(_) => SmallRng::from_entropy(),
    })
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let data_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("data"));
    let config = load_config(args.next().as_deref().map(Path::new))?;

    // 1. Road graph.
    let t0 = Instant::now();
    let snapping = if config.indexed_snapping { SnapStrategy::Indexed } else { SnapStrategy::Linear };
    let graph = load_road_graph_csv(
        &data_dir.join("nodes.csv"),
        &data_dir.join("edges.csv"),
        RoadGraphBuilder::new().snapping(snapping),
    )?;
    info!(
        "road graph: {} nodes, {} edges in {:.1} ms",
        graph.node_count(),
        graph.edge_count(),
        t0.elapsed().as_secs_f64() * 1e3
    );

    // 2. Snapshots.
    let ambulances = load_resources_csv(&data_dir.join("ambulances.csv"))?;
    let hospitals = load_resources_csv(&data_dir.join("hospitals.csv"))?;
    let zones = load_zones_csv(&data_dir.join("zones.csv"))?;
    let events = load_events_csv(&data_dir.join("events.csv"))?;
    info!(
        "snapshot: {} ambulances, {} hospitals, {} zones, {} events",
        ambulances.len(),
        hospitals.len(),
        zones.len(),
        events.len()
    );
    if events.is_empty() {
        bail!("no events in {}", data_dir.join("events.csv").display());
    }

    // 3. Plan one random event.
    let event = &events[rng()?.gen_range(0..events.len())];
    info!(
        "event {} at {}{}",
        event.id,
        event.location,
        event.description.as_deref().map(|d| format!(" ({d})")).unwrap_or_default()
    );

    let dispatcher = Dispatcher::new(Arc::new(graph), config)?;
    let t1 = Instant::now();
    let plan = dispatcher.plan(event.location, &ambulances, &hospitals, &zones)?;
    info!("planned in {:.1} ms", t1.elapsed().as_secs_f64() * 1e3);

    let name_of = |id, fleet: &[ed_core::Resource<ed_data::ResourceInfo>]| {
        fleet
            .iter()
            .find(|r| r.id == id)
            .and_then(|r| r.attributes.name.clone())
    };
    if let Some(a) = &plan.ambulance {
        info!("ambulance: {}", name_of(a.resource, &ambulances).unwrap_or_else(|| a.resource.to_string()));
    }
    if let Some(h) = &plan.hospital {
        info!("hospital: {}", name_of(h.resource, &hospitals).unwrap_or_else(|| h.resource.to_string()));
    }

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
