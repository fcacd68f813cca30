//! CSV snapshots of resources, risk zones and events.
//!
//! # CSV formats
//!
//! Resources (ambulances and hospitals share one layout; `name` is optional):
//!
//! ```csv
//! id,latitude,longitude,status,name
//! 1,27.7172,85.3240,available,BA 1 JHA 4321
//! 2,27.6710,85.4298,unavailable,
//! ```
//!
//! `status` accepts `available`, `unavailable`, `unknown` (or empty),
//! `true`/`false`, `yes`/`no` and `1`/`0`.
//!
//! Zones:
//!
//! ```csv
//! label,latitude,longitude
//! red,27.7172,85.3240
//! ```
//!
//! Events (`description` optional):
//!
//! ```csv
//! id,latitude,longitude,description
//! 7,27.7000,85.3300,road traffic collision
//! ```
//!
//! Coordinates are read as-is.  Out-of-range values load fine and are
//! excluded later by the dispatch core, one record at a time.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use ed_core::{Availability, GeoPoint, Resource, ResourceId, Zone};

use crate::{DataError, DataResult};

// ── Loaded types ──────────────────────────────────────────────────────────────

/// Descriptive attributes carried alongside a loaded resource.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceInfo {
    pub name: Option<String>,
}

/// A reported incident awaiting dispatch.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub id:          u32,
    pub location:    GeoPoint,
    pub description: Option<String>,
}

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ResourceRecord {
    id:        u32,
    latitude:  f64,
    longitude: f64,
    #[serde(default)]
    status:    String,
    #[serde(default)]
    name:      Option<String>,
}

#[derive(Deserialize)]
struct ZoneRecord {
    label:     String,
    latitude:  f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct EventRecord {
    id:          u32,
    latitude:    f64,
    longitude:   f64,
    #[serde(default)]
    description: Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a resource snapshot from a CSV file.
pub fn load_resources_csv(path: &Path) -> DataResult<Vec<Resource<ResourceInfo>>> {
    load_resources_reader(std::fs::File::open(path)?)
}

/// Like [`load_resources_csv`] but accepts any `Read` source.
pub fn load_resources_reader<R: Read>(reader: R) -> DataResult<Vec<Resource<ResourceInfo>>> {
    read_rows(reader, |row: ResourceRecord| {
        let availability: Availability = row.status.parse().map_err(|e| {
            DataError::Parse(format!("resource {}: {e}", row.id))
        })?;
        let name = row.name.filter(|n| !n.trim().is_empty());
        Ok(Resource::with_attributes(
            ResourceId(row.id),
            GeoPoint::new(row.latitude, row.longitude),
            availability,
            ResourceInfo { name },
        ))
    })
}

/// Load risk-zone centroids from a CSV file.
pub fn load_zones_csv(path: &Path) -> DataResult<Vec<Zone>> {
    load_zones_reader(std::fs::File::open(path)?)
}

/// Like [`load_zones_csv`] but accepts any `Read` source.
pub fn load_zones_reader<R: Read>(reader: R) -> DataResult<Vec<Zone>> {
    read_rows(reader, |row: ZoneRecord| {
        Ok(Zone::new(row.label.trim(), GeoPoint::new(row.latitude, row.longitude)))
    })
}

/// Load events from a CSV file.
pub fn load_events_csv(path: &Path) -> DataResult<Vec<Event>> {
    load_events_reader(std::fs::File::open(path)?)
}

/// Like [`load_events_csv`] but accepts any `Read` source.
pub fn load_events_reader<R: Read>(reader: R) -> DataResult<Vec<Event>> {
    read_rows(reader, |row: EventRecord| {
        Ok(Event {
            id:          row.id,
            location:    GeoPoint::new(row.latitude, row.longitude),
            description: row.description.filter(|d| !d.trim().is_empty()),
        })
    })
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Deserialize every row of a headed, comma-separated source and map it.
pub(crate) fn read_rows<R, T, U, F>(reader: R, mut map: F) -> DataResult<Vec<U>>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
    F: FnMut(T) -> DataResult<U>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for result in csv_reader.deserialize::<T>() {
        let row = result.map_err(|e| DataError::Parse(e.to_string()))?;
        out.push(map(row)?);
    }
    Ok(out)
}
