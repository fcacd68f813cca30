//! Risk-zone classification by nearest centroid.

use std::sync::Arc;

use log::debug;

use ed_core::{GeoPoint, Zone};

use crate::{DispatchError, DispatchResult, WorkerPool, nearest_site};

/// Labels an incident with the zone whose centroid is nearest.
///
/// The result depends only on the inputs: distances are evaluated
/// concurrently but compared in zone order, and an exact tie goes to the
/// zone listed first.
#[derive(Clone)]
pub struct ZoneClassifier {
    pool: Arc<WorkerPool>,
}

impl ZoneClassifier {
    pub fn new(pool: Arc<WorkerPool>) -> Self {
        Self { pool }
    }

    /// Label of the zone nearest to `incident`.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::InvalidInput`] if `incident` is out of range.
    /// - [`DispatchError::NoZonesConfigured`] if `zones` is empty.
    /// - [`DispatchError::DataUnavailable`] if every centroid was invalid.
    pub fn classify<'a>(&self, incident: GeoPoint, zones: &'a [Zone]) -> DispatchResult<&'a str> {
        self.nearest_zone(incident, zones).map(|z| z.label.as_str())
    }

    /// Like [`classify`](Self::classify) but returns the whole zone.
    pub fn nearest_zone<'a>(&self, incident: GeoPoint, zones: &'a [Zone]) -> DispatchResult<&'a Zone> {
        incident.validate()?;
        if zones.is_empty() {
            return Err(DispatchError::NoZonesConfigured);
        }

        let (i, d) = nearest_site(&self.pool, "zone distance", incident, zones, |z| z.centroid)
            .ok_or(DispatchError::DataUnavailable("zone centroids"))?;

        let zone = &zones[i];
        debug!("incident {incident} classified as {:?} ({d:.3} km from centroid)", zone.label);
        Ok(zone)
    }
}
