//! Expanding-radius search for the closest available resource.
//!
//! # Algorithm
//!
//! ```text
//! for r in step, 2·step, …, ≤ max:
//!     evaluate every candidate concurrently: distance(incident, c) ≤ r ?
//!     if any in-ring candidate is Available → return it with radius r
//! return NotFound
//! ```
//!
//! Each ring rescans the full candidate set rather than only the newly
//! added annulus.  The first ring that holds an available resource wins,
//! which is the closest *feasible* resource at ring granularity rather than
//! the globally nearest one.

use std::sync::Arc;

use log::debug;

use ed_core::{Budget, CoreError, DispatchConfig, GeoPoint, Resource, haversine_km};

use crate::{DispatchError, DispatchResult, WorkerPool};

/// Outcome of a ring search.  An exhausted search is `NotFound`, not an error.
#[derive(Debug)]
pub enum SearchResult<'a, A> {
    Found {
        resource:    &'a Resource<A>,
        /// Radius of the first ring that contained the resource.
        radius_km:   u32,
        /// Exact haversine distance to the resource.
        distance_km: f64,
    },
    NotFound,
}

// Manual impls: deriving would require `A: Clone`/`A: PartialEq`.
impl<A> Clone for SearchResult<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for SearchResult<'_, A> {}

impl<A> SearchResult<'_, A> {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchResult::Found { .. })
    }

    pub fn radius_km(&self) -> Option<u32> {
        match self {
            SearchResult::Found { radius_km, .. } => Some(*radius_km),
            SearchResult::NotFound                => None,
        }
    }
}

impl<'a, A> SearchResult<'a, A> {
    pub fn resource(&self) -> Option<&'a Resource<A>> {
        match self {
            SearchResult::Found { resource, .. } => Some(*resource),
            SearchResult::NotFound               => None,
        }
    }
}

/// Ring search over a candidate snapshot.
///
/// The snapshot is borrowed once per call and never re-read, so concurrent
/// writers to the backing store cannot change the candidate set mid-search.
#[derive(Clone)]
pub struct ResourceLocator {
    pool:          Arc<WorkerPool>,
    max_radius_km: u32,
    step_km:       u32,
}

impl ResourceLocator {
    /// Rings of 1 km up to 5 km.
    pub fn new(pool: Arc<WorkerPool>) -> Self {
        Self { pool, max_radius_km: 5, step_km: 1 }
    }

    pub fn from_config(pool: Arc<WorkerPool>, config: &DispatchConfig) -> DispatchResult<Self> {
        Self::new(pool).with_radii(config.max_radius_km, config.step_km)
    }

    /// Override the ring bounds.  `step_km` must be at least 1.
    pub fn with_radii(mut self, max_radius_km: u32, step_km: u32) -> DispatchResult<Self> {
        if step_km == 0 {
            return Err(CoreError::Config("step_km must be at least 1".into()).into());
        }
        self.max_radius_km = max_radius_km;
        self.step_km = step_km;
        Ok(self)
    }

    pub fn max_radius_km(&self) -> u32 {
        self.max_radius_km
    }

    pub fn step_km(&self) -> u32 {
        self.step_km
    }

    /// Closest available resource to `incident` at ring granularity.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::InvalidInput`] if `incident` is out of range.
    /// - [`DispatchError::DataUnavailable`] if `candidates` is empty.
    pub fn locate<'a, A: Sync>(
        &self,
        incident: GeoPoint,
        candidates: &'a [Resource<A>],
    ) -> DispatchResult<SearchResult<'a, A>> {
        self.locate_within(incident, candidates, &Budget::unbounded())
    }

    /// Like [`locate`](Self::locate), polling `budget` before every ring and
    /// failing with [`DispatchError::Interrupted`] once it is exhausted.
    pub fn locate_within<'a, A: Sync>(
        &self,
        incident: GeoPoint,
        candidates: &'a [Resource<A>],
        budget: &Budget,
    ) -> DispatchResult<SearchResult<'a, A>> {
        incident.validate()?;
        if candidates.is_empty() {
            return Err(DispatchError::DataUnavailable("resource snapshot"));
        }

        for radius_km in (self.step_km..=self.max_radius_km).step_by(self.step_km as usize) {
            if budget.is_exhausted() {
                return Err(DispatchError::Interrupted);
            }

            let limit = f64::from(radius_km);
            let eval = self.pool.evaluate("ring check", candidates, |c| {
                c.location.validate()?;
                let d = haversine_km(incident, c.location);
                Ok((d <= limit).then_some(d))
            });

            let mut in_ring = 0usize;
            let mut best: Option<(usize, f64)> = None;
            for (i, hit) in eval.results {
                let Some(d) = hit else { continue };
                in_ring += 1;
                if !candidates[i].is_available() {
                    continue;
                }
                // Nearest available in the ring; input order breaks exact ties.
                if best.is_none_or(|(_, best_d)| d < best_d) {
                    best = Some((i, d));
                }
            }
            debug!(
                "ring {radius_km} km around {incident}: {in_ring} in range, {} excluded",
                eval.failures
            );

            if let Some((i, distance_km)) = best {
                return Ok(SearchResult::Found { resource: &candidates[i], radius_km, distance_km });
            }
        }

        debug!("no available resource within {} km of {incident}", self.max_radius_km);
        Ok(SearchResult::NotFound)
    }
}
