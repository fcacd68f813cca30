//! End-to-end dispatch planning for a single incident.

use std::sync::Arc;

use log::{info, warn};

use ed_core::{Availability, DispatchConfig, GeoPoint, NodeId, Resource, ResourceId, Zone};
use ed_spatial::{RoadGraph, Route, ShortestPathEngine, SpatialError};

use crate::{
    DispatchError, DispatchResult, ResourceLocator, SearchResult, WorkerPool, ZoneClassifier,
    nearest_site,
};

// ── Plan types ────────────────────────────────────────────────────────────────

/// A resource chosen for the incident.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    pub resource:    ResourceId,
    pub location:    GeoPoint,
    /// Ring radius that produced the match; `None` for plain nearest lookups.
    pub radius_km:   Option<u32>,
    /// Straight-line distance from the incident.
    pub distance_km: f64,
}

/// A road route with its polyline.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannedRoute {
    pub nodes:       Vec<NodeId>,
    pub path:        Vec<GeoPoint>,
    pub distance_km: f64,
}

impl PlannedRoute {
    fn from_route(route: Route, graph: &RoadGraph) -> Self {
        Self {
            path:        route.coordinates(graph),
            distance_km: route.distance_km(),
            nodes:       route.nodes,
        }
    }
}

/// Everything decided for one incident.  Plain owned data; serialization is
/// left to the caller.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchPlan {
    pub incident:    GeoPoint,
    /// `None` when no zones are configured.
    pub zone:        Option<String>,
    /// `None` when no available ambulance is within the search radius.
    pub ambulance:   Option<Assignment>,
    /// Ambulance → incident.  `None` without an ambulance or without a path.
    pub to_incident: Option<PlannedRoute>,
    /// Nearest hospital that is not marked unavailable.
    pub hospital:    Option<Assignment>,
    /// Incident → hospital.  `None` without a hospital or without a path.
    pub to_hospital: Option<PlannedRoute>,
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// Owns the shared road graph and worker pool and answers "what do we send,
/// and how does it get there?".
///
/// Build once at startup; `plan` takes `&self` and may be called from many
/// threads at once.
pub struct Dispatcher {
    config:     DispatchConfig,
    graph:      Arc<RoadGraph>,
    pool:       Arc<WorkerPool>,
    engine:     ShortestPathEngine,
    locator:    ResourceLocator,
    classifier: ZoneClassifier,
}

impl Dispatcher {
    pub fn new(graph: Arc<RoadGraph>, config: DispatchConfig) -> DispatchResult<Self> {
        let pool = Arc::new(WorkerPool::from_config(&config)?);
        let locator = ResourceLocator::from_config(Arc::clone(&pool), &config)?;
        let classifier = ZoneClassifier::new(Arc::clone(&pool));
        info!(
            "dispatcher ready: {} graph nodes, {} workers, rings {}..={} km",
            graph.node_count(),
            pool.num_threads(),
            config.step_km,
            config.max_radius_km
        );
        Ok(Self {
            config,
            graph,
            pool,
            engine: ShortestPathEngine::new(),
            locator,
            classifier,
        })
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    pub fn locator(&self) -> &ResourceLocator {
        &self.locator
    }

    pub fn classifier(&self) -> &ZoneClassifier {
        &self.classifier
    }

    /// Plan the response to an incident at `incident`.
    ///
    /// Only input errors, an empty ambulance snapshot, an exhausted budget
    /// or a non-path routing failure are errors.  Missing zones, ambulances,
    /// hospitals and paths show up as `None` fields.
    pub fn plan<A: Sync, H: Sync>(
        &self,
        incident: GeoPoint,
        ambulances: &[Resource<A>],
        hospitals: &[Resource<H>],
        zones: &[Zone],
    ) -> DispatchResult<DispatchPlan> {
        incident.validate()?;

        let zone = match self.classifier.classify(incident, zones) {
            Ok(label) => Some(label.to_owned()),
            Err(DispatchError::NoZonesConfigured) => {
                warn!("no zones configured; incident {incident} left unclassified");
                None
            }
            Err(e) => return Err(e),
        };

        let search = self
            .locator
            .locate_within(incident, ambulances, &self.config.search_budget())?;
        let ambulance = match search {
            SearchResult::Found { resource, radius_km, distance_km } => Some(Assignment {
                resource: resource.id,
                location: resource.location,
                radius_km: Some(radius_km),
                distance_km,
            }),
            SearchResult::NotFound => {
                info!(
                    "no available ambulance within {} km of {incident}",
                    self.locator.max_radius_km()
                );
                None
            }
        };

        let to_incident = match &ambulance {
            Some(a) => self.route(a.location, incident)?,
            None    => None,
        };

        let hospital = self.nearest_hospital(incident, hospitals);
        let to_hospital = match &hospital {
            Some(h) => self.route(incident, h.location)?,
            None    => None,
        };

        Ok(DispatchPlan { incident, zone, ambulance, to_incident, hospital, to_hospital })
    }

    fn nearest_hospital<H: Sync>(
        &self,
        incident: GeoPoint,
        hospitals: &[Resource<H>],
    ) -> Option<Assignment> {
        let open: Vec<&Resource<H>> = hospitals
            .iter()
            .filter(|h| h.availability != Availability::Unavailable)
            .collect();

        match nearest_site(&self.pool, "hospital distance", incident, &open, |h| h.location) {
            Some((i, distance_km)) => Some(Assignment {
                resource: open[i].id,
                location: open[i].location,
                radius_km: None,
                distance_km,
            }),
            None => {
                info!("no hospital available for incident {incident}");
                None
            }
        }
    }

    /// Road route between two points, with the configured route budget.
    ///
    /// `Ok(None)` when the snapped endpoints are not connected.
    pub fn route(&self, from: GeoPoint, to: GeoPoint) -> DispatchResult<Option<PlannedRoute>> {
        from.validate()?;
        to.validate()?;
        match self
            .engine
            .find_shortest_path_within(&self.graph, from, to, &self.config.route_budget())
        {
            Ok(route) => Ok(Some(PlannedRoute::from_route(route, &self.graph))),
            Err(e) if e.is_no_path() => {
                warn!("no road path from {from} to {to}: {e}");
                Ok(None)
            }
            Err(SpatialError::EmptyGraph)  => Err(DispatchError::DataUnavailable("road graph")),
            Err(SpatialError::Interrupted) => Err(DispatchError::Interrupted),
            Err(e) => Err(e.into()),
        }
    }
}
