//! Unit tests for ed-dispatch.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use ed_core::{Availability, GeoPoint, Resource, ResourceId};
    use crate::WorkerPool;

    /// Kilometres per degree of longitude on the equator (R = 6371 km).
    pub const KM_PER_DEG: f64 = 6_371.0 * std::f64::consts::PI / 180.0;

    pub fn pool() -> Arc<WorkerPool> {
        Arc::new(WorkerPool::new(Some(4)).unwrap())
    }

    /// A point on the equator `km` east of (0, 0).
    pub fn east(km: f64) -> GeoPoint {
        GeoPoint::new(0.0, km / KM_PER_DEG)
    }

    pub fn unit(id: u32, at: GeoPoint, availability: Availability) -> Resource {
        Resource::new(ResourceId(id), at, availability)
    }
}

// ── Worker pool ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod pool {
    use ed_core::{CoreError, DispatchConfig};
    use crate::{DispatchError, WorkerPool};

    #[test]
    fn results_keep_input_order() {
        let pool = WorkerPool::new(Some(3)).unwrap();
        assert_eq!(pool.num_threads(), 3);
        let items: Vec<u64> = (0..1_000).collect();
        let eval = pool.evaluate("double", &items, |&i| Ok(i * 2));
        assert_eq!(eval.failures, 0);
        assert_eq!(eval.results.len(), 1_000);
        for (pos, &(i, r)) in eval.results.iter().enumerate() {
            assert_eq!(i, pos);
            assert_eq!(r, pos as u64 * 2);
        }
    }

    #[test]
    fn failing_tasks_are_excluded_not_fatal() {
        let pool = WorkerPool::new(Some(2)).unwrap();
        let items: Vec<u32> = (0..10).collect();
        let eval = pool.evaluate("odd rejects", &items, |&i| {
            if i % 2 == 1 {
                Err(DispatchError::InvalidInput(CoreError::Parse(format!("item {i}"))))
            } else {
                Ok(i)
            }
        });
        assert_eq!(eval.failures, 5);
        let kept: Vec<usize> = eval.results.iter().map(|&(i, _)| i).collect();
        assert_eq!(kept, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn panicking_task_is_contained() {
        let pool = WorkerPool::new(Some(2)).unwrap();
        let items = [1u32, 2, 3];
        let eval = pool.evaluate("panics on two", &items, |&i| {
            if i == 2 {
                panic!("bad record");
            }
            Ok(i)
        });
        assert_eq!(eval.failures, 1);
        assert_eq!(eval.results, vec![(0, 1), (2, 3)]);
    }

    #[test]
    fn config_rejects_zero_threads() {
        let config = DispatchConfig { num_threads: Some(0), ..DispatchConfig::default() };
        assert!(matches!(
            WorkerPool::from_config(&config),
            Err(DispatchError::InvalidInput(CoreError::Config(_)))
        ));
    }
}

// ── Resource locator ──────────────────────────────────────────────────────────

#[cfg(test)]
mod locator {
    use ed_core::{Availability, Budget, CancelToken, CoreError, GeoPoint, Resource, ResourceId};
    use crate::{DispatchError, ResourceLocator, SearchResult};
    use super::helpers::{east, pool, unit};

    #[test]
    fn radius_matches_ring_of_lone_resource() {
        let locator = ResourceLocator::new(pool());
        for k in 1..=5u32 {
            let fleet = [unit(1, east(f64::from(k) - 0.05), Availability::Available)];
            let result = locator.locate(GeoPoint::new(0.0, 0.0), &fleet).unwrap();
            assert_eq!(result.radius_km(), Some(k), "resource at {} km", f64::from(k) - 0.05);
            assert_eq!(result.resource().map(|r| r.id), Some(ResourceId(1)));
        }
    }

    #[test]
    fn resource_on_ring_boundary_belongs_to_that_ring() {
        let locator = ResourceLocator::new(pool());
        for k in 1..=5u32 {
            let fleet = [unit(1, east(f64::from(k)), Availability::Available)];
            let result = locator.locate(GeoPoint::new(0.0, 0.0), &fleet).unwrap();
            assert_eq!(result.radius_km(), Some(k), "resource at {k} km");
        }
    }

    #[test]
    fn resource_just_past_boundary_lands_in_next_ring() {
        let locator = ResourceLocator::new(pool());
        for k in 1..=4u32 {
            let fleet = [unit(1, east(f64::from(k) + 0.05), Availability::Available)];
            let result = locator.locate(GeoPoint::new(0.0, 0.0), &fleet).unwrap();
            assert_eq!(result.radius_km(), Some(k + 1), "resource at {} km", f64::from(k) + 0.05);
        }
    }

    #[test]
    fn beyond_max_radius_is_not_found() {
        let locator = ResourceLocator::new(pool());
        let fleet = [
            unit(1, east(5.2), Availability::Available),
            unit(2, east(12.0), Availability::Available),
        ];
        let result = locator.locate(GeoPoint::new(0.0, 0.0), &fleet).unwrap();
        assert!(matches!(result, SearchResult::NotFound));
        assert!(!result.is_found());
        assert_eq!(result.radius_km(), None);
    }

    #[test]
    fn closer_ring_wins() {
        let locator = ResourceLocator::new(pool());
        let fleet = [
            unit(1, east(4.5), Availability::Available),
            unit(2, east(1.5), Availability::Available),
        ];
        let result = locator.locate(GeoPoint::new(0.0, 0.0), &fleet).unwrap();
        assert_eq!(result.radius_km(), Some(2));
        assert_eq!(result.resource().unwrap().id, ResourceId(2));
    }

    #[test]
    fn unavailable_and_unknown_are_skipped() {
        let locator = ResourceLocator::new(pool());
        let fleet = [
            unit(1, east(0.3), Availability::Unavailable),
            unit(2, east(0.6), Availability::Unknown),
            unit(3, east(2.5), Availability::Available),
        ];
        match locator.locate(GeoPoint::new(0.0, 0.0), &fleet).unwrap() {
            SearchResult::Found { resource, radius_km, distance_km } => {
                assert_eq!(resource.id, ResourceId(3));
                assert_eq!(radius_km, 3);
                assert!((distance_km - 2.5).abs() < 1e-6);
            }
            SearchResult::NotFound => panic!("expected a match"),
        }
    }

    #[test]
    fn tied_ring_accepts_any_available_winner() {
        let locator = ResourceLocator::new(pool());
        let fleet = [
            unit(1, east(1.2), Availability::Available),
            unit(2, GeoPoint::new(1.7 / super::helpers::KM_PER_DEG, 0.0), Availability::Available),
            unit(3, east(1.9), Availability::Available),
            unit(4, east(0.4), Availability::Unavailable),
        ];
        let result = locator.locate(GeoPoint::new(0.0, 0.0), &fleet).unwrap();
        assert_eq!(result.radius_km(), Some(2));
        let winner = result.resource().unwrap().id;
        assert!([ResourceId(1), ResourceId(2), ResourceId(3)].contains(&winner), "{winner}");
    }

    #[test]
    fn bad_record_does_not_fail_the_ring() {
        let locator = ResourceLocator::new(pool());
        let fleet = [
            unit(1, GeoPoint::new(200.0, 0.0), Availability::Available),
            unit(2, GeoPoint::new(0.0, f64::NAN), Availability::Available),
            unit(3, east(0.8), Availability::Available),
        ];
        let result = locator.locate(GeoPoint::new(0.0, 0.0), &fleet).unwrap();
        assert_eq!(result.resource().unwrap().id, ResourceId(3));
        assert_eq!(result.radius_km(), Some(1));
    }

    #[test]
    fn attributes_are_carried_through() {
        let locator = ResourceLocator::new(pool());
        let fleet = [Resource::with_attributes(
            ResourceId(9),
            east(0.5),
            Availability::Available,
            "BA 1 JHA 4321",
        )];
        let result = locator.locate(GeoPoint::new(0.0, 0.0), &fleet).unwrap();
        assert_eq!(result.resource().unwrap().attributes, "BA 1 JHA 4321");
    }

    #[test]
    fn empty_snapshot_is_data_unavailable() {
        let locator = ResourceLocator::new(pool());
        let fleet: [Resource; 0] = [];
        assert_eq!(
            locator.locate(GeoPoint::new(0.0, 0.0), &fleet).unwrap_err(),
            DispatchError::DataUnavailable("resource snapshot")
        );
    }

    #[test]
    fn out_of_range_incident_is_invalid_input() {
        let locator = ResourceLocator::new(pool());
        let fleet = [unit(1, east(0.5), Availability::Available)];
        assert_eq!(
            locator.locate(GeoPoint::new(200.0, 0.0), &fleet).unwrap_err(),
            DispatchError::InvalidInput(CoreError::InvalidCoordinate { lat: 200.0, lon: 0.0 })
        );
    }

    #[test]
    fn custom_radii() {
        let locator = ResourceLocator::new(pool()).with_radii(10, 2).unwrap();
        let fleet = [unit(1, east(7.0), Availability::Available)];
        let result = locator.locate(GeoPoint::new(0.0, 0.0), &fleet).unwrap();
        assert_eq!(result.radius_km(), Some(8));

        assert!(ResourceLocator::new(pool()).with_radii(5, 0).is_err());
    }

    #[test]
    fn cancelled_budget_interrupts() {
        let locator = ResourceLocator::new(pool());
        let fleet = [unit(1, east(3.5), Availability::Available)];
        let token = CancelToken::new();
        token.cancel();
        let budget = Budget::unbounded().with_token(token);
        assert_eq!(
            locator.locate_within(GeoPoint::new(0.0, 0.0), &fleet, &budget).unwrap_err(),
            DispatchError::Interrupted
        );
    }
}

// ── Zone classifier ───────────────────────────────────────────────────────────

#[cfg(test)]
mod zone {
    use ed_core::{CoreError, GeoPoint, Zone};
    use crate::{DispatchError, ZoneClassifier};
    use super::helpers::pool;

    fn zones() -> Vec<Zone> {
        vec![
            Zone::new("red", GeoPoint::new(27.7172, 85.3240)),
            Zone::new("yellow", GeoPoint::new(27.6710, 85.4298)),
            Zone::new("green", GeoPoint::new(27.6588, 85.3247)),
        ]
    }

    #[test]
    fn nearest_centroid_label() {
        let classifier = ZoneClassifier::new(pool());
        let zones = zones();
        assert_eq!(classifier.classify(GeoPoint::new(27.7100, 85.3200), &zones).unwrap(), "red");
        assert_eq!(classifier.classify(GeoPoint::new(27.6700, 85.4200), &zones).unwrap(), "yellow");
        assert_eq!(classifier.classify(GeoPoint::new(27.6500, 85.3300), &zones).unwrap(), "green");
    }

    #[test]
    fn unique_minimum_is_deterministic() {
        let classifier = ZoneClassifier::new(pool());
        let zones = zones();
        let incident = GeoPoint::new(27.6900, 85.3500);
        let first = classifier.classify(incident, &zones).unwrap();
        for _ in 0..50 {
            assert_eq!(classifier.classify(incident, &zones).unwrap(), first);
        }
    }

    #[test]
    fn exact_tie_goes_to_first_listed() {
        let classifier = ZoneClassifier::new(pool());
        let east = Zone::new("east", GeoPoint::new(0.0, 1.0));
        let west = Zone::new("west", GeoPoint::new(0.0, -1.0));
        let origin = GeoPoint::new(0.0, 0.0);

        let ew = [east.clone(), west.clone()];
        let we = [west, east];
        for _ in 0..20 {
            assert_eq!(classifier.classify(origin, &ew).unwrap(), "east");
            assert_eq!(classifier.classify(origin, &we).unwrap(), "west");
        }
    }

    #[test]
    fn empty_zone_set() {
        let classifier = ZoneClassifier::new(pool());
        assert_eq!(
            classifier.classify(GeoPoint::new(0.0, 0.0), &[]).unwrap_err(),
            DispatchError::NoZonesConfigured
        );
    }

    #[test]
    fn out_of_range_incident_is_invalid_input() {
        let classifier = ZoneClassifier::new(pool());
        assert_eq!(
            classifier.classify(GeoPoint::new(200.0, 0.0), &zones()).unwrap_err(),
            DispatchError::InvalidInput(CoreError::InvalidCoordinate { lat: 200.0, lon: 0.0 })
        );
    }

    #[test]
    fn invalid_centroids_are_skipped() {
        let classifier = ZoneClassifier::new(pool());
        let mixed = [
            Zone::new("broken", GeoPoint::new(95.0, 0.0)),
            Zone::new("far", GeoPoint::new(10.0, 10.0)),
        ];
        assert_eq!(classifier.classify(GeoPoint::new(89.0, 0.0), &mixed).unwrap(), "far");

        let broken = [Zone::new("broken", GeoPoint::new(95.0, 0.0))];
        assert_eq!(
            classifier.classify(GeoPoint::new(0.0, 0.0), &broken).unwrap_err(),
            DispatchError::DataUnavailable("zone centroids")
        );
    }
}

// ── Nearest site ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod nearest {
    use ed_core::GeoPoint;
    use crate::nearest_site;
    use super::helpers::{east, pool};

    #[test]
    fn returns_index_and_distance() {
        let sites = [east(3.0), east(1.0), east(2.0)];
        let (i, d) = nearest_site(&pool(), "sites", GeoPoint::new(0.0, 0.0), &sites, |p| *p).unwrap();
        assert_eq!(i, 1);
        assert!((d - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_is_none() {
        let sites: [GeoPoint; 0] = [];
        assert!(nearest_site(&pool(), "sites", GeoPoint::new(0.0, 0.0), &sites, |p| *p).is_none());
    }
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod dispatcher {
    use std::sync::Arc;

    use ed_core::{Availability, CoreError, DispatchConfig, GeoPoint, ResourceId, Zone};
    use ed_spatial::{ComponentPolicy, RoadGraph, RoadGraphBuilder};
    use crate::{DispatchError, Dispatcher};
    use super::helpers::unit;

    /// Eleven nodes along the equator, 0.01° (≈ 1.11 km) apart, joined by
    /// two-way roads.  With `island`, an unconnected node sits at (0.5, 0.5).
    fn corridor(island: bool) -> Arc<RoadGraph> {
        let mut b = RoadGraphBuilder::new().component_policy(ComponentPolicy::KeepAll);
        let nodes: Vec<_> = (0..=10u64)
            .map(|i| b.add_node(i, GeoPoint::new(0.0, i as f64 * 0.01)))
            .collect();
        for w in nodes.windows(2) {
            b.add_road(w[0], w[1]);
        }
        if island {
            b.add_node(99, GeoPoint::new(0.5, 0.5));
        }
        Arc::new(b.build().unwrap())
    }

    fn dispatcher(graph: Arc<RoadGraph>) -> Dispatcher {
        let config = DispatchConfig { num_threads: Some(2), ..DispatchConfig::default() };
        Dispatcher::new(graph, config).unwrap()
    }

    fn zones() -> Vec<Zone> {
        vec![
            Zone::new("red", GeoPoint::new(0.0, 0.05)),
            Zone::new("green", GeoPoint::new(1.0, 1.0)),
        ]
    }

    #[test]
    fn full_plan() {
        let d = dispatcher(corridor(false));
        let incident = GeoPoint::new(0.0, 0.05);
        let ambulances = [
            unit(1, GeoPoint::new(0.0, 0.02), Availability::Available),
            unit(2, GeoPoint::new(0.0, 0.045), Availability::Unavailable),
        ];
        let hospitals = [
            unit(10, GeoPoint::new(0.0, 0.09), Availability::Unknown),
            unit(11, GeoPoint::new(0.0, 0.06), Availability::Unavailable),
        ];

        let plan = d.plan(incident, &ambulances, &hospitals, &zones()).unwrap();

        assert_eq!(plan.zone.as_deref(), Some("red"));

        let amb = plan.ambulance.as_ref().unwrap();
        assert_eq!(amb.resource, ResourceId(1));
        assert_eq!(amb.radius_km, Some(4)); // 0.03° ≈ 3.34 km

        let inbound = plan.to_incident.as_ref().unwrap();
        assert_eq!(inbound.nodes.len(), 4); // nodes 2, 3, 4, 5
        assert_eq!(inbound.path.len(), inbound.nodes.len());
        assert!((inbound.path[0].lon - 0.02).abs() < 1e-12);
        assert!((inbound.path[3].lon - 0.05).abs() < 1e-12);
        assert!((inbound.distance_km - 3.3358).abs() < 0.001, "got {}", inbound.distance_km);

        let hospital = plan.hospital.as_ref().unwrap();
        assert_eq!(hospital.resource, ResourceId(10));
        assert_eq!(hospital.radius_km, None);
        assert_eq!(plan.to_hospital.as_ref().unwrap().nodes.len(), 5);
    }

    #[test]
    fn nothing_in_range_still_routes_to_hospital() {
        let d = dispatcher(corridor(false));
        let ambulances = [unit(1, GeoPoint::new(0.0, 0.1), Availability::Available)]; // ≈ 11 km
        let hospitals = [unit(10, GeoPoint::new(0.0, 0.0), Availability::Available)];

        let plan = d.plan(GeoPoint::new(0.0, 0.0), &ambulances, &hospitals, &[]).unwrap();
        assert_eq!(plan.zone, None);
        assert_eq!(plan.ambulance, None);
        assert_eq!(plan.to_incident, None);
        assert_eq!(plan.hospital.as_ref().unwrap().resource, ResourceId(10));
        // Incident and hospital snap to the same node.
        assert_eq!(plan.to_hospital.as_ref().unwrap().distance_km, 0.0);
    }

    #[test]
    fn unreachable_hospital_leaves_route_empty() {
        let d = dispatcher(corridor(true));
        let ambulances = [unit(1, GeoPoint::new(0.0, 0.01), Availability::Available)];
        let hospitals = [unit(10, GeoPoint::new(0.5, 0.5), Availability::Available)];

        let plan = d.plan(GeoPoint::new(0.0, 0.0), &ambulances, &hospitals, &zones()).unwrap();
        assert!(plan.to_incident.is_some());
        assert!(plan.hospital.is_some());
        assert_eq!(plan.to_hospital, None);
    }

    #[test]
    fn empty_graph_is_data_unavailable() {
        let d = dispatcher(Arc::new(RoadGraph::empty()));
        let ambulances = [unit(1, GeoPoint::new(0.0, 0.01), Availability::Available)];
        let err = d.plan(GeoPoint::new(0.0, 0.0), &ambulances, &[] as &[ed_core::Resource], &zones());
        assert_eq!(err.unwrap_err(), DispatchError::DataUnavailable("road graph"));
    }

    #[test]
    fn rejects_invalid_incident_and_config() {
        let d = dispatcher(corridor(false));
        let ambulances = [unit(1, GeoPoint::new(0.0, 0.01), Availability::Available)];
        let hospitals: [ed_core::Resource; 0] = [];
        assert!(matches!(
            d.plan(GeoPoint::new(200.0, 0.0), &ambulances, &hospitals, &zones()),
            Err(DispatchError::InvalidInput(_))
        ));

        let bad = DispatchConfig { step_km: 0, ..DispatchConfig::default() };
        assert!(Dispatcher::new(corridor(false), bad).is_err());
    }

    #[test]
    fn standalone_route_rejects_out_of_range_endpoint() {
        let d = dispatcher(corridor(false));
        assert_eq!(
            d.route(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 200.0)).unwrap_err(),
            DispatchError::InvalidInput(CoreError::InvalidCoordinate { lat: 0.0, lon: 200.0 })
        );
        let route = d.route(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.03)).unwrap().unwrap();
        assert_eq!(route.nodes.len(), 4);
    }

    #[test]
    fn plans_concurrently_from_one_dispatcher() {
        let d = dispatcher(corridor(false));
        let ambulances = [unit(1, GeoPoint::new(0.0, 0.02), Availability::Available)];
        let hospitals = [unit(10, GeoPoint::new(0.0, 0.09), Availability::Available)];
        let zones = zones();
        let (d, ambulances, hospitals, zones) = (&d, &ambulances[..], &hospitals[..], &zones[..]);

        let plans: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(move || d.plan(GeoPoint::new(0.0, 0.05), ambulances, hospitals, zones))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect()
        });
        assert!(plans.windows(2).all(|w| w[0] == w[1]));
    }
}
