//! Minimum-distance search over a set of located items.

use ed_core::{GeoPoint, haversine_km};

use crate::WorkerPool;

/// Index and distance (km) of the item nearest to `origin`.
///
/// Distances are computed concurrently on `pool`, one task per item.  Items
/// whose location fails validation are logged and skipped.  Equal distances
/// resolve to the earliest item in `items`.  Returns `None` when no item
/// produced a distance.
pub fn nearest_site<T, F>(
    pool: &WorkerPool,
    what: &str,
    origin: GeoPoint,
    items: &[T],
    location: F,
) -> Option<(usize, f64)>
where
    T: Sync,
    F: Fn(&T) -> GeoPoint + Sync,
{
    let eval = pool.evaluate(what, items, |item| {
        let at = location(item);
        at.validate()?;
        Ok(haversine_km(origin, at))
    });

    // Results are in input order; strict `<` keeps the first minimum.
    let mut best: Option<(usize, f64)> = None;
    for (i, d) in eval.results {
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((i, d));
        }
    }
    best
}
