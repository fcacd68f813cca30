//! Dispatch configuration.

use std::time::Duration;

use crate::{Budget, CoreError, CoreResult};

/// Top-level dispatch configuration.
///
/// Typically loaded from a JSON file by the application crate and passed to
/// the locator, classifier and path engine.  Every field has a default, so a
/// partial file is enough.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DispatchConfig {
    /// Largest ring radius tried by the resource locator.  Default: 5 km.
    pub max_radius_km: u32,

    /// Ring growth per iteration.  Default: 1 km.
    pub step_km: u32,

    /// Worker thread count for concurrent evaluation.  `None` uses all
    /// logical cores.
    pub num_threads: Option<usize>,

    /// Wall-clock limit for one expanding-radius search.  `None` = unbounded.
    pub search_timeout_ms: Option<u64>,

    /// Wall-clock limit for one shortest-path query.  `None` = unbounded.
    pub route_timeout_ms: Option<u64>,

    /// Snap points to graph nodes through an R-tree instead of a linear scan.
    pub indexed_snapping: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_radius_km:     5,
            step_km:           1,
            num_threads:       None,
            search_timeout_ms: None,
            route_timeout_ms:  None,
            indexed_snapping:  false,
        }
    }
}

impl DispatchConfig {
    /// Reject settings the search loops cannot honour.
    pub fn validate(&self) -> CoreResult<()> {
        if self.step_km == 0 {
            return Err(CoreError::Config("step_km must be at least 1".into()));
        }
        if self.max_radius_km < self.step_km {
            return Err(CoreError::Config(format!(
                "max_radius_km ({}) is smaller than step_km ({})",
                self.max_radius_km, self.step_km
            )));
        }
        if self.num_threads == Some(0) {
            return Err(CoreError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }

    /// A fresh budget for one resource search, starting now.
    pub fn search_budget(&self) -> Budget {
        budget_from_ms(self.search_timeout_ms)
    }

    /// A fresh budget for one shortest-path query, starting now.
    pub fn route_budget(&self) -> Budget {
        budget_from_ms(self.route_timeout_ms)
    }
}

fn budget_from_ms(ms: Option<u64>) -> Budget {
    match ms {
        Some(ms) => Budget::with_timeout(Duration::from_millis(ms)),
        None     => Budget::unbounded(),
    }
}
