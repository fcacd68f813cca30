//! `ed-dispatch` — the dispatch decision core.
//!
//! # Pipeline
//!
//! ```text
//! incident ─┬─ ZoneClassifier   → risk-zone label
//!           ├─ ResourceLocator  → nearest available ambulance (ring search)
//!           │      └─ ShortestPathEngine → ambulance → incident route
//!           └─ nearest_site     → nearest hospital
//!                  └─ ShortestPathEngine → incident → hospital route
//! ```
//!
//! [`Dispatcher`] runs the whole pipeline; the stages are also usable on
//! their own.  Per-candidate and per-zone checks run on a bounded
//! [`WorkerPool`].
//!
//! # Crate layout
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`pool`]       | `WorkerPool`, `Evaluation`                            |
//! | [`locator`]    | `ResourceLocator`, `SearchResult`                     |
//! | [`zone`]       | `ZoneClassifier`                                      |
//! | [`nearest`]    | `nearest_site`                                        |
//! | [`dispatcher`] | `Dispatcher`, `DispatchPlan`                          |
//! | [`error`]      | `DispatchError`, `DispatchResult<T>`                  |

pub mod dispatcher;
pub mod error;
pub mod locator;
pub mod nearest;
pub mod pool;
pub mod zone;

#[cfg(test)]
mod tests;

pub use dispatcher::{Assignment, DispatchPlan, Dispatcher, PlannedRoute};
pub use error::{DispatchError, DispatchResult};
pub use locator::{ResourceLocator, SearchResult};
pub use nearest::nearest_site;
pub use pool::{Evaluation, WorkerPool};
pub use zone::ZoneClassifier;
