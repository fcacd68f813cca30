//! `ed-spatial` — road graph, snapping, and shortest-path routing.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                      |
//! |------------|---------------------------------------------------------------|
//! | [`graph`]  | `RoadGraph` (CSR + optional R-tree), `RoadGraphBuilder`       |
//! | [`router`] | `Router` trait, `Route`, `DijkstraRouter`                    |
//! | [`engine`] | `ShortestPathEngine` (validate → snap → route)               |
//! | [`error`]  | `SpatialError`, `SpatialResult<T>`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod engine;
pub mod error;
pub mod graph;
pub mod router;


pub use engine::ShortestPathEngine;
pub use error::{SpatialError, SpatialResult};
pub use graph::{ComponentPolicy, RoadGraph, RoadGraphBuilder, SnapStrategy};
pub use router::{DijkstraRouter, Route, Router};
