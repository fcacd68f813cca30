//! `ed-core` — foundational types for the emergency dispatch core.
//!
//! This crate is a dependency of every other `ed-*` crate.  It has no `ed-*`
//! dependencies and minimal external ones (only `thiserror`, plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module           | Contents                                              |
//! |------------------|-------------------------------------------------------|
//! | [`ids`]          | `NodeId`, `EdgeId`, `ResourceId`                      |
//! | [`geo`]          | `GeoPoint`, haversine distance                        |
//! | [`availability`] | `Availability` enum                                   |
//! | [`resource`]     | `Resource<A>`, `Zone`                                 |
//! | [`config`]       | `DispatchConfig`                                      |
//! | [`budget`]       | `Budget`, `CancelToken`                               |
//! | [`error`]        | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod availability;
pub mod budget;
pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod resource;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use availability::Availability;
pub use budget::{Budget, CancelToken};
pub use config::DispatchConfig;
pub use error::{CoreError, CoreResult};
pub use geo::{EARTH_RADIUS_KM, GeoPoint, haversine_km};
pub use ids::{EdgeId, NodeId, ResourceId};
pub use resource::{Resource, Zone};
