//! `ed-data` — CSV read snapshots for the dispatch core.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`records`] | `ResourceInfo`, `Event`, resource / zone / event loaders        |
//! | [`graph`]   | `load_road_graph_csv`, `load_road_graph_reader`                 |
//! | [`error`]   | `DataError`, `DataResult<T>`                                    |
//!
//! Every loader comes in two forms: `load_*_csv(path)` and
//! `load_*_reader(impl Read)`.  Loads are one-shot snapshots; the dispatch
//! core never reads back from the source.

pub mod error;
pub mod graph;
pub mod records;


pub use error::{DataError, DataResult};
pub use graph::{load_road_graph_csv, load_road_graph_reader};
pub use records::{
    Event, ResourceInfo, load_events_csv, load_events_reader, load_resources_csv,
    load_resources_reader, load_zones_csv, load_zones_reader,
};
