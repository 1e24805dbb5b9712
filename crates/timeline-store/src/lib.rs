//! Client-side state store for the timeline explorer.
//!
//! The store holds everything the timeline UI renders from: the selected
//! timeline, its metadata, the toggleable groups and event types, the year
//! window and the camera zoom. It fetches the per-timeline resources from
//! the backend data API and commits them into a single state tree.
//!
//! # Architecture
//!
//! ```text
//! UI --setters--> TimelineStore --write lock--> TimelineState
//!                      |                              |
//!                loaders (reqwest)            StateChange broadcast
//!                      |
//!       <base_url>/<slug>/{meta, groups, groups-by-region, year-settings, themes}
//! ```
//!
//! Each loader reports its outcome (`Applied`, `Stale` or an error) and
//! records a per-endpoint [`LoadStatus`](timeline_types::LoadStatus) in the
//! tree, so the UI can tell a slow request from a failed one. Selecting a
//! new slug starts a new load cycle; responses from older cycles are
//! dropped.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod state;
pub mod storage;
pub mod store;

// Re-export primary types for convenience.
pub use client::BackendClient;
pub use config::{BackendConfig, ConfigError, LoggingConfig, StorageConfig, StoreConfig};
pub use error::StoreError;
pub use logging::init_tracing;
pub use state::{StateChange, TimelineState};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StoredSession};
pub use store::{LoadOutcome, LoadReport, TimelineStore};
