//! Persistence for the schema registry and the per-file move/audit log.
//!
//! Backed by `sled`, an embedded ordered key-value store. There is no SQL
//! engine in this port; `get_metric_view` recomputes the original's
//! `metric` SQL view on read instead of maintaining a live view.

pub mod error;
pub mod move_registry;
pub mod schema_registry;
pub mod session;

pub use error::StoreError;
pub use move_registry::{MetricRow, MoveRegistry, MoveRow};
pub use schema_registry::{SchemaRegistry, SchemaRow};
pub use session::{Session, StorageConnection};
