//! Master data: raw rows, per-region snapshots and their inverted indices.

pub mod index;
pub mod loader;
pub mod records;
pub mod registry;
pub mod snapshot;
pub mod validate;

pub use registry::{DataRegistry, Region};
pub use snapshot::{EntityKind, MasterSnapshot};
