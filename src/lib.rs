//! Geohash-indexed radius and rectangle queries over an ordered key-value store.
//!
//! Points are stored under a Z-order hash of their coordinates. A query
//! covers its bounding box with a small number of contiguous hash ranges,
//! scans them concurrently and filters the candidates by exact distance.
//!
//! ```rust
//! use geotable::prelude::*;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> geotable::Result<()> {
//! let table = GeoTable::builder(Arc::new(MemoryBackend::new())).build()?;
//! table.create_table().await?;
//!
//! table
//!     .put_point(Record::new("cafe", GeoPoint::new(40.7130, -74.0065)).with_attribute("name", "Cafe"))
//!     .await?;
//!
//! let nyc = GeoPoint::new(40.7128, -74.0060);
//! let nearby = table.query_radius(&QueryRadiusRequest::new(nyc, 1000.0)).await?;
//! assert_eq!(nearby[0].identifier, "cafe");
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod db;
pub mod error;
pub mod storage;

pub use builder::GeoTableBuilder;
pub use config::Config;
pub use db::{GeoTable, QueryRadiusRequest, QueryRectangleRequest};
pub use error::{GeoError, Result};

pub use compute::filter::{haversine_distance, sort_by_distance};
pub use compute::geojson::{record_from_feature, record_to_feature, records_to_geojson};
pub use compute::region::bounding_box;

pub use storage::{GeoBackend, GeoRow, MemoryBackend, StorageStats};

pub use geotable_types::bbox::BoundingBox;
pub use geotable_types::key::{HashKeyRange, HashValue, PartitionKey};
pub use geotable_types::point::GeoPoint;
pub use geotable_types::record::{AttributeSet, Attributes, Record};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{GeoError, GeoTable, GeoTableBuilder, Result};

    pub use crate::{Config, QueryRadiusRequest, QueryRectangleRequest};

    pub use crate::{BoundingBox, GeoPoint, Record};

    pub use crate::{GeoBackend, MemoryBackend};

    pub use crate::{haversine_distance, sort_by_distance};

    pub use std::time::Duration;
}
