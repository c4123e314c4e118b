//! # geotable-types
//!
//! Plain data types shared by the geotable index and its callers.
//!
//! - **Point types**: [`GeoPoint`](point::GeoPoint)
//! - **Records**: [`Record`](record::Record) with a free-form attribute map
//! - **Regions**: [`BoundingBox`](bbox::BoundingBox), including boxes that
//!   cross the antimeridian
//! - **Keys**: [`HashValue`](key::HashValue), [`PartitionKey`](key::PartitionKey)
//!   and [`HashKeyRange`](key::HashKeyRange)
//!
//! All types are serializable with Serde and convert to and from the `geo`
//! crate's primitives where that makes sense.
//!
//! ## Examples
//!
//! ```rust
//! use geotable_types::point::GeoPoint;
//! use geotable_types::record::Record;
//!
//! let nyc = GeoPoint::new(40.7128, -74.0060);
//! let record = Record::new("post-1", nyc).with_attribute("name", "Pizza");
//! assert_eq!(record.attributes.get("name").map(String::as_str), Some("Pizza"));
//! ```

pub mod bbox;
pub mod key;
pub mod point;
pub mod record;
