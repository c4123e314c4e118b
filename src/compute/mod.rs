//! Pure computation behind the index: hashing, covering, filtering and
//! validation. Nothing in here talks to a backend.

pub mod covering;
pub mod filter;
pub mod geohash;
pub mod geojson;
pub mod region;
pub mod validation;
