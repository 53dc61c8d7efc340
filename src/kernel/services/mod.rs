//! Services layer (ports + adapters).
//!
//! - `ports`: pure contracts/types used across the crate.
//! - `adapters`: runtime specific implementations (background scans, settings IO).

pub mod adapters;
pub mod ports;
