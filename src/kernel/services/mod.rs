//! Services layer (ports + adapters).
//!
//! - `ports`: pure contracts/types used by the kernel.
//! - `adapters`: OS specific implementations (filesystem IO).

pub mod adapters;
pub mod ports;
