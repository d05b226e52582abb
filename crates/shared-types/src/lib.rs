//! # Shared Types Crate
//!
//! Cross-crate vocabulary for Waypoint: chain identifiers, correlation
//! tokens, raw payload bytes, and block references.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a crate boundary
//!   lives here.
//! - **Opaque identifiers**: chain ids and tokens are treated as opaque
//!   strings supplied by the decoding layer; the tracker never derives or
//!   re-hashes them.
//! - **Hex at the edges**: raw payload bytes serialize as hex strings so
//!   observations round-trip through JSON unchanged.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
