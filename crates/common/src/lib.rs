//! Shared types for the tidewater water-surface pipeline.
//!
//! # Invariants
//! - [`Vertex`] is plain old data and matches the GPU vertex layout byte for byte.
//! - Positions are fixed-precision model-space integers; only `y` and the
//!   color channels change after load.

mod types;

pub use types::{MeshHandle, Rgba, TextureHandle, UV_FRAC_BITS, Vertex};
