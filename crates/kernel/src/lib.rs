//! Water Kernel: simulation clock, wave field, tile scroll policy, mesh deformation.
//!
//! # Invariants
//! - The wave field and the tile scroll policy are pure: identical inputs give
//!   bit-identical outputs.
//! - Deformation rewrites only `position.y` and the color of each vertex.
//! - A deformed vertex range is uploaded before any draw may read it.

pub mod clock;
pub mod mutator;
pub mod scroll;
pub mod wave;

pub use clock::{ClockRates, SimClock};
pub use mutator::{DeformStats, MeshMutator, VertexUpload};
pub use scroll::{TileScroll, TileSelection, UvTranslate};
pub use wave::{WaveField, WaveParams, WaveSample};

pub fn crate_info() -> &'static str {
    "tidewater-kernel v0.1.0"
}
