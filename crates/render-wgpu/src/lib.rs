//! wgpu backend for the tidewater water pipeline.
//!
//! Implements [`tidewater_render::GraphicsBackend`] on a window surface:
//! fixed-point vertex fetch, two scrolled texture tiles per draw, ambient and
//! directional lighting, and linear depth fog in a single WGSL shader.
//!
//! # Invariants
//! - Vertex uploads are queued with `write_buffer` and land before the
//!   submission that carries the frame's draws.
//! - Sync points complete from `Queue::on_submitted_work_done`; nothing here
//!   waits on the GPU.
//! - A lost or outdated surface is reconfigured and the frame is skipped.

mod gpu;
mod shaders;

pub use gpu::{MAX_DRAWS, WgpuBackend};
