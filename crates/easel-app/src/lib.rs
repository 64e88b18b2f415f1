//! Easel Application
//!
//! Shells around the core coordinator: a browser binding that drives two
//! canvas elements, and a native replay runner for gesture scripts.

#[cfg(not(target_arch = "wasm32"))]
pub mod replay;

#[cfg(not(target_arch = "wasm32"))]
pub use replay::{ReplayError, ReplayReport, Script, replay_file};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{CanvasSurface, EaselHandle, run_wasm};
