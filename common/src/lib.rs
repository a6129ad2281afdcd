//! Common utilities for 2D simulations
//!
//! This crate provides the shared window/GPU bootstrap, the canvas-space camera,
//! and the colored vertex layout used by the particle lab renderer.

pub mod graphics;
pub mod camera;

pub use graphics::*;
pub use camera::*;
