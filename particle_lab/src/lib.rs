//! Interactive 2D particle playground
//!
//! A population of point masses is pulled toward the canvas center, damped,
//! and bounced off the canvas walls. Every frame the particles leave fading
//! trails and nearby pairs are joined by proximity lines. Experiment presets
//! replace the population with a vortex, a radial burst, an attractor field
//! or a standing wave grid.
//!
//! The crate is headless: [`Simulation`] holds all state and is advanced by
//! the host one frame at a time, and [`scene::compose_scene`] turns that
//! state into draw layers for whatever renderer the host uses.

pub mod config;
pub mod error;
pub mod intent;
pub mod mesh;
pub mod palette;
pub mod particle;
pub mod physics;
pub mod presets;
pub mod scene;
pub mod simulation;
pub mod store;
pub mod telemetry;
pub mod trail;

pub use config::{ConfigChange, SceneConfig};
pub use error::SimError;
pub use intent::{Intent, Pointer, SimEvent};
pub use palette::ColorMode;
pub use particle::Particle;
pub use physics::Attractor;
pub use presets::Preset;
pub use scene::{compose_scene, FrameScene};
pub use simulation::{FrameReport, Simulation};
pub use store::ParticleStore;
pub use telemetry::TelemetrySnapshot;
