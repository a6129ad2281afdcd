//! Requests from collaborators (input handlers, UI) and notifications back to them
//!
//! Collaborators never touch the particle set directly; they queue an
//! [`Intent`] which the simulation applies at the top of the next frame.

use glam::Vec2;

use crate::config::ConfigChange;
use crate::presets::Preset;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    PointerMove(Vec2),
    /// Press at a canvas position; injects one particle there
    PointerDown(Vec2),
    PointerUp,
    TogglePause,
    /// Clear and reseed the default population
    Reset,
    LoadPreset(Preset),
    SetConfig(ConfigChange),
    /// New canvas size in pixels; existing positions are not rescaled
    Resize(Vec2),
}

impl Intent {
    /// Intents that create particles wait until the canvas has an area
    pub fn needs_canvas(&self) -> bool {
        matches!(self, Intent::PointerDown(_) | Intent::Reset | Intent::LoadPreset(_))
    }
}

/// Emitted by the simulation for the host to surface (toasts, logs)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    PresetActivated(Preset),
    Reset { particles: usize },
    Paused,
    Resumed,
}

/// Pointer state as last reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pointer {
    pub position: Vec2,
    pub held: bool,
}
