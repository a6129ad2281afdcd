//! Once-per-second readouts for the host UI: frame rate, population and energy

/// Interval between published snapshots, in seconds
pub const PUBLISH_INTERVAL: f32 = 1.0;

/// Mean kinetic energy per particle that reads as ~63% on the energy gauge
const REFERENCE_ENERGY: f32 = 2_000.0;

/// Weight of the newest sample in the smoothed energy gauge
const ENERGY_SMOOTHING: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetrySnapshot {
    pub fps: f32,
    pub particles: usize,
    /// ½Σ|v|² over the population (unit mass)
    pub kinetic_energy: f32,
    /// Smoothed gauge in [0, 100] derived from the mean kinetic energy
    pub energy_level: f32,
    /// Seconds since the simulation started
    pub uptime: f32,
}

#[derive(Debug, Default)]
pub struct Telemetry {
    frames: u32,
    window: f32,
    uptime: f32,
    energy_level: f32,
    latest: Option<TelemetrySnapshot>,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one frame that took `elapsed` seconds of wall time.
    /// Returns a fresh snapshot whenever a publish interval has passed.
    pub fn record_frame(&mut self, elapsed: f32, particles: usize, kinetic_energy: f32) -> Option<TelemetrySnapshot> {
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        self.frames += 1;
        self.window += elapsed;
        self.uptime += elapsed;

        let mean = if particles > 0 {
            kinetic_energy / particles as f32
        } else {
            0.0
        };
        let target = 100.0 * (1.0 - (-mean / REFERENCE_ENERGY).exp());
        self.energy_level += (target - self.energy_level) * ENERGY_SMOOTHING;

        if self.window < PUBLISH_INTERVAL {
            return None;
        }

        let snapshot = TelemetrySnapshot {
            fps: self.frames as f32 / self.window,
            particles,
            kinetic_energy,
            energy_level: self.energy_level.clamp(0.0, 100.0),
            uptime: self.uptime,
        };
        self.frames = 0;
        self.window = 0.0;
        self.latest = Some(snapshot);
        Some(snapshot)
    }

    pub fn latest(&self) -> Option<TelemetrySnapshot> {
        self.latest
    }

    pub fn uptime(&self) -> f32 {
        self.uptime
    }
}

/// Format seconds as `HH:MM:SS`
pub fn format_uptime(seconds: f32) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}
