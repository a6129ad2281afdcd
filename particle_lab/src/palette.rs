//! Color palettes particles draw their color from at creation time

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Linear RGBA color in [0, 1]
pub type Rgba = [f32; 4];

const RAINBOW: &[[u8; 3]] = &[
    [0xff, 0x00, 0x88],
    [0xff, 0x88, 0x00],
    [0xff, 0xff, 0x00],
    [0x00, 0xff, 0x88],
    [0x00, 0x88, 0xff],
    [0x88, 0x00, 0xff],
];

const ENERGY: &[[u8; 3]] = &[
    [0x00, 0xff, 0x88],
    [0x00, 0x88, 0xff],
    [0xff, 0x00, 0x88],
];

const MONO: &[[u8; 3]] = &[
    [0x3b, 0x82, 0xf6],
    [0x60, 0xa5, 0xfa],
    [0x93, 0xc5, 0xfd],
];

/// Active color mode; doubles as the palette handle passed to presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Rainbow,
    Energy,
    Mono,
}

impl ColorMode {
    pub const ALL: [ColorMode; 3] = [ColorMode::Rainbow, ColorMode::Energy, ColorMode::Mono];

    pub fn name(&self) -> &'static str {
        match self {
            ColorMode::Rainbow => "rainbow",
            ColorMode::Energy => "energy",
            ColorMode::Mono => "mono",
        }
    }

    fn swatches(&self) -> &'static [[u8; 3]] {
        match self {
            ColorMode::Rainbow => RAINBOW,
            ColorMode::Energy => ENERGY,
            ColorMode::Mono => MONO,
        }
    }

    /// All colors of this palette, fully opaque
    pub fn colors(&self) -> Vec<Rgba> {
        self.swatches().iter().map(|&c| rgb(c)).collect()
    }

    /// Uniformly random color from the palette
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Rgba {
        let swatches = self.swatches();
        rgb(swatches[rng.gen_range(0..swatches.len())])
    }

    /// Next mode in display order, wrapping around
    pub fn next(&self) -> Self {
        match self {
            ColorMode::Rainbow => ColorMode::Energy,
            ColorMode::Energy => ColorMode::Mono,
            ColorMode::Mono => ColorMode::Rainbow,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorMode {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rainbow" => Ok(ColorMode::Rainbow),
            "energy" => Ok(ColorMode::Energy),
            "mono" => Ok(ColorMode::Mono),
            _ => Err(SimError::UnknownColorMode { name: s.to_string() }),
        }
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Rgba {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

/// Same color with its alpha replaced
pub fn with_alpha(color: Rgba, alpha: f32) -> Rgba {
    [color[0], color[1], color[2], alpha.clamp(0.0, 1.0)]
}

/// Color from 8-bit channels and a float alpha
pub fn rgba8(r: u8, g: u8, b: u8, alpha: f32) -> Rgba {
    with_alpha(rgb([r, g, b]), alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn picks_only_palette_colors() {
        let mut rng = StdRng::seed_from_u64(3);
        for mode in ColorMode::ALL {
            let colors = mode.colors();
            for _ in 0..50 {
                assert!(colors.contains(&mode.pick(&mut rng)));
            }
        }
    }

    #[test]
    fn cycling_visits_every_mode() {
        let mut mode = ColorMode::Rainbow;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(mode, ColorMode::Rainbow);
        assert_eq!(seen, ColorMode::ALL.to_vec());
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Energy".parse::<ColorMode>().unwrap(), ColorMode::Energy);
        assert!("plaid".parse::<ColorMode>().is_err());
    }

    #[test]
    fn mono_palette_starts_with_accent_blue() {
        let first = ColorMode::Mono.colors()[0];
        assert!((first[0] - 0x3b as f32 / 255.0).abs() < 1e-6);
        assert!((first[2] - 0xf6 as f32 / 255.0).abs() < 1e-6);
    }
}
