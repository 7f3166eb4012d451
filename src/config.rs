use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::orbit::{KeplerSettings, DEFAULT_POINT_COUNT};

pub const DEFAULT_API_URL: &str = "https://solarapp-api.yannick-schwab.de";

const DEFAULT_PALETTE: [(&str, u32); 9] = [
    ("Mercury", 0xbfbfbf),
    ("Venus", 0xffcc00),
    ("Earth", 0x0033ff),
    ("Mars", 0xff5733),
    ("Jupiter", 0xd2b48c),
    ("Saturn", 0xffd700),
    ("Uranus", 0x00ffff),
    ("Neptune", 0x0000ff),
    ("Pluto", 0xa9a9a9),
];

/// Runtime settings, read from `/assets/config.json`. Missing keys fall back
/// to the defaults below.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    /// Provider distances are divided by this before reaching the scene
    pub distance_scale: f64,
    /// Provider radii are multiplied by this
    pub size_scale: f64,
    /// Simulated days per real second
    pub speed_multiplier: f64,
    pub orbit_points: usize,
    pub kepler_tolerance: f64,
    pub kepler_max_iterations: u32,
    pub fly_to_duration_ms: f64,
    pub body_colors: HashMap<String, u32>,
    pub orbit_color: u32,
    pub pluto_orbit_color: u32,
    pub highlight_color: u32,
    /// Halo radius relative to the body radius
    pub halo_scale: f64,
    /// Display names keyed by English name
    pub translations: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_url: DEFAULT_API_URL.to_string(),
            distance_scale: 1000.0,
            size_scale: 0.0001,
            speed_multiplier: 1.0,
            orbit_points: DEFAULT_POINT_COUNT,
            kepler_tolerance: 1e-6,
            kepler_max_iterations: 100,
            fly_to_duration_ms: 1000.0,
            body_colors: DEFAULT_PALETTE
                .iter()
                .map(|(name, color)| (name.to_string(), *color))
                .collect(),
            orbit_color: 0xffffff,
            pluto_orbit_color: 0xff0000,
            highlight_color: 0xffffff,
            halo_scale: 3.0,
            translations: HashMap::new(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn kepler_settings(&self) -> KeplerSettings {
        KeplerSettings {
            tolerance: self.kepler_tolerance,
            max_iterations: self.kepler_max_iterations,
        }
    }

    /// Body colour as linear RGB, white when the name is unknown.
    pub fn body_color(&self, name: &str) -> (f32, f32, f32) {
        hex_to_rgb(self.body_colors.get(name).copied().unwrap_or(0xffffff))
    }

    pub fn display_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.translations.get(name).map(String::as_str).unwrap_or(name)
    }
}

pub fn hex_to_rgb(hex: u32) -> (f32, f32, f32) {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    (r, g, b)
}
