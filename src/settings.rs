//! Startup settings
//!
//! Read once from an optional JSON block in the host page; never written
//! back.

use serde::{Deserialize, Serialize};

use crate::sim::RigParams;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Sphere-tracing step budget per pixel
    pub fn raymarch_steps(&self) -> u32 {
        match self {
            QualityPreset::Low => 48,
            QualityPreset::Medium => 96,
            QualityPreset::High => 160,
        }
    }

    /// Highest device pixel ratio the canvas is allowed to render at
    pub fn max_pixel_ratio(&self) -> f64 {
        match self {
            QualityPreset::Low => 1.0,
            QualityPreset::Medium => 2.0,
            QualityPreset::High => 2.0,
        }
    }
}

/// Scene settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Keep the camera still
    pub reduced_motion: bool,
    /// Fixed seed for spin counts (random per page load when absent)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            reduced_motion: false,
            seed: None,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Parse settings JSON, falling back to defaults on malformed input
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring malformed settings: {}", e);
                Self::default()
            }
        }
    }

    /// Camera rig parameters honoring reduced motion
    pub fn rig_params(&self) -> RigParams {
        if self.reduced_motion {
            RigParams::still()
        } else {
            RigParams::default()
        }
    }

    /// Device pixel ratio clamped to [1, quality cap]
    pub fn pixel_ratio(&self, device: f64) -> f64 {
        device.clamp(1.0, self.quality.max_pixel_ratio())
    }

    /// Element id of the settings block in the host page
    const ELEMENT_ID: &'static str = "coin-settings";

    /// Load settings from the host page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::ELEMENT_ID))
            .and_then(|el| el.text_content());

        match json {
            Some(json) if !json.trim().is_empty() => {
                let settings = Self::from_json(&json);
                log::info!("Loaded settings: {:?}", settings);
                settings
            }
            _ => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No host page for #{}; using defaults", Self::ELEMENT_ID);
        Self::default()
    }
}
