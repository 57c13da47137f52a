//! Responsive sizing
//!
//! The visible viewport is measured in world units on the plane through the
//! origin facing the camera, so the coin keeps the same on-screen proportion
//! regardless of canvas pixel size or device pixel ratio.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Canvas size plus the world-space extent visible at the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Drawing buffer size in physical pixels
    pub pixels: (u32, u32),
    /// Visible width/height in world units at the camera distance
    pub world: (f32, f32),
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let aspect = width as f32 / height as f32;
        let fov = CAMERA_FOV_Y_DEG.to_radians();
        let world_h = 2.0 * (fov * 0.5).tan() * CAMERA_RADIUS;
        Self {
            pixels: (width, height),
            world: (world_h * aspect, world_h),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.pixels.0 as f32 / self.pixels.1 as f32
    }
}

/// Coin dimensions in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoinGeometry {
    pub radius: f32,
    pub thickness: f32,
    pub inset_radius: f32,
    /// Distance of each inset disc from the coin's mid-plane
    pub inset_offset: f32,
}

impl CoinGeometry {
    pub fn from_viewport(width: f32, height: f32) -> Self {
        let radius = width.min(height) * COIN_VIEWPORT_FRACTION;
        let thickness = radius * COIN_THICKNESS_RATIO;
        Self {
            radius,
            thickness,
            inset_radius: radius * FACE_INSET_RATIO,
            inset_offset: thickness / 2.0 + FACE_INSET_OFFSET,
        }
    }

    pub fn for_viewport(viewport: &Viewport) -> Self {
        Self::from_viewport(viewport.world.0, viewport.world.1)
    }
}
