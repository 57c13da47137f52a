//! Scene host
//!
//! Owns the viewport, lights, camera rig and coin. The platform layer feeds
//! it frame times, clicks and resizes; the renderer reads it back.

use glam::{Vec2, Vec3};

use super::camera::{CameraRig, RigParams};
use super::coin::{Coin, CoinEvent, SeededSpins, SpinSource};
use super::layout::{CoinGeometry, Viewport};
use super::sdf::{raymarch, sd_coin};
use crate::consts::*;

/// Raymarch budget for CPU picking
const PICK_STEPS: usize = 128;
const PICK_MAX_DIST: f32 = 40.0;

/// A light source with fixed color and intensity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient {
        color: Vec3,
        intensity: f32,
    },
    Directional {
        position: Vec3,
        color: Vec3,
        intensity: f32,
    },
    Spot {
        position: Vec3,
        color: Vec3,
        intensity: f32,
        /// Range past which the light contributes nothing
        distance: f32,
        /// Cone half-angle (radians)
        angle: f32,
    },
}

/// Unpack a 0xRRGGBB constant into 0..1 floats
const fn rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// The fixed light rig
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lights {
    pub ambient: Light,
    pub key: Light,
    pub fill: Light,
    pub spot: Light,
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            ambient: Light::Ambient {
                color: Vec3::ONE,
                intensity: 1.2,
            },
            key: Light::Directional {
                position: Vec3::new(5.0, 5.0, 5.0),
                color: rgb(0xFFFFFF),
                intensity: 2.0,
            },
            fill: Light::Directional {
                position: Vec3::new(-5.0, -5.0, 5.0),
                color: rgb(0xFFF9E5),
                intensity: 1.0,
            },
            spot: Light::Spot {
                position: Vec3::new(0.0, 5.0, 5.0),
                color: rgb(0xFFFFFF),
                intensity: 1.0,
                distance: 20.0,
                angle: 0.6,
            },
        }
    }
}

/// Text and normalized screen anchor for the result overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Label {
    pub text: &'static str,
    /// [0,1] screen coordinates, origin top-left
    pub anchor: Vec2,
}

/// Everything on screen
#[derive(Debug, Clone)]
pub struct Scene<S = SeededSpins> {
    pub viewport: Viewport,
    pub lights: Lights,
    pub camera: CameraRig,
    pub coin: Coin<S>,
    /// Seconds since the scene was created
    pub elapsed: f32,
}

impl Scene<SeededSpins> {
    pub fn new(seed: u64, width: u32, height: u32, rig: RigParams) -> Self {
        Self::with_spins(SeededSpins::new(seed), width, height, rig)
    }
}

impl<S: SpinSource> Scene<S> {
    pub fn with_spins(spins: S, width: u32, height: u32, rig: RigParams) -> Self {
        let viewport = Viewport::new(width, height);
        Self {
            viewport,
            lights: Lights::default(),
            camera: CameraRig::new(rig, viewport.aspect()),
            coin: Coin::new(spins, CoinGeometry::for_viewport(&viewport)),
            elapsed: 0.0,
        }
    }

    /// Advance camera and coin by one frame
    pub fn tick(&mut self, dt: f32) -> Option<CoinEvent> {
        self.elapsed += dt;
        self.camera.update(dt);
        let event = self.coin.update(dt);
        if let Some(CoinEvent::Landed { face, angle }) = event {
            log::info!("Coin landed on {} (angle {:.4} rad)", face.as_str(), angle);
        }
        event
    }

    /// Canvas resized; recompute projection and coin size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        self.camera.set_aspect(self.viewport.aspect());
        self.coin
            .set_geometry(CoinGeometry::for_viewport(&self.viewport));
        log::debug!(
            "Viewport {}x{} px, coin radius {:.3}",
            self.viewport.pixels.0,
            self.viewport.pixels.1,
            self.coin.geometry.radius
        );
    }

    /// Whether a pointer at normalized screen position `uv` is over the coin
    pub fn hit_test(&self, uv: Vec2) -> bool {
        let (origin, dir) = self.camera.screen_ray(uv);
        let geometry = self.coin.geometry;
        let orientation = self.coin.orientation;
        raymarch(origin, dir, PICK_MAX_DIST, PICK_STEPS, |p| {
            sd_coin(p, &geometry, orientation)
        })
        .is_some()
    }

    /// Pointer click at normalized screen position. Returns None when the
    /// click missed the coin.
    pub fn click(&mut self, uv: Vec2) -> Option<CoinEvent> {
        if !self.hit_test(uv) {
            return None;
        }
        let event = self.coin.click();
        match event {
            CoinEvent::SpinStarted {
                target_spins,
                deceleration,
            } => log::info!(
                "Flip started: {:.2} turns, deceleration {:.2} rad/s²",
                target_spins,
                deceleration
            ),
            CoinEvent::ClickIgnored => log::debug!("Click ignored while spinning"),
            CoinEvent::Landed { .. } => {}
        }
        Some(event)
    }

    /// Result overlay, present only once the coin has landed
    pub fn label(&self) -> Option<Label> {
        let face = self.coin.result?;
        let anchor = self.camera.project(Vec3::new(0.0, LABEL_HEIGHT, 0.0))?;
        Some(Label {
            text: face.as_str(),
            anchor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::coin::{Face, FixedSpins};

    fn scene() -> Scene<FixedSpins> {
        Scene::with_spins(FixedSpins(4.0), 800, 600, RigParams::default())
    }

    fn land(scene: &mut Scene<FixedSpins>) -> Face {
        for _ in 0..10_000 {
            if let Some(CoinEvent::Landed { face, .. }) = scene.tick(1.0 / 60.0) {
                return face;
            }
        }
        panic!("coin never landed");
    }

    #[test]
    fn test_center_click_starts_spin() {
        let mut s = scene();
        let event = s.click(Vec2::splat(0.5));
        assert!(matches!(event, Some(CoinEvent::SpinStarted { .. })));
        assert!(s.coin.is_spinning());
    }

    #[test]
    fn test_corner_click_misses() {
        let mut s = scene();
        assert_eq!(s.click(Vec2::new(0.02, 0.02)), None);
        assert!(!s.coin.is_spinning());
    }

    #[test]
    fn test_label_only_after_landing() {
        let mut s = scene();
        assert!(s.label().is_none());
        s.click(Vec2::splat(0.5));
        assert!(s.label().is_none());
        let face = land(&mut s);
        let label = s.label().expect("label after landing");
        assert_eq!(label.text, face.as_str());
        assert!(label.anchor.y < 0.5);
    }

    #[test]
    fn test_label_cleared_on_new_flip() {
        let mut s = scene();
        s.click(Vec2::splat(0.5));
        land(&mut s);
        assert!(s.coin.result.is_some());
        s.click(Vec2::splat(0.5));
        assert!(s.coin.result.is_none());
        assert!(s.label().is_none());
    }

    #[test]
    fn test_resize_rescales_coin() {
        let mut s = scene();
        let before = s.coin.geometry.radius;
        s.resize(600, 800);
        let after = s.coin.geometry.radius;
        // Portrait is width-limited, so the coin shrinks
        assert!(after < before);
        assert!((s.camera.aspect - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_tick_moves_camera_while_coin_idle() {
        let mut s = scene();
        let start = s.camera.position;
        assert_eq!(s.tick(0.25), None);
        assert_ne!(s.camera.position, start);
        assert!((s.elapsed - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_default_lights() {
        let lights = Lights::default();
        match lights.fill {
            Light::Directional { color, intensity, .. } => {
                assert!((color.z - 229.0 / 255.0).abs() < 1e-6);
                assert_eq!(intensity, 1.0);
            }
            _ => panic!("fill light should be directional"),
        }
    }
}
