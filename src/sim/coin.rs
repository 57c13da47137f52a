//! Coin entity: spin state machine
//!
//! A click on an idle coin gives it a fixed launch speed and a constant
//! deceleration chosen so it sweeps roughly `target_spins` full turns before
//! stopping. On stop the orientation snaps to a face-up quarter turn and the
//! result is read off that angle.

use std::f32::consts::{FRAC_PI_2, TAU};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::layout::CoinGeometry;
use crate::consts::*;
use crate::{normalize_positive, snap_to_face};

/// Which face ended up toward the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Face {
    Heads,
    Tails,
}

impl Face {
    pub fn as_str(&self) -> &'static str {
        match self {
            Face::Heads => "Heads",
            Face::Tails => "Tails",
        }
    }

    /// Read the face from a snapped orientation
    pub fn from_angle(angle: f32) -> Self {
        if (normalize_positive(angle) - FRAC_PI_2).abs() < HEADS_TOLERANCE {
            Face::Heads
        } else {
            Face::Tails
        }
    }
}

/// Source of spin counts for new flips
pub trait SpinSource {
    /// Number of full turns for the next flip, in [MIN_SPINS, MAX_SPINS)
    fn next_spins(&mut self) -> f32;
}

/// Seeded PCG spin source used by the live scene
#[derive(Debug, Clone)]
pub struct SeededSpins {
    rng: Pcg32,
}

impl SeededSpins {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl SpinSource for SeededSpins {
    fn next_spins(&mut self) -> f32 {
        self.rng.random_range(MIN_SPINS..MAX_SPINS)
    }
}

/// Always returns the same spin count
#[derive(Debug, Clone, Copy)]
pub struct FixedSpins(pub f32);

impl SpinSource for FixedSpins {
    fn next_spins(&mut self) -> f32 {
        self.0
    }
}

/// Transient state of one flip
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpinState {
    pub spinning: bool,
    /// rad/s, non-increasing while spinning
    pub angular_velocity: f32,
    /// Orientation at launch plus everything swept since
    pub cumulative_rotation: f32,
    pub target_spins: f32,
    /// rad/s², negative
    pub deceleration: f32,
}

impl SpinState {
    /// Fresh state for a flip starting at `orientation`
    pub fn launch(orientation: f32, target_spins: f32) -> Self {
        let velocity = SPIN_START_VELOCITY;
        // v² = u² + 2as with v = 0
        let distance = target_spins * TAU;
        Self {
            spinning: true,
            angular_velocity: velocity,
            cumulative_rotation: orientation,
            target_spins,
            deceleration: -(velocity * velocity) / (2.0 * distance),
        }
    }
}

/// Events raised by the coin, consumed by the scene host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoinEvent {
    /// A click was accepted; result cleared
    SpinStarted { target_spins: f32, deceleration: f32 },
    /// A click arrived mid-spin and was dropped
    ClickIgnored,
    /// The coin stopped and snapped to a face
    Landed { face: Face, angle: f32 },
}

/// The coin entity
#[derive(Debug, Clone)]
pub struct Coin<S = SeededSpins> {
    /// Rotation about the world X axis (radians)
    pub orientation: f32,
    pub spin: SpinState,
    pub result: Option<Face>,
    pub geometry: CoinGeometry,
    spins: S,
}

impl<S: SpinSource> Coin<S> {
    pub fn new(spins: S, geometry: CoinGeometry) -> Self {
        Self {
            // Heads toward the camera
            orientation: FRAC_PI_2,
            spin: SpinState::default(),
            result: None,
            geometry,
            spins,
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.spin.spinning
    }

    /// Handle a click on the coin's surface
    pub fn click(&mut self) -> CoinEvent {
        if self.spin.spinning {
            return CoinEvent::ClickIgnored;
        }

        self.result = None;
        let target_spins = self.spins.next_spins();
        self.spin = SpinState::launch(self.orientation, target_spins);

        CoinEvent::SpinStarted {
            target_spins,
            deceleration: self.spin.deceleration,
        }
    }

    /// Advance by one rendered frame
    pub fn update(&mut self, dt: f32) -> Option<CoinEvent> {
        if !self.spin.spinning {
            return None;
        }

        let rotation = self.spin.angular_velocity * dt;
        self.orientation += rotation;
        self.spin.cumulative_rotation += rotation;
        self.spin.angular_velocity += self.spin.deceleration * dt;

        if self.spin.angular_velocity > 0.0 {
            return None;
        }

        self.spin.angular_velocity = 0.0;
        self.spin.spinning = false;

        // Wrap so orientation stays small across any number of flips
        let angle = normalize_positive(snap_to_face(self.orientation));
        self.orientation = angle;
        let face = Face::from_angle(angle);
        self.result = Some(face);

        Some(CoinEvent::Landed { face, angle })
    }

    /// Replace geometry after a viewport change
    pub fn set_geometry(&mut self, geometry: CoinGeometry) {
        self.geometry = geometry;
    }
}
