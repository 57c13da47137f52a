//! Coin Flip - a spinning 3D coin that lands on heads or tails
//!
//! Core modules:
//! - `sim`: Coin spin state machine, camera rig, scene host, picking
//! - `renderer`: WebGPU raymarching pipeline
//! - `platform`: Browser frame loop and DOM listeners
//! - `settings`: Startup configuration

pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::InitError;
pub use settings::{QualityPreset, Settings};

use std::f32::consts::{FRAC_PI_2, TAU};

/// Scene configuration constants
pub mod consts {
    /// Angular velocity given to the coin on every accepted click (rad/s)
    pub const SPIN_START_VELOCITY: f32 = 30.0;
    /// Spin count range, sampled uniformly from [MIN, MAX)
    pub const MIN_SPINS: f32 = 3.0;
    pub const MAX_SPINS: f32 = 6.0;
    /// Tolerance when deciding whether a snapped angle is the heads angle
    pub const HEADS_TOLERANCE: f32 = 0.01;

    /// Coin radius as a fraction of the viewport's smaller side
    pub const COIN_VIEWPORT_FRACTION: f32 = 0.35;
    pub const COIN_THICKNESS_RATIO: f32 = 0.1;
    /// Face inset radius relative to the coin radius
    pub const FACE_INSET_RATIO: f32 = 0.9;
    /// Gap between the coin face and the inset disc
    pub const FACE_INSET_OFFSET: f32 = 0.01;

    /// Camera orbit
    pub const CAMERA_RADIUS: f32 = 10.0;
    pub const CAMERA_ARC_HALF_ANGLE_DEG: f32 = 15.0;
    pub const CAMERA_SPEED: f32 = 2.0;
    pub const CAMERA_Y_OFFSET: f32 = 0.8;
    pub const CAMERA_FOV_Y_DEG: f32 = 70.0;

    /// World-space height of the result label above the coin
    pub const LABEL_HEIGHT: f32 = 5.0;

    /// Fallback frame time for the very first frame
    pub const FIRST_FRAME_DT: f32 = 1.0 / 60.0;
}

/// Snap an orientation to the nearest quarter turn that shows a flat face.
///
/// Odd quarter turns face the viewer; even ones are edge-on and get pushed
/// one quarter turn forward.
#[inline]
pub fn snap_to_face(angle: f32) -> f32 {
    let quarter_turns = (angle / FRAC_PI_2).round() as i64;
    let snapped = if quarter_turns.rem_euclid(4) % 2 == 1 {
        quarter_turns
    } else {
        quarter_turns + 1
    };
    snapped as f32 * FRAC_PI_2
}

/// Normalize an angle to [0, 2π)
#[inline]
pub fn normalize_positive(angle: f32) -> f32 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU { 0.0 } else { a }
}
