//! Scene simulation module
//!
//! Everything that moves lives here, free of rendering and browser
//! dependencies so it can be driven headless:
//! - Frame-time driven (dt supplied by the caller)
//! - Spin counts come from an injectable source
//! - Picking uses the same distance field the shader draws

pub mod camera;
pub mod coin;
pub mod layout;
pub mod scene;
pub mod sdf;

pub use camera::{CameraRig, RigParams};
pub use coin::{Coin, CoinEvent, Face, FixedSpins, SeededSpins, SpinSource, SpinState};
pub use layout::{CoinGeometry, Viewport};
pub use scene::{Label, Light, Lights, Scene};
pub use sdf::{RayHit, raymarch, sd_capped_cylinder, sd_coin};
