//! WebGPU rendering module
//!
//! Uses SDF (Signed Distance Fields) raymarching in the fragment shader.

pub mod sdf_pipeline;

pub use sdf_pipeline::SdfRenderState;
