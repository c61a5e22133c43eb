//! Analytic shading
//!
//! CPU reference of the per-fragment lighting and overlay math. The WGSL
//! in `shaders/lighting.wgsl` and `shaders/overlay.wgsl` evaluates the same
//! functions on the GPU.

mod brdf;
mod overlay;
mod uniforms;

pub use brdf::{
    direct_lighting, gamma_encode, luminance, shade, MaterialParams, SurfaceSample,
    DEFAULT_AMBIENT, GAMMA,
};
pub use overlay::{
    grid_tint, halftone, smoothstep, DotParams, GridParams, HatchParams, OverlayConfig,
    OverlayMode, OverlayPattern,
};
pub use uniforms::{FrameParams, ShadingUniforms};
