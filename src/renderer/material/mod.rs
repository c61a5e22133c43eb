//! Material abstractions
//!
//! Surface materials of the main pass and the depth material of the shadow
//! capture. All of them are composed from the WGSL modules in `shaders`.

mod analytic;
mod depth;
mod overlay;
pub mod shaders;
mod traits;

pub use analytic::{AnalyticMaterial, MaterialUniform};
pub use depth::{DepthMaterial, LightMatrixUniform};
pub use overlay::{OverlayMaterial, OverlayUniform};
pub use traits::{
    model_bind_group_layout, FrameUniform, Material, ModelBinding, ModelUniform, SurfaceLayouts,
};
