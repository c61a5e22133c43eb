//! High-level rendering
//!
//! Light and camera, geometry, the shadow mapper, the analytic shading model
//! and the materials and frame renderer built on them.

#[cfg(feature = "window")]
pub mod control;
pub mod geometry;
pub mod light;
pub mod material;
pub mod scene_renderer;
pub mod shading;
pub mod shadow;
pub mod viewer;

#[cfg(feature = "window")]
pub use control::LightControl;
pub use geometry::{Geometry, Mesh, MeshData};
pub use light::{DirectionalLight, ShadowFrustum};
pub use material::{AnalyticMaterial, DepthMaterial, Material, OverlayMaterial};
pub use scene_renderer::SceneRenderer;
pub use shading::{MaterialParams, OverlayConfig, OverlayMode, ShadingUniforms};
pub use shadow::{
    DepthEncoding, DirectionalShadow, LightSpaceTransform, ShadowBias, ShadowCapture,
    ShadowConfig, ShadowMap, ShadowMapHandle,
};
pub use viewer::{Camera, Viewer, Viewport};
