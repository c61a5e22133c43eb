//! umbra
//!
//! Shadow-mapped analytic shading on wgpu: a directional light captures a
//! depth map, surfaces are lit with Lambert + Blinn-Phong and gamma-encoded,
//! and the floor carries a procedural grid or halftone overlay.
//!
//! # Architecture
//!
//! 1. **context** - wgpu adapter, device and queue
//! 2. **core** - buffers, textures, pipelines, vertex types, WGSL composition
//! 3. **renderer** - light, camera, shadow mapping, shading, materials
//! 4. **animation** - skeletons, keyframe clips, CPU skinning
//! 5. **assets** - background glTF import
//! 6. **scene** - scene state and the per-frame update loop
//! 7. **window** - winit window and render loop (feature = "window")

pub mod animation;
pub mod assets;
pub mod context;
pub mod core;
pub mod error;
pub mod renderer;
pub mod scene;

#[cfg(feature = "window")]
pub mod window;

pub use context::WgpuContext;
pub use error::{AnimationError, AssetError, ShaderError};

pub use core::{
    ClearState, ColorTexture, CullState, DepthState, DepthTexture, IndexBuffer, PipelineBuilder,
    RawUniformBuffer, RenderTarget, ShaderComposer, ShaderModule, SkinnedVertex, VertexBuffer,
    VertexPN,
};

pub use renderer::{
    Camera, DepthEncoding, DirectionalLight, DirectionalShadow, Geometry, LightSpaceTransform,
    MaterialParams, Mesh, MeshData, OverlayConfig, OverlayMode, SceneRenderer, ShadingUniforms,
    ShadowBias, ShadowConfig, ShadowFrustum, ShadowMap, Viewer, Viewport,
};

pub use animation::{AnimatedModel, AnimationClip, Skeleton};
pub use assets::{AssetLoader, PendingModel};
pub use scene::{Scene, SceneConfig, SceneState};

#[cfg(feature = "window")]
pub use renderer::LightControl;

#[cfg(feature = "window")]
pub use window::{Event, FrameInput, FrameOutput, Key, Window, WindowSettings};

pub use glam;
