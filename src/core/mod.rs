//! Core rendering abstractions
//!
//! This module provides mid-level abstractions over wgpu primitives.

pub mod buffer;
pub mod pipeline;
pub mod render_states;
pub mod render_target;
pub mod shader;
pub mod texture;
pub mod vertex;

pub use buffer::{IndexBuffer, RawUniformBuffer, VertexBuffer};
pub use pipeline::PipelineBuilder;
pub use render_states::{ClearState, CullState, DepthState};
pub use render_target::RenderTarget;
pub use shader::{ShaderComposer, ShaderModule};
pub use texture::{ColorTexture, DepthTexture};
pub use vertex::{SkinnedVertex, VertexPN};
