//! Frame input/output types

use crate::context::WgpuContext;
use crate::core::render_target::RenderTarget;
use crate::core::texture::DepthTexture;
use crate::window::event::Event;
pub use crate::renderer::viewer::Viewport;

/// Everything the frame callback needs to draw one frame.
pub struct FrameInput<'a> {
    /// Events since the previous frame.
    pub events: Vec<Event>,
    /// Seconds since the loop started.
    pub elapsed_time: f64,
    /// Seconds since the previous frame.
    pub delta_time: f64,
    pub viewport: Viewport,
    pub ctx: &'a WgpuContext,
    pub surface_view: &'a wgpu::TextureView,
    pub depth_texture: &'a DepthTexture,
    /// Non-sRGB surface format.
    pub surface_format: wgpu::TextureFormat,
}

impl<'a> FrameInput<'a> {
    /// Color and depth target of the window surface.
    pub fn screen_target(&self) -> RenderTarget<'a> {
        RenderTarget::from_surface(
            self.surface_view,
            Some(self.depth_texture),
            self.viewport.width,
            self.viewport.height,
            self.surface_format,
        )
    }
}

/// Result of a frame callback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOutput {
    pub exit: bool,
}

impl FrameOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the window after this frame.
    pub fn exit() -> Self {
        Self { exit: true }
    }
}
