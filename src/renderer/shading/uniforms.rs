//! Typed shading parameters

use super::{OverlayConfig, DEFAULT_AMBIENT};
use crate::renderer::light::DirectionalLight;
use crate::renderer::shadow::{LightSpaceTransform, ShadowBias, ShadowMapHandle};
use crate::renderer::viewer::Viewer;
use glam::{Mat4, Vec3};

/// Parameters that change once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    /// Seconds since the scene started.
    pub elapsed: f32,
    pub camera_position: Vec3,
    pub view_projection: Mat4,
    /// Unit vector toward the light.
    pub light_direction: Vec3,
    /// Light color times intensity.
    pub light_radiance: Vec3,
    pub ambient: f32,
    pub light_space: LightSpaceTransform,
    pub bias: ShadowBias,
    /// Set only after a depth capture has written the map.
    pub shadow_map: Option<ShadowMapHandle>,
    pub viewport: (u32, u32),
}

impl FrameParams {
    /// Copy camera state.
    pub fn set_viewer(&mut self, viewer: &dyn Viewer) {
        self.camera_position = viewer.position();
        self.view_projection = viewer.view_projection_matrix();
        let viewport = viewer.viewport();
        self.viewport = (viewport.width, viewport.height);
    }

    /// Copy light color and direction. The light-space transform is
    /// refreshed separately when the light changes.
    pub fn set_light(&mut self, light: &DirectionalLight) {
        self.light_direction = light.direction();
        self.light_radiance = light.radiance();
    }
}

impl Default for FrameParams {
    fn default() -> Self {
        let light = DirectionalLight::default();
        Self {
            elapsed: 0.0,
            camera_position: Vec3::ZERO,
            view_projection: Mat4::IDENTITY,
            light_direction: light.direction(),
            light_radiance: light.radiance(),
            ambient: DEFAULT_AMBIENT,
            light_space: LightSpaceTransform::from_light(&light),
            bias: ShadowBias::default(),
            shadow_map: None,
            viewport: (1, 1),
        }
    }
}

/// Everything the surface shaders read besides per-object transforms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadingUniforms {
    pub frame: FrameParams,
    pub overlay: OverlayConfig,
}
