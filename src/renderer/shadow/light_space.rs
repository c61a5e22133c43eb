//! Light-space transform of a directional light

use crate::renderer::light::DirectionalLight;
use glam::{Mat4, Vec3, Vec4};

/// Above this |dot(axis, Y)| the look-at basis switches to a +Z up vector.
const PARALLEL_UP_THRESHOLD: f32 = 0.999;

/// Maps light clip space to shadow map texture space:
/// `u = 0.5x + 0.5`, `v = 0.5 - 0.5y`, `depth = z`.
const CLIP_TO_TEXTURE: Mat4 = Mat4::from_cols(
    Vec4::new(0.5, 0.0, 0.0, 0.0),
    Vec4::new(0.0, -0.5, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 1.0, 0.0),
    Vec4::new(0.5, 0.5, 0.0, 1.0),
);

/// View, projection and texture-space matrices of the shadow camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSpaceTransform {
    view: Mat4,
    projection: Mat4,
    view_projection: Mat4,
    shadow_matrix: Mat4,
}

impl LightSpaceTransform {
    /// Build the transform from the light's pose and frustum.
    pub fn from_light(light: &DirectionalLight) -> Self {
        let travel = light.travel_direction();
        let eye = light.position();
        // A degenerate light keeps its position and looks along the fallback.
        let center = eye + travel;

        let up = if travel.dot(Vec3::Y).abs() > PARALLEL_UP_THRESHOLD {
            Vec3::Z
        } else {
            Vec3::Y
        };

        let view = Mat4::look_at_rh(eye, center, up);
        let f = light.frustum();
        let projection = Mat4::orthographic_rh(f.left, f.right, f.bottom, f.top, f.near, f.far);
        let view_projection = projection * view;

        Self {
            view,
            projection,
            view_projection,
            shadow_matrix: CLIP_TO_TEXTURE * view_projection,
        }
    }

    /// World to light view space.
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// Light view space to clip space.
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// `projection * view`.
    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    /// World to shadow map texture space (`uv` in xy, depth in z).
    pub fn shadow_matrix(&self) -> Mat4 {
        self.shadow_matrix
    }

    /// Project a world position to normalized device coordinates.
    pub fn project_ndc(&self, world: Vec3) -> Vec3 {
        self.view_projection.project_point3(world)
    }

    /// Project a world position to shadow map texture space.
    pub fn project_texture(&self, world: Vec3) -> Vec3 {
        self.shadow_matrix.project_point3(world)
    }
}

impl Default for LightSpaceTransform {
    fn default() -> Self {
        Self::from_light(&DirectionalLight::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_projects_to_map_center() {
        let transform = LightSpaceTransform::default();
        let uvz = transform.project_texture(Vec3::ZERO);
        assert!((uvz.x - 0.5).abs() < 1e-5);
        assert!((uvz.y - 0.5).abs() < 1e-5);

        // origin lies |(3,8,2)| units in front of the light
        let distance = Vec3::new(3.0, 8.0, 2.0).length();
        let expected = (distance - 0.5) / (20.0 - 0.5);
        assert!((uvz.z - expected).abs() < 1e-5);
    }

    #[test]
    fn test_texture_remap_matches_ndc() {
        let transform = LightSpaceTransform::default();
        let p = Vec3::new(1.0, 0.3, -2.0);
        let ndc = transform.project_ndc(p);
        let uvz = transform.project_texture(p);
        assert!((uvz.x - (0.5 * ndc.x + 0.5)).abs() < 1e-5);
        assert!((uvz.y - (0.5 - 0.5 * ndc.y)).abs() < 1e-5);
        assert!((uvz.z - ndc.z).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_light_has_no_nan() {
        let light = DirectionalLight::white(1.0, Vec3::new(0.0, 4.0, 0.0), Vec3::new(0.0, 4.0, 0.0));
        let transform = LightSpaceTransform::from_light(&light);
        assert!(!transform.view_projection().is_nan());
        assert!(transform.project_texture(Vec3::ZERO).is_finite());
    }

    #[test]
    fn test_vertical_light_has_no_nan() {
        let light = DirectionalLight::white(1.0, Vec3::new(0.0, 8.0, 0.0), Vec3::ZERO);
        let transform = LightSpaceTransform::from_light(&light);
        assert!(!transform.view().is_nan());
        let uvz = transform.project_texture(Vec3::ZERO);
        assert!((uvz.x - 0.5).abs() < 1e-5 && (uvz.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_moving_light_changes_transform() {
        let mut light = DirectionalLight::default();
        let before = LightSpaceTransform::from_light(&light);
        light.set_position(Vec3::new(-3.0, 8.0, 2.0));
        let after = LightSpaceTransform::from_light(&light);
        assert_ne!(before, after);
    }
}
