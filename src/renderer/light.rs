//! Directional light
//!
//! The single shadow-casting light of the scene. Every setter bumps a
//! revision counter so consumers can tell when derived data (the light-space
//! transform) has to be rebuilt.

use glam::Vec3;

/// Travel direction used when the light position coincides with its target.
pub const FALLBACK_TRAVEL_DIRECTION: Vec3 = Vec3::NEG_Y;

const DEGENERATE_EPSILON: f32 = 1e-12;

/// Orthographic bounds of the light's shadow camera, in light view space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowFrustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl ShadowFrustum {
    /// Symmetric frustum `[-half_extent, half_extent]` on both axes.
    pub fn symmetric(half_extent: f32, near: f32, far: f32) -> Self {
        Self {
            left: -half_extent,
            right: half_extent,
            bottom: -half_extent,
            top: half_extent,
            near,
            far,
        }
    }
}

impl Default for ShadowFrustum {
    fn default() -> Self {
        Self::symmetric(6.0, 0.5, 20.0)
    }
}

/// Directional light with an orthographic shadow camera.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    position: Vec3,
    target: Vec3,
    color: [f32; 3],
    intensity: f32,
    casts_shadow: bool,
    frustum: ShadowFrustum,
    shadow_resolution: u32,
    revision: u64,
}

impl DirectionalLight {
    /// Create a new directional light placed at `position` and aimed at `target`.
    pub fn new(position: Vec3, target: Vec3, color: [f32; 3], intensity: f32) -> Self {
        Self {
            position,
            target,
            color,
            intensity,
            casts_shadow: true,
            frustum: ShadowFrustum::default(),
            shadow_resolution: 1024,
            revision: 0,
        }
    }

    /// Create a white directional light.
    pub fn white(intensity: f32, position: Vec3, target: Vec3) -> Self {
        Self::new(position, target, [1.0, 1.0, 1.0], intensity)
    }

    /// Set the shadow frustum (builder style).
    pub fn with_frustum(mut self, frustum: ShadowFrustum) -> Self {
        self.frustum = frustum;
        self
    }

    /// Set the shadow map resolution (builder style).
    pub fn with_shadow_resolution(mut self, resolution: u32) -> Self {
        self.shadow_resolution = resolution.max(1);
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn casts_shadow(&self) -> bool {
        self.casts_shadow
    }

    pub fn frustum(&self) -> ShadowFrustum {
        self.frustum
    }

    pub fn shadow_resolution(&self) -> u32 {
        self.shadow_resolution
    }

    /// Counter bumped by every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Unit vector the light travels along (target minus position).
    ///
    /// Falls back to [`FALLBACK_TRAVEL_DIRECTION`] when position equals target.
    pub fn travel_direction(&self) -> Vec3 {
        let delta = self.target - self.position;
        if delta.length_squared() <= DEGENERATE_EPSILON {
            FALLBACK_TRAVEL_DIRECTION
        } else {
            delta.normalize()
        }
    }

    /// Unit vector from the lit surface toward the light (`L` in shading).
    pub fn direction(&self) -> Vec3 {
        -self.travel_direction()
    }

    /// Color premultiplied by intensity.
    pub fn radiance(&self) -> Vec3 {
        Vec3::from(self.color) * self.intensity
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.touch();
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.touch();
    }

    pub fn set_color(&mut self, color: [f32; 3]) {
        self.color = color;
        self.touch();
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity.max(0.0);
        self.touch();
    }

    pub fn set_casts_shadow(&mut self, casts_shadow: bool) {
        self.casts_shadow = casts_shadow;
        self.touch();
    }

    pub fn set_frustum(&mut self, frustum: ShadowFrustum) {
        self.frustum = frustum;
        self.touch();
    }

    pub fn set_shadow_resolution(&mut self, resolution: u32) {
        self.shadow_resolution = resolution.max(1);
        self.touch();
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::white(1.0, Vec3::new(3.0, 8.0, 2.0), Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_points_toward_light() {
        let light = DirectionalLight::default();
        let expected = Vec3::new(3.0, 8.0, 2.0).normalize();
        assert!((light.direction() - expected).length() < 1e-6);
    }

    #[test]
    fn test_degenerate_direction_falls_back() {
        let light = DirectionalLight::white(1.0, Vec3::ONE, Vec3::ONE);
        assert_eq!(light.travel_direction(), FALLBACK_TRAVEL_DIRECTION);
        assert!(light.direction().is_finite());
    }

    #[test]
    fn test_setters_bump_revision() {
        let mut light = DirectionalLight::default();
        let r0 = light.revision();
        light.set_position(Vec3::new(1.0, 5.0, 0.0));
        light.set_intensity(2.0);
        assert_eq!(light.revision(), r0 + 2);
        assert_eq!(light.radiance(), Vec3::splat(2.0));
    }
}
