//! Hard shadow test

use super::{LightSpaceTransform, ShadowBias, ShadowMap};
use glam::Vec3;

/// `max(min_bias, slope_scale * (1 - dot(N, L)))`.
pub fn shadow_bias(bias: ShadowBias, normal: Vec3, light_dir: Vec3) -> f32 {
    bias.min_bias.max(bias.slope_scale * (1.0 - normal.dot(light_dir)))
}

/// Visibility of `world` from the light: 1.0 lit, 0.0 shadowed.
///
/// Positions outside the light frustum and frames without a captured map
/// are fully lit.
pub fn shadow_factor(
    world: Vec3,
    transform: &LightSpaceTransform,
    normal: Vec3,
    light_dir: Vec3,
    map: Option<&ShadowMap>,
    bias: ShadowBias,
) -> f32 {
    let clip = transform.view_projection() * world.extend(1.0);
    if clip.w.abs() <= f32::EPSILON {
        return 1.0;
    }
    let ndc = clip.truncate() / clip.w;
    if !ndc.is_finite() || !(0.0..=1.0).contains(&ndc.z) {
        return 1.0;
    }

    let u = 0.5 * ndc.x + 0.5;
    let v = 0.5 - 0.5 * ndc.y;
    if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
        return 1.0;
    }

    let Some(map) = map else {
        return 1.0;
    };

    let res = map.resolution();
    let x = ((u * res as f32).floor() as u32).min(res - 1);
    let y = ((v * res as f32).floor() as u32).min(res - 1);
    let stored = map.depth_at(x, y);

    if ndc.z - shadow_bias(bias, normal, light_dir) <= stored {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::light::DirectionalLight;
    use crate::renderer::shadow::DepthEncoding;

    fn occluded_map() -> ShadowMap {
        let mut map = ShadowMap::new(64, DepthEncoding::Native);
        map.fill(0.0);
        map
    }

    #[test]
    fn test_outside_frustum_is_lit() {
        let light = DirectionalLight::default();
        let transform = LightSpaceTransform::from_light(&light);
        let map = occluded_map();
        let l = light.direction();

        for p in [
            Vec3::new(50.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -40.0),
            // beyond the far plane along the light axis
            -l * 30.0,
            // in front of the near plane
            light.position() + l * 0.1,
        ] {
            assert_eq!(shadow_factor(p, &transform, Vec3::Y, l, Some(&map), ShadowBias::default()), 1.0);
        }
    }

    #[test]
    fn test_missing_map_is_lit() {
        let light = DirectionalLight::default();
        let transform = LightSpaceTransform::from_light(&light);
        let f = shadow_factor(Vec3::ZERO, &transform, Vec3::Y, light.direction(), None, ShadowBias::default());
        assert_eq!(f, 1.0);
    }

    #[test]
    fn test_occluded_point_is_shadowed() {
        let light = DirectionalLight::default();
        let transform = LightSpaceTransform::from_light(&light);
        let map = occluded_map();
        let f = shadow_factor(Vec3::ZERO, &transform, Vec3::Y, light.direction(), Some(&map), ShadowBias::default());
        assert_eq!(f, 0.0);
    }

    #[test]
    fn test_self_depth_within_bias_is_lit() {
        let light = DirectionalLight::default();
        let transform = LightSpaceTransform::from_light(&light);
        let depth = transform.project_texture(Vec3::ZERO).z;

        let mut map = ShadowMap::new(64, DepthEncoding::PackedRgba8);
        map.fill(depth - 0.0001);
        let f = shadow_factor(Vec3::ZERO, &transform, Vec3::Y, light.direction(), Some(&map), ShadowBias::default());
        assert_eq!(f, 1.0);
    }

    #[test]
    fn test_bias_grows_at_grazing_angles() {
        let bias = ShadowBias {
            min_bias: 0.001,
            slope_scale: 0.01,
        };
        assert_eq!(shadow_bias(bias, Vec3::Y, Vec3::Y), 0.001);
        assert!((shadow_bias(bias, Vec3::Y, Vec3::X) - 0.01).abs() < 1e-7);
    }
}
