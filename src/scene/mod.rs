//! Scene state and the per-frame update loop
//!
//! The scene owns the canonical light, camera and shading parameters. The
//! frame driver calls [`Scene::update`] once per displayed frame and
//! [`Scene::resize`] when the surface changes size; renderers read the
//! resulting [`ShadingUniforms`].

use crate::animation::AnimatedModel;
use crate::assets::{AssetLoader, PendingModel};
use crate::error::AssetError;
use crate::renderer::geometry::MeshData;
use crate::renderer::light::{DirectionalLight, ShadowFrustum};
use crate::renderer::shading::{MaterialParams, OverlayConfig, ShadingUniforms, DEFAULT_AMBIENT};
use crate::renderer::shadow::{
    shadow_factor, LightSpaceTransform, ShadowConfig, ShadowMap, ShadowMapHandle,
};
use crate::renderer::viewer::{Camera, Viewport};
use glam::{Mat4, Quat, Vec3};
use std::f32::consts::TAU;
use std::path::PathBuf;

/// Centre of the demo sphere.
pub const SUBJECT_CENTER: Vec3 = Vec3::new(0.0, 0.8, 0.0);
/// Spin of the demo sphere about Y, in radians per second.
pub const SUBJECT_SPIN: f32 = 0.3;

/// Scene configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub ambient: f32,
    /// Background color, written to the surface as is.
    pub clear_color: [f32; 3],
    pub shadow: ShadowConfig,
    pub overlay: OverlayConfig,
    /// Skinned glTF/GLB model loaded in the background.
    pub model_path: Option<PathBuf>,
}

impl SceneConfig {
    pub fn with_ambient(mut self, ambient: f32) -> Self {
        self.ambient = ambient.max(0.0);
        self
    }

    pub fn with_shadow(mut self, shadow: ShadowConfig) -> Self {
        self.shadow = shadow;
        self
    }

    pub fn with_overlay(mut self, overlay: OverlayConfig) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            ambient: DEFAULT_AMBIENT,
            clear_color: [0.063, 0.063, 0.094],
            shadow: ShadowConfig::default(),
            overlay: OverlayConfig::default(),
            model_path: None,
        }
    }
}

/// Mesh placed in the world.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub mesh: MeshData,
    pub transform: Mat4,
    pub casts_shadow: bool,
}

/// Skinned model lifecycle.
pub enum ModelSlot {
    /// No model requested, or the import failed.
    Absent,
    Loading(PendingModel),
    Ready(Box<AnimatedModel>),
}

/// Coarse update state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    /// A model import is in flight; animation does not advance.
    Loading,
    Ready,
}

type AssetErrorCallback = Box<dyn FnMut(&AssetError)>;

/// Floor, spinning sphere, optional skinned model and the shadow light.
pub struct Scene {
    config: SceneConfig,
    camera: Camera,
    light: DirectionalLight,
    light_revision: Option<u64>,
    floor: SceneObject,
    floor_material: MaterialParams,
    subject: SceneObject,
    subject_material: MaterialParams,
    subject_angle: f32,
    model: ModelSlot,
    model_transform: Mat4,
    model_material: MaterialParams,
    uniforms: ShadingUniforms,
    captured: Option<ShadowMapHandle>,
    cpu_shadow: Option<ShadowMap>,
    cpu_generation: u64,
    last_error: Option<AssetError>,
    on_error: Option<AssetErrorCallback>,
}

impl Scene {
    /// Build the demo scene and start loading the configured model.
    pub fn new(config: SceneConfig, viewport: Viewport) -> Self {
        let camera = Camera::new_perspective(
            Vec3::new(0.0, 1.5, 4.0),
            Vec3::ZERO,
            60.0,
            viewport,
            0.1,
            100.0,
        );
        let light = DirectionalLight::white(1.0, Vec3::new(3.0, 8.0, 2.0), Vec3::ZERO)
            .with_frustum(ShadowFrustum::symmetric(6.0, 0.5, 20.0))
            .with_shadow_resolution(config.shadow.resolution);

        let model = match &config.model_path {
            Some(path) => ModelSlot::Loading(AssetLoader::load_skinned(path.clone())),
            None => ModelSlot::Absent,
        };

        let mut uniforms = ShadingUniforms {
            overlay: config.overlay.clone(),
            ..Default::default()
        };
        uniforms.frame.ambient = config.ambient;
        uniforms.frame.bias = config.shadow.bias;

        let mut scene = Self {
            camera,
            light,
            light_revision: None,
            floor: SceneObject {
                mesh: MeshData::plane(10.0, 10.0),
                transform: Mat4::IDENTITY,
                casts_shadow: false,
            },
            floor_material: MaterialParams::new(Vec3::new(0.133, 0.133, 0.157), 0.0, 0.9),
            subject: SceneObject {
                mesh: MeshData::sphere(0.7, 32, 16),
                transform: Mat4::from_translation(SUBJECT_CENTER),
                casts_shadow: true,
            },
            subject_material: MaterialParams::new(Vec3::new(0.533, 0.706, 1.0), 0.1, 0.3),
            subject_angle: 0.0,
            model,
            model_transform: Mat4::IDENTITY,
            model_material: MaterialParams::new(Vec3::splat(0.8), 0.0, 0.6),
            uniforms,
            captured: None,
            cpu_shadow: None,
            cpu_generation: 0,
            last_error: None,
            on_error: None,
            config,
        };
        scene.refresh_camera();
        scene.refresh_light();
        scene
    }

    /// Advance the scene by one frame.
    pub fn update(&mut self, dt: f32, elapsed: f32) {
        self.uniforms.frame.elapsed = elapsed;
        self.refresh_light();
        self.refresh_camera();

        // only a populated map may reach the shading uniforms
        self.uniforms.frame.shadow_map = if self.light.casts_shadow() {
            self.captured
        } else {
            None
        };

        self.poll_model();
        if let ModelSlot::Ready(model) = &mut self.model {
            model.advance(dt);
        }

        self.subject_angle = (self.subject_angle + dt * SUBJECT_SPIN).rem_euclid(TAU);
        self.subject.transform = Mat4::from_rotation_translation(
            Quat::from_rotation_y(self.subject_angle),
            SUBJECT_CENTER,
        );
    }

    /// Update the camera for a new surface size. The light frustum is untouched.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(Viewport::new(width, height));
        self.refresh_camera();
    }

    /// Record that a depth capture has written the shadow map.
    ///
    /// The handle reaches the shading uniforms on the next [`Scene::update`].
    pub fn record_capture(&mut self, handle: ShadowMapHandle) {
        self.captured = Some(handle);
    }

    /// Capture the shadow map on the CPU with the current light transform.
    pub fn capture_shadow_map(&mut self) -> ShadowMapHandle {
        let resolution = self.light.shadow_resolution();
        let encoding = self.config.shadow.encoding;
        let mut map = match self.cpu_shadow.take() {
            Some(map) if map.resolution() == resolution && map.encoding() == encoding => map,
            _ => ShadowMap::new(resolution, encoding),
        };

        let model_mesh = match &self.model {
            ModelSlot::Ready(model) => Some(model.mesh_data()),
            _ => None,
        };
        let casters = [&self.floor, &self.subject]
            .into_iter()
            .filter(|object| object.casts_shadow)
            .map(|object| (object.transform, &object.mesh))
            .chain(model_mesh.as_ref().map(|mesh| (self.model_transform, mesh)));
        map.capture(&self.uniforms.frame.light_space, casters);
        self.cpu_shadow = Some(map);

        self.cpu_generation += 1;
        let handle = ShadowMapHandle::new(self.cpu_generation, resolution, encoding);
        self.record_capture(handle);
        tracing::debug!("captured {}x{} shadow map on the CPU", resolution, resolution);
        handle
    }

    /// Shadow test against the CPU map, as the shading uniforms see it.
    pub fn shadow_factor_at(&self, world: Vec3, normal: Vec3) -> f32 {
        let frame = &self.uniforms.frame;
        let map = frame.shadow_map.and(self.cpu_shadow.as_ref());
        shadow_factor(
            world,
            &frame.light_space,
            normal,
            frame.light_direction,
            map,
            frame.bias,
        )
    }

    pub fn state(&self) -> SceneState {
        match self.model {
            ModelSlot::Loading(_) => SceneState::Loading,
            _ => SceneState::Ready,
        }
    }

    /// Install a callback invoked for every asset load failure.
    pub fn set_error_callback(&mut self, callback: impl FnMut(&AssetError) + 'static) {
        self.on_error = Some(Box::new(callback));
    }

    /// Most recent asset load failure.
    pub fn last_error(&self) -> Option<&AssetError> {
        self.last_error.as_ref()
    }

    pub fn uniforms(&self) -> &ShadingUniforms {
        &self.uniforms
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn light(&self) -> &DirectionalLight {
        &self.light
    }

    /// Light setters bump its revision; the transform is rebuilt on the next update.
    pub fn light_mut(&mut self) -> &mut DirectionalLight {
        &mut self.light
    }

    /// Light and overlay together, for controls editing both.
    pub fn controls_mut(&mut self) -> (&mut DirectionalLight, &mut OverlayConfig) {
        (&mut self.light, &mut self.uniforms.overlay)
    }

    pub fn overlay(&self) -> &OverlayConfig {
        &self.uniforms.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut OverlayConfig {
        &mut self.uniforms.overlay
    }

    pub fn floor(&self) -> &SceneObject {
        &self.floor
    }

    /// Base surface under the overlay.
    pub fn floor_material(&self) -> &MaterialParams {
        &self.floor_material
    }

    pub fn subject(&self) -> &SceneObject {
        &self.subject
    }

    pub fn subject_material(&self) -> &MaterialParams {
        &self.subject_material
    }

    pub fn set_subject_material(&mut self, material: MaterialParams) {
        self.subject_material = material;
    }

    pub fn model(&self) -> &ModelSlot {
        &self.model
    }

    /// The loaded model, once ready.
    pub fn animated_model(&self) -> Option<&AnimatedModel> {
        match &self.model {
            ModelSlot::Ready(model) => Some(&**model),
            _ => None,
        }
    }

    pub fn animated_model_mut(&mut self) -> Option<&mut AnimatedModel> {
        match &mut self.model {
            ModelSlot::Ready(model) => Some(&mut **model),
            _ => None,
        }
    }

    pub fn model_transform(&self) -> Mat4 {
        self.model_transform
    }

    pub fn set_model_transform(&mut self, transform: Mat4) {
        self.model_transform = transform;
    }

    pub fn model_material(&self) -> &MaterialParams {
        &self.model_material
    }

    fn refresh_camera(&mut self) {
        self.uniforms.frame.set_viewer(&self.camera);
    }

    fn refresh_light(&mut self) {
        if self.light_revision == Some(self.light.revision()) {
            return;
        }
        self.light_revision = Some(self.light.revision());
        self.uniforms.frame.set_light(&self.light);
        self.uniforms.frame.light_space = LightSpaceTransform::from_light(&self.light);
    }

    fn poll_model(&mut self) {
        let ModelSlot::Loading(pending) = &mut self.model else {
            return;
        };
        match pending.poll() {
            None => {}
            Some(Ok(model)) => {
                tracing::info!("model '{}' ready", pending.path().display());
                self.model = ModelSlot::Ready(Box::new(model));
            }
            Some(Err(err)) => {
                tracing::error!("failed to load model: {}", err);
                if let Some(callback) = self.on_error.as_mut() {
                    callback(&err);
                }
                self.last_error = Some(err);
                self.model = ModelSlot::Absent;
            }
        }
    }

    #[cfg(test)]
    fn set_pending_model(&mut self, pending: PendingModel) {
        self.model = ModelSlot::Loading(pending);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Joint, JointPose, Skeleton};
    use crate::core::vertex::SkinnedVertex;
    use crate::renderer::shadow::DepthEncoding;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::mpsc;

    fn scene() -> Scene {
        Scene::new(SceneConfig::default(), Viewport::new(800, 600))
    }

    fn static_model() -> AnimatedModel {
        let skeleton = Skeleton::new(vec![Joint {
            name: "root".into(),
            parent: None,
            rest_pose: JointPose::default(),
            inverse_bind: Mat4::IDENTITY,
        }])
        .unwrap();
        let vertex = SkinnedVertex {
            position: [0.0, 0.0, 0.0],
            normal: [0.0, 1.0, 0.0],
            joints: [0; 4],
            weights: [1.0, 0.0, 0.0, 0.0],
        };
        AnimatedModel::new(skeleton, vec![vertex; 3], vec![0, 1, 2], Vec::new()).unwrap()
    }

    #[test]
    fn test_resize_updates_camera_only() {
        let mut scene = scene();
        assert!((scene.camera().aspect() - 800.0 / 600.0).abs() < 1e-6);
        let light_space = scene.uniforms().frame.light_space;

        scene.resize(1920, 1080);
        assert!((scene.camera().aspect() - 1920.0 / 1080.0).abs() < 1e-6);
        assert_eq!(scene.uniforms().frame.viewport, (1920, 1080));
        assert_eq!(scene.uniforms().frame.light_space, light_space);
        assert_eq!(scene.light().frustum(), ShadowFrustum::symmetric(6.0, 0.5, 20.0));
    }

    #[test]
    fn test_shadow_handle_waits_for_capture() {
        let mut scene = scene();
        scene.update(0.016, 0.016);
        assert!(scene.uniforms().frame.shadow_map.is_none());

        let handle = scene.capture_shadow_map();
        assert!(scene.uniforms().frame.shadow_map.is_none());

        scene.update(0.016, 0.032);
        assert_eq!(scene.uniforms().frame.shadow_map, Some(handle));
    }

    #[test]
    fn test_light_without_shadow_clears_handle() {
        let mut scene = scene();
        scene.capture_shadow_map();
        scene.light_mut().set_casts_shadow(false);
        scene.update(0.016, 0.016);
        assert!(scene.uniforms().frame.shadow_map.is_none());
        assert_eq!(scene.shadow_factor_at(Vec3::ZERO, Vec3::Y), 1.0);
    }

    #[test]
    fn test_moving_light_refreshes_transform() {
        let mut scene = scene();
        let before = scene.uniforms().frame.light_space;
        scene.light_mut().set_position(Vec3::new(-3.0, 8.0, 2.0));
        assert_eq!(scene.uniforms().frame.light_space, before);

        scene.update(0.016, 0.016);
        assert_ne!(scene.uniforms().frame.light_space, before);
        assert!((scene.uniforms().frame.light_direction - scene.light().direction()).length() < 1e-6);
    }

    #[test]
    fn test_elapsed_and_spin() {
        let mut scene = scene();
        scene.update(1.0, 2.5);
        assert_eq!(scene.uniforms().frame.elapsed, 2.5);
        let (_, rotation, translation) = scene.subject().transform.to_scale_rotation_translation();
        assert!((translation - SUBJECT_CENTER).length() < 1e-6);
        assert!((rotation.to_axis_angle().1 - SUBJECT_SPIN).abs() < 1e-5);
    }

    #[test]
    fn test_loading_then_ready() {
        let mut scene = scene();
        let (tx, rx) = mpsc::channel();
        scene.set_pending_model(PendingModel::from_receiver("model.glb".into(), rx));

        scene.update(0.016, 0.016);
        assert_eq!(scene.state(), SceneState::Loading);
        assert!(scene.animated_model().is_none());

        tx.send(Ok(static_model())).unwrap();
        scene.update(0.016, 0.032);
        assert_eq!(scene.state(), SceneState::Ready);
        assert!(scene.animated_model().is_some());
        assert!(scene.last_error().is_none());
    }

    #[test]
    fn test_failed_load_reports_and_continues() {
        let mut scene = scene();
        let reported = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reported);
        scene.set_error_callback(move |err| sink.borrow_mut().push(err.to_string()));

        let (tx, rx) = mpsc::channel();
        scene.set_pending_model(PendingModel::from_receiver("model.glb".into(), rx));
        tx.send(Err(AssetError::NotFound("model.glb".into()))).unwrap();
        scene.update(0.016, 0.016);

        assert_eq!(scene.state(), SceneState::Ready);
        assert!(scene.animated_model().is_none());
        assert!(matches!(scene.last_error(), Some(AssetError::NotFound(_))));
        assert_eq!(reported.borrow().len(), 1);

        // the rest of the scene keeps working
        scene.capture_shadow_map();
        scene.update(0.016, 0.032);
        assert!(scene.uniforms().frame.shadow_map.is_some());
    }

    #[test]
    fn test_sphere_shadow_on_floor() {
        let mut scene = scene();
        scene.update(0.0, 0.0);
        scene.capture_shadow_map();
        scene.update(0.0, 0.0);

        for p in [Vec3::ZERO, Vec3::new(-0.3, 0.0, -0.2)] {
            assert_eq!(scene.shadow_factor_at(p, Vec3::Y), 0.0, "{p} should be shadowed");
        }
        assert_eq!(scene.shadow_factor_at(Vec3::new(5.0, 0.0, 0.0), Vec3::Y), 1.0);
    }

    #[test]
    fn test_sphere_shadow_on_floor_packed() {
        let shadow = ShadowConfig::default().with_encoding(DepthEncoding::PackedRgba8);
        let config = SceneConfig::default().with_shadow(shadow);
        let mut scene = Scene::new(config, Viewport::new(800, 600));
        scene.update(0.0, 0.0);
        let handle = scene.capture_shadow_map();
        assert_eq!(handle.encoding(), DepthEncoding::PackedRgba8);
        scene.update(0.0, 0.0);

        for p in [Vec3::ZERO, Vec3::new(-0.3, 0.0, -0.2)] {
            assert_eq!(scene.shadow_factor_at(p, Vec3::Y), 0.0, "{p} should be shadowed");
        }
        assert_eq!(scene.shadow_factor_at(Vec3::new(5.0, 0.0, 0.0), Vec3::Y), 1.0);
    }
}
