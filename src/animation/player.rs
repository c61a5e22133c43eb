//! Clip playback on a skinned model

use super::clip::AnimationClip;
use super::skeleton::{skin_vertices, JointPose, Skeleton};
use crate::core::vertex::{SkinnedVertex, VertexPN};
use crate::error::AnimationError;
use crate::renderer::geometry::MeshData;
use glam::Mat4;

/// Looping playback position inside a clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackCursor {
    pub time: f32,
    pub speed: f32,
}

impl PlaybackCursor {
    /// Advance by `dt` seconds, wrapping into `[0, duration)`.
    ///
    /// Clips without a positive duration never advance.
    pub fn advance(&mut self, dt: f32, duration: f32) {
        if duration <= 0.0 || !dt.is_finite() {
            return;
        }
        self.time = (self.time + dt * self.speed).rem_euclid(duration);
        // rem_euclid may round up to exactly `duration`
        if self.time >= duration {
            self.time = 0.0;
        }
    }
}

impl Default for PlaybackCursor {
    fn default() -> Self {
        Self {
            time: 0.0,
            speed: 1.0,
        }
    }
}

/// Skinned mesh with its skeleton, clips and current pose.
#[derive(Debug, Clone)]
pub struct AnimatedModel {
    skeleton: Skeleton,
    bind_vertices: Vec<SkinnedVertex>,
    indices: Vec<u32>,
    clips: Vec<AnimationClip>,
    active: Option<usize>,
    cursor: PlaybackCursor,
    poses: Vec<JointPose>,
    matrices: Vec<Mat4>,
    skinned: Vec<VertexPN>,
}

impl AnimatedModel {
    pub fn new(
        skeleton: Skeleton,
        bind_vertices: Vec<SkinnedVertex>,
        indices: Vec<u32>,
        clips: Vec<AnimationClip>,
    ) -> Result<Self, AnimationError> {
        skeleton.validate_influences(&bind_vertices)?;
        let count = skeleton.len();
        for clip in &clips {
            if let Some(joint) = clip.max_joint().filter(|&joint| joint >= count) {
                return Err(AnimationError::JointOutOfRange { joint, count });
            }
        }

        let poses = skeleton.rest_poses();
        let mut model = Self {
            skeleton,
            bind_vertices,
            indices,
            active: if clips.is_empty() { None } else { Some(0) },
            clips,
            cursor: PlaybackCursor::default(),
            poses,
            matrices: Vec::with_capacity(count),
            skinned: Vec::new(),
        };
        model.pose();
        Ok(model)
    }

    /// Advance the active clip and re-skin the mesh.
    pub fn advance(&mut self, dt: f32) {
        let Some(clip) = self.active.and_then(|index| self.clips.get(index)) else {
            return;
        };
        self.cursor.advance(dt, clip.duration);
        self.pose();
    }

    /// Switch to the clip called `name`, restarting playback.
    pub fn select_clip(&mut self, name: &str) -> bool {
        match self.clips.iter().position(|clip| clip.name == name) {
            Some(index) => self.select_clip_index(index),
            None => false,
        }
    }

    pub fn select_clip_index(&mut self, index: usize) -> bool {
        if index >= self.clips.len() {
            return false;
        }
        self.active = Some(index);
        self.cursor.time = 0.0;
        self.poses = self.skeleton.rest_poses();
        self.pose();
        true
    }

    pub fn active_clip(&self) -> Option<&AnimationClip> {
        self.active.and_then(|index| self.clips.get(index))
    }

    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.cursor.speed = speed;
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn poses(&self) -> &[JointPose] {
        &self.poses
    }

    /// Vertices deformed by the current pose.
    pub fn skinned_vertices(&self) -> &[VertexPN] {
        &self.skinned
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Current pose as plain mesh data.
    pub fn mesh_data(&self) -> MeshData {
        MeshData::new(self.skinned.clone(), self.indices.clone())
    }

    fn pose(&mut self) {
        if let Some(clip) = self.active.and_then(|index| self.clips.get(index)) {
            clip.sample_into(self.cursor.time, &mut self.poses);
        }
        self.skeleton
            .skinning_matrices(&self.poses, &mut self.matrices);
        skin_vertices(&self.bind_vertices, &self.matrices, &mut self.skinned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::clip::{InterpolationMode, KeyframeTrack, Track, TrackData};
    use crate::animation::skeleton::Joint;
    use glam::Vec3;

    fn slide_clip(name: &str, duration: f32) -> AnimationClip {
        let keys = KeyframeTrack::new(
            vec![0.0, duration],
            vec![Vec3::ZERO, Vec3::new(duration, 0.0, 0.0)],
            InterpolationMode::Linear,
        )
        .unwrap();
        AnimationClip::new(
            name,
            vec![Track {
                joint: 0,
                data: TrackData::Translation(keys),
            }],
        )
    }

    fn model(clips: Vec<AnimationClip>) -> AnimatedModel {
        let skeleton = Skeleton::new(vec![Joint {
            name: "root".into(),
            parent: None,
            rest_pose: JointPose::default(),
            inverse_bind: Mat4::IDENTITY,
        }])
        .unwrap();
        let vertex = SkinnedVertex {
            position: [0.0, 1.0, 0.0],
            normal: [0.0, 1.0, 0.0],
            joints: [0; 4],
            weights: [1.0, 0.0, 0.0, 0.0],
        };
        AnimatedModel::new(skeleton, vec![vertex; 3], vec![0, 1, 2], clips).unwrap()
    }

    #[test]
    fn test_cursor_full_duration_returns_to_start() {
        let duration = 1.25;
        let mut cursor = PlaybackCursor {
            time: 0.3,
            speed: 1.0,
        };
        cursor.advance(duration, duration);
        assert!((cursor.time - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_cursor_long_delta_wraps() {
        let duration = 2.0;
        let mut long = PlaybackCursor::default();
        let mut short = PlaybackCursor::default();
        long.advance(7.5, duration);
        short.advance(7.5 % duration, duration);
        assert!((long.time - short.time).abs() < 1e-5);
        assert!((long.time - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_cursor_reverse_speed_wraps_positive() {
        let mut cursor = PlaybackCursor {
            time: 0.25,
            speed: -1.0,
        };
        cursor.advance(0.5, 1.0);
        assert!((cursor.time - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_zero_duration_never_advances() {
        let mut cursor = PlaybackCursor::default();
        cursor.advance(1.0, 0.0);
        assert_eq!(cursor.time, 0.0);
    }

    #[test]
    fn test_model_advance_skins_vertices() {
        let mut model = model(vec![slide_clip("slide", 2.0)]);
        assert_eq!(model.skinned_vertices()[0].position, [0.0, 1.0, 0.0]);

        model.advance(0.5);
        let position = Vec3::from(model.skinned_vertices()[0].position);
        assert!((position - Vec3::new(0.5, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_full_loop_restores_pose() {
        let mut model = model(vec![slide_clip("slide", 2.0)]);
        model.advance(0.4);
        let before = model.skinned_vertices().to_vec();
        model.advance(2.0);
        let after = model.skinned_vertices();
        for (a, b) in before.iter().zip(after) {
            assert!((Vec3::from(a.position) - Vec3::from(b.position)).length() < 1e-4);
        }
    }

    #[test]
    fn test_select_clip_by_name() {
        let mut model = model(vec![slide_clip("a", 1.0), slide_clip("b", 3.0)]);
        assert_eq!(model.active_clip().map(|clip| clip.name.as_str()), Some("a"));
        model.advance(0.5);

        assert!(model.select_clip("b"));
        assert_eq!(model.active_clip().map(|clip| clip.duration), Some(3.0));
        assert_eq!(model.cursor().time, 0.0);
        assert!(!model.select_clip("missing"));
    }

    #[test]
    fn test_clip_joint_out_of_range() {
        let skeleton = Skeleton::new(Vec::new()).unwrap();
        let err = AnimatedModel::new(skeleton, Vec::new(), Vec::new(), vec![slide_clip("a", 1.0)])
            .unwrap_err();
        assert_eq!(err, AnimationError::JointOutOfRange { joint: 0, count: 0 });
    }

    #[test]
    fn test_model_without_clips_is_static() {
        let mut model = model(Vec::new());
        model.advance(1.0);
        assert!(model.active_clip().is_none());
        assert_eq!(model.skinned_vertices().len(), 3);
    }
}
