//! Keyframe tracks and clips

use super::skeleton::JointPose;
use super::values::Interpolatable;
use crate::error::AnimationError;
use glam::{Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    /// Values hold `[in_tangent, value, out_tangent]` per key.
    CubicSpline,
}

/// Sorted keyframe times and their values.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    times: Vec<f32>,
    values: Vec<T>,
    interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    pub fn new(
        times: Vec<f32>,
        values: Vec<T>,
        interpolation: InterpolationMode,
    ) -> Result<Self, AnimationError> {
        let expected = match interpolation {
            InterpolationMode::CubicSpline => times.len() * 3,
            _ => times.len(),
        };
        if times.is_empty() || values.len() != expected {
            return Err(AnimationError::TrackLength {
                times: times.len(),
                values: values.len(),
            });
        }
        Ok(Self {
            times,
            values,
            interpolation,
        })
    }

    /// Time of the last key.
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Value at `time`, clamped to the first and last keys.
    pub fn sample(&self, time: f32) -> T {
        // first key strictly after `time`
        let next_idx = self.times.partition_point(|&t| t <= time);
        if next_idx == 0 {
            return self.value_at(0);
        }
        let index = next_idx - 1;
        let len = self.times.len();
        if index >= len - 1 {
            return self.value_at(len - 1);
        }

        let t0 = self.times[index];
        let t1 = self.times[index + 1];
        let dt = t1 - t0;
        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };
        let t = t.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.value_at(index),
            InterpolationMode::Linear => {
                T::interpolate_linear(self.value_at(index), self.value_at(index + 1), t)
            }
            InterpolationMode::CubicSpline => {
                let i_prev = index * 3;
                let i_next = (index + 1) * 3;
                T::interpolate_cubic(
                    self.values[i_prev + 1],
                    self.values[i_prev + 2],
                    self.values[i_next],
                    self.values[i_next + 1],
                    t,
                    dt,
                )
            }
        }
    }

    fn value_at(&self, index: usize) -> T {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values[index * 3 + 1],
            _ => self.values[index],
        }
    }
}

/// Joint property animated by a track.
#[derive(Debug, Clone)]
pub enum TrackData {
    Translation(KeyframeTrack<Vec3>),
    Rotation(KeyframeTrack<Quat>),
    Scale(KeyframeTrack<Vec3>),
}

impl TrackData {
    fn end_time(&self) -> f32 {
        match self {
            Self::Translation(track) | Self::Scale(track) => track.end_time(),
            Self::Rotation(track) => track.end_time(),
        }
    }
}

/// One track bound to a joint.
#[derive(Debug, Clone)]
pub struct Track {
    pub joint: usize,
    pub data: TrackData,
}

/// Named set of tracks with a common duration.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Create a clip whose duration is the last key time over all tracks.
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|track| track.data.end_time())
            .fold(0.0, f32::max);
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }

    /// Overwrite the animated properties of `poses` with values at `time`.
    ///
    /// Joints without tracks keep whatever pose they hold.
    pub fn sample_into(&self, time: f32, poses: &mut [JointPose]) {
        for track in &self.tracks {
            let Some(pose) = poses.get_mut(track.joint) else {
                continue;
            };
            match &track.data {
                TrackData::Translation(keys) => pose.translation = keys.sample(time),
                TrackData::Rotation(keys) => pose.rotation = keys.sample(time),
                TrackData::Scale(keys) => pose.scale = keys.sample(time),
            }
        }
    }

    /// Largest joint index referenced by any track.
    pub fn max_joint(&self) -> Option<usize> {
        self.tracks.iter().map(|track| track.joint).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_track_sampling() {
        let track = KeyframeTrack::new(
            vec![0.0, 1.0, 3.0],
            vec![Vec3::ZERO, Vec3::X, Vec3::new(3.0, 0.0, 0.0)],
            InterpolationMode::Linear,
        )
        .unwrap();

        assert_eq!(track.sample(-1.0), Vec3::ZERO);
        assert!((track.sample(0.5) - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
        assert!((track.sample(2.0) - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
        assert_eq!(track.sample(10.0), Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_step_track_holds_value() {
        let track = KeyframeTrack::new(
            vec![0.0, 1.0],
            vec![Vec3::ZERO, Vec3::ONE],
            InterpolationMode::Step,
        )
        .unwrap();
        assert_eq!(track.sample(0.99), Vec3::ZERO);
        assert_eq!(track.sample(1.0), Vec3::ONE);
    }

    #[test]
    fn test_rotation_track_slerps() {
        let end = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let track = KeyframeTrack::new(
            vec![0.0, 1.0],
            vec![Quat::IDENTITY, end],
            InterpolationMode::Linear,
        )
        .unwrap();
        let half = track.sample(0.5);
        let expected = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
        assert!(half.angle_between(expected) < 1e-4);
    }

    #[test]
    fn test_cubic_track_hits_keys() {
        let zero = Vec3::ZERO;
        let track = KeyframeTrack::new(
            vec![0.0, 2.0],
            vec![zero, Vec3::ONE, zero, zero, Vec3::splat(5.0), zero],
            InterpolationMode::CubicSpline,
        )
        .unwrap();
        assert_eq!(track.sample(0.0), Vec3::ONE);
        assert_eq!(track.sample(2.0), Vec3::splat(5.0));
        // flat tangents give the smoothstep midpoint
        assert!((track.sample(1.0) - Vec3::splat(3.0)).length() < 1e-5);
    }

    #[test]
    fn test_track_length_mismatch() {
        let err = KeyframeTrack::new(vec![0.0, 1.0], vec![Vec3::ZERO], InterpolationMode::Linear)
            .unwrap_err();
        assert_eq!(err, AnimationError::TrackLength { times: 2, values: 1 });
    }

    #[test]
    fn test_clip_duration_is_last_key() {
        let short = KeyframeTrack::new(vec![0.0, 0.5], vec![Vec3::ZERO; 2], InterpolationMode::Linear).unwrap();
        let long = KeyframeTrack::new(vec![0.0, 1.25], vec![Quat::IDENTITY; 2], InterpolationMode::Linear).unwrap();
        let clip = AnimationClip::new(
            "walk",
            vec![
                Track {
                    joint: 0,
                    data: TrackData::Translation(short),
                },
                Track {
                    joint: 1,
                    data: TrackData::Rotation(long),
                },
            ],
        );
        assert_eq!(clip.duration, 1.25);
        assert_eq!(clip.max_joint(), Some(1));
    }
}
