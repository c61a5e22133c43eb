//! Skeletal animation
//!
//! Keyframe clips drive a joint hierarchy; the bound mesh is skinned on the
//! CPU into the same vertex layout every other pass consumes.

pub mod clip;
pub mod player;
pub mod skeleton;
mod values;

pub use clip::{AnimationClip, InterpolationMode, KeyframeTrack, Track, TrackData};
pub use player::{AnimatedModel, PlaybackCursor};
pub use skeleton::{skin_vertices, Joint, JointPose, Skeleton};
pub use values::Interpolatable;
