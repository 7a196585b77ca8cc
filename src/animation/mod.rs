//! Keyframe animation
//!
//! - KeyframeTrack: time-ordered keys of one property, with cyclic sampling
//! - AnimationClip / NodeChannel: per-node position, rotation and scale tracks
//! - Binder: resolves channel target names to nodes
//! - AnimationAction: playback state of the selected clip

pub mod action;
pub mod binder;
pub mod binding;
pub mod clip;
pub mod tracks;
pub mod values;

pub use action::{AnimationAction, LoopMode};
pub use binder::Binder;
pub use binding::ChannelBinding;
pub use clip::{AnimationClip, NodeChannel};
pub use tracks::KeyframeTrack;
pub use values::Interpolatable;
