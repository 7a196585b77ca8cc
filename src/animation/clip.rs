use glam::{Quat, Vec3};

use crate::animation::tracks::KeyframeTrack;
use crate::scene::LocalPose;

/// Keyframes driving one node.
///
/// The three tracks are independent: they may have different key counts and
/// key times. A track without keys leaves that component at its identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeChannel {
    pub node_name: String,
    pub positions: KeyframeTrack<Vec3>,
    pub rotations: KeyframeTrack<Quat>,
    pub scales: KeyframeTrack<Vec3>,
}

impl NodeChannel {
    #[must_use]
    pub fn new(node_name: &str) -> Self {
        Self {
            node_name: node_name.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_positions(mut self, track: KeyframeTrack<Vec3>) -> Self {
        self.positions = track;
        self
    }

    #[must_use]
    pub fn with_rotations(mut self, track: KeyframeTrack<Quat>) -> Self {
        self.rotations = track;
        self
    }

    #[must_use]
    pub fn with_scales(mut self, track: KeyframeTrack<Vec3>) -> Self {
        self.scales = track;
        self
    }

    /// Latest key time over all three tracks.
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.positions
            .end_time()
            .max(self.rotations.end_time())
            .max(self.scales.end_time())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    /// Length in ticks.
    pub duration: f64,
    ticks_per_second: f64,
    pub channels: Vec<NodeChannel>,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: &str, duration: f64, ticks_per_second: f64, channels: Vec<NodeChannel>) -> Self {
        Self {
            name: name.to_string(),
            duration,
            ticks_per_second,
            channels,
        }
    }

    /// Builds a clip whose duration is the latest key time of any channel.
    #[must_use]
    pub fn from_channels(name: &str, ticks_per_second: f64, channels: Vec<NodeChannel>) -> Self {
        let duration = channels
            .iter()
            .map(NodeChannel::end_time)
            .fold(0.0_f64, f64::max);
        Self::new(name, duration, ticks_per_second, channels)
    }

    /// Ticks per second, 1.0 when the source declared none.
    #[must_use]
    pub fn ticks_per_second(&self) -> f64 {
        if self.ticks_per_second > 0.0 && self.ticks_per_second.is_finite() {
            self.ticks_per_second
        } else {
            1.0
        }
    }

    #[inline]
    #[must_use]
    pub fn seconds_to_ticks(&self, seconds: f64) -> f64 {
        seconds * self.ticks_per_second()
    }

    #[inline]
    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        self.duration / self.ticks_per_second()
    }

    /// Interpolated local pose of `channel` at `ticks`, wrapping past the
    /// last key.
    #[must_use]
    pub fn sample_channel(&self, channel: &NodeChannel, ticks: f64) -> LocalPose {
        self.sample_channel_with(channel, ticks, true)
    }

    /// Interpolated local pose of `channel` at `ticks`. With `wrap == false`
    /// each track holds its last key once `ticks` passes it.
    #[must_use]
    pub fn sample_channel_with(&self, channel: &NodeChannel, ticks: f64, wrap: bool) -> LocalPose {
        LocalPose {
            position: channel
                .positions
                .sample_with(ticks, self.duration, wrap)
                .unwrap_or(Vec3::ZERO),
            rotation: channel
                .rotations
                .sample_with(ticks, self.duration, wrap)
                .unwrap_or(Quat::IDENTITY),
            scale: channel
                .scales
                .sample_with(ticks, self.duration, wrap)
                .unwrap_or(Vec3::ONE),
        }
    }
}
