use serde::{Deserialize, Serialize};

use crate::animation::binder::Binder;
use crate::animation::binding::ChannelBinding;
use crate::animation::clip::AnimationClip;
use crate::scene::NodeTree;

/// How playback time maps into the clip's tick range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopMode {
    /// Clamp to `[0, duration]` and hold the final pose.
    Once,
    /// Wrap around `duration`.
    #[default]
    Loop,
    /// Play forward then backward.
    PingPong,
}

impl LoopMode {
    /// Maps `ticks` into `[0, duration]`. Clips with no length pass time through.
    #[must_use]
    pub fn apply(self, ticks: f64, duration: f64) -> f64 {
        if duration <= 0.0 || !ticks.is_finite() {
            return ticks;
        }

        match self {
            LoopMode::Once => ticks.clamp(0.0, duration),
            LoopMode::Loop => ticks.rem_euclid(duration),
            LoopMode::PingPong => {
                let double_duration = duration * 2.0;
                let t = ticks.rem_euclid(double_duration);
                // Second half of the cycle runs backward
                if t > duration { double_duration - t } else { t }
            }
        }
    }

    /// Whether sampling past the last key blends back toward the first key.
    /// Only `Loop` plays through the clip end into its start.
    #[inline]
    #[must_use]
    pub fn wraps(self) -> bool {
        matches!(self, LoopMode::Loop)
    }
}

/// Playback state of the selected clip.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip_index: usize,
    bindings: Vec<ChannelBinding>,

    time: f64,
    ticks: f64,
}

impl AnimationAction {
    /// Binds `clip` (stored at `clip_index` in the model) to `tree`.
    #[must_use]
    pub fn new(clip_index: usize, clip: &AnimationClip, tree: &NodeTree) -> Self {
        Self {
            clip_index,
            bindings: Binder::bind(tree, clip),
            time: 0.0,
            ticks: 0.0,
        }
    }

    #[inline]
    #[must_use]
    pub fn clip_index(&self) -> usize {
        self.clip_index
    }

    #[inline]
    #[must_use]
    pub fn bindings(&self) -> &[ChannelBinding] {
        &self.bindings
    }

    /// Last applied time, in seconds.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Last applied time, in clip ticks after looping.
    #[inline]
    #[must_use]
    pub fn ticks(&self) -> f64 {
        self.ticks
    }

    /// Samples every bound channel at `time_seconds` and writes the local
    /// poses into `tree`, dirtying the driven subtrees.
    pub fn apply(
        &mut self,
        clip: &AnimationClip,
        tree: &mut NodeTree,
        time_seconds: f64,
        loop_mode: LoopMode,
    ) {
        self.time = time_seconds;
        self.ticks = loop_mode.apply(clip.seconds_to_ticks(time_seconds), clip.duration);
        let wrap = loop_mode.wraps();

        for binding in &self.bindings {
            let Some(channel) = clip.channels.get(binding.channel_index) else {
                continue;
            };
            let pose = clip.sample_channel_with(channel, self.ticks, wrap);
            tree.set_local_pose(binding.node, pose);
        }
    }
}
