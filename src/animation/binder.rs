use crate::animation::binding::ChannelBinding;
use crate::animation::clip::AnimationClip;
use crate::scene::NodeTree;

pub struct Binder;

impl Binder {
    /// Resolves the clip's channels to nodes of `tree`.
    ///
    /// Channels whose target name is not in the tree are skipped (logged once
    /// here rather than every frame).
    #[must_use]
    pub fn bind(tree: &NodeTree, clip: &AnimationClip) -> Vec<ChannelBinding> {
        let mut bindings = Vec::with_capacity(clip.channels.len());

        for (channel_index, channel) in clip.channels.iter().enumerate() {
            match tree.find(&channel.node_name) {
                Some(node) => bindings.push(ChannelBinding {
                    channel_index,
                    node,
                }),
                None => log::warn!(
                    "Animation '{}': channel #{} targets unknown node '{}', skipping",
                    clip.name,
                    channel_index,
                    channel.node_name
                ),
            }
        }

        bindings
    }
}
