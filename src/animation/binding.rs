use crate::scene::NodeHandle;

/// Maps channel `channel_index` of a clip to the node it drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelBinding {
    pub channel_index: usize,
    pub node: NodeHandle,
}
