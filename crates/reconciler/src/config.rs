use markup::TreeBuilderConfig;

#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// How deep components may nest. Mounting and prop-driven re-synchronization recurse once
    /// per level, so this also bounds the call stack used by a pass.
    pub max_component_depth: usize,
    pub tree_builder: TreeBuilderConfig,
}

impl SyncConfig {
    pub const DEFAULT_MAX_COMPONENT_DEPTH: usize = 64;
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_component_depth: Self::DEFAULT_MAX_COMPONENT_DEPTH,
            tree_builder: TreeBuilderConfig::default(),
        }
    }
}
