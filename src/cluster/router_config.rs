use crate::cluster::strategy::StrategyKind;

/// Construction-time settings shared by both routers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouterConfig {
    /// Replicas per node on the consistent ring, unless a node overrides it.
    pub virtual_node_count: u32,
    /// Scoring used by the rendezvous router.
    pub strategy: StrategyKind,
}

impl RouterConfig {
    pub fn new(virtual_node_count: u32, strategy: StrategyKind) -> Self {
        Self {
            virtual_node_count,
            strategy,
        }
    }

    pub fn new_default() -> Self {
        Self {
            virtual_node_count: 50,
            strategy: StrategyKind::Default,
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new_default()
    }
}
