use std::sync::Arc;

use crate::cluster::node::RoutedNode;
use crate::error::RouterError;

/// Contract shared by every key -> node assignment scheme.
///
/// Lookups are pure with respect to the pool and never block on mutation. Each
/// `add_node`/`remove_node` call is atomic for readers; sequences of calls are not.
pub trait NodeRouter<N: RoutedNode> {
    /// Returns the node assigned to `key`, or `None` iff the pool is empty.
    fn get_node(&self, key: &str) -> Option<Arc<N>>;

    fn add_node(&self, node: N) -> Result<(), RouterError>;

    /// Adds nodes in order, stopping at the first invalid one.
    /// Nodes added before the failure stay in the pool.
    fn add_nodes<I>(&self, nodes: I) -> Result<(), RouterError>
    where
        I: IntoIterator<Item = N>,
        Self: Sized,
    {
        nodes.into_iter().try_for_each(|node| self.add_node(node))
    }

    /// Removing an id that is not in the pool is a no-op.
    fn remove_node(&self, node_id: &str) -> Result<(), RouterError>;

    /// Removes ids in order, stopping at the first invalid one.
    fn remove_nodes<I, S>(&self, node_ids: I) -> Result<(), RouterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        Self: Sized,
    {
        node_ids
            .into_iter()
            .try_for_each(|node_id| self.remove_node(node_id.as_ref()))
    }
}
