use std::sync::Arc;

use im::OrdMap;
use tracing::{debug, trace};

use crate::cluster::hashing::{HashFunction, XxHash};
use crate::cluster::node::{validate_node_id, RoutedNode, WeightedNode};
use crate::cluster::router::NodeRouter;
use crate::cluster::router_config::RouterConfig;
use crate::cluster::snapshot::SnapshotCell;
use crate::cluster::strategy::{RendezvousStrategy, StrategyKind};
use crate::error::RouterError;

/// Rendezvous (highest random weight) router.
///
/// Every node scores the key independently and the highest score wins, so
/// processes that agree on the pool agree on every assignment without sharing
/// any ring structure. Lookups scan the whole pool.
///
/// The pool is ordered by node id and the scan keeps the first maximum it sees,
/// so equal scores resolve to the lexicographically smallest id.
pub struct RendezvousNodeRouter<D = (), S = StrategyKind> {
    pool: SnapshotCell<OrdMap<String, Arc<WeightedNode<D>>>>,
    hasher: Box<dyn HashFunction>,
    strategy: S,
}

impl<D, S: RendezvousStrategy> RendezvousNodeRouter<D, S> {
    pub fn new(strategy: S) -> Self {
        Self::new_with_hasher(Box::new(XxHash), strategy)
    }

    pub fn new_with_hasher(hasher: Box<dyn HashFunction>, strategy: S) -> Self {
        Self {
            pool: SnapshotCell::new(OrdMap::new()),
            hasher,
            strategy,
        }
    }

    /// Builds a router pre-populated with `nodes`.
    pub fn with_nodes<I>(
        nodes: I,
        hasher: Box<dyn HashFunction>,
        strategy: S,
    ) -> Result<Self, RouterError>
    where
        I: IntoIterator<Item = WeightedNode<D>>,
    {
        let router = Self::new_with_hasher(hasher, strategy);
        router.add_nodes(nodes)?;
        Ok(router)
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn node_count(&self) -> usize {
        self.pool.load().len()
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.pool.load().contains_key(node_id)
    }

    /// Ids of every node in the pool, sorted.
    pub fn node_ids(&self) -> Vec<String> {
        self.pool.load().keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.load().is_empty()
    }
}

impl<D> RendezvousNodeRouter<D, StrategyKind> {
    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(config.strategy)
    }
}

impl<D, S: RendezvousStrategy> NodeRouter<WeightedNode<D>> for RendezvousNodeRouter<D, S> {
    fn get_node(&self, key: &str) -> Option<Arc<WeightedNode<D>>> {
        let pool = self.pool.load();

        let mut champion: Option<(&Arc<WeightedNode<D>>, f64)> = None;
        for (_, node) in pool.iter() {
            let score = self.strategy.score(&**node, key, &*self.hasher);
            match champion {
                Some((_, highest)) if score <= highest => {}
                _ => champion = Some((node, score)),
            }
        }

        champion.map(|(node, _)| Arc::clone(node))
    }

    /// Identity is the node id, so adding an id that is already present replaces it.
    fn add_node(&self, node: WeightedNode<D>) -> Result<(), RouterError> {
        node.node().validate()?;

        let node_id = node.node_id().to_string();
        let weight = node.weight();
        let replaced = self.pool.update(|pool| {
            Ok::<_, RouterError>(pool.insert(node_id.clone(), Arc::new(node)).is_some())
        })?;

        debug!(node_id = %node_id, weight, replaced, "added node to rendezvous pool");
        Ok(())
    }

    fn remove_node(&self, node_id: &str) -> Result<(), RouterError> {
        validate_node_id(node_id)?;

        let removed = self
            .pool
            .update(|pool| Ok::<_, RouterError>(pool.remove(node_id).is_some()))?;

        if removed {
            debug!(node_id, "removed node from rendezvous pool");
        } else {
            trace!(node_id, "node not in rendezvous pool, nothing to remove");
        }
        Ok(())
    }
}
