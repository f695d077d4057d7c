use std::sync::Arc;

use tracing::{debug, trace};

use crate::cluster::hashing::{HashFunction, XxHash};
use crate::cluster::node::{validate_node_id, PhysicalNode, RoutedNode};
use crate::cluster::ring::HashRing;
use crate::cluster::router::NodeRouter;
use crate::cluster::router_config::RouterConfig;
use crate::cluster::snapshot::SnapshotCell;
use crate::error::RouterError;

/// Consistent hashing router built from virtual node replicas.
///
/// Each physical node owns `virtual_node_count` positions on a 64-bit ring,
/// either its own override or the router-wide default. A key belongs to the
/// node owning the first position at or after `hash(key)`, wrapping around
/// past the highest position.
pub struct ConsistentNodeRouter<D = ()> {
    ring: SnapshotCell<HashRing<PhysicalNode<D>>>,
    virtual_node_count: u32,
    hasher: Box<dyn HashFunction>,
}

impl<D> ConsistentNodeRouter<D> {
    pub fn new(virtual_node_count: u32) -> Self {
        Self::new_with_hasher(virtual_node_count, Box::new(XxHash))
    }

    pub fn new_with_hasher(virtual_node_count: u32, hasher: Box<dyn HashFunction>) -> Self {
        Self {
            ring: SnapshotCell::new(HashRing::new()),
            virtual_node_count,
            hasher,
        }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(config.virtual_node_count)
    }

    /// Builds a router pre-populated with `nodes`.
    pub fn with_nodes<I>(
        nodes: I,
        virtual_node_count: u32,
        hasher: Box<dyn HashFunction>,
    ) -> Result<Self, RouterError>
    where
        I: IntoIterator<Item = PhysicalNode<D>>,
    {
        let router = Self::new_with_hasher(virtual_node_count, hasher);
        router.add_nodes(nodes)?;
        Ok(router)
    }

    /// Router-wide replica count used for nodes without an override.
    pub fn default_virtual_node_count(&self) -> u32 {
        self.virtual_node_count
    }

    pub fn node_count(&self) -> usize {
        self.ring.load().node_count()
    }

    pub fn virtual_node_count(&self) -> usize {
        self.ring.load().virtual_node_count()
    }

    /// Replicas of `node_id` currently on the ring.
    pub fn replica_count(&self, node_id: &str) -> u32 {
        self.ring.load().replica_count(node_id)
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.ring.load().contains_node(node_id)
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.ring.load().node_ids()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.load().is_empty()
    }
}

impl<D> NodeRouter<PhysicalNode<D>> for ConsistentNodeRouter<D> {
    fn get_node(&self, key: &str) -> Option<Arc<PhysicalNode<D>>> {
        let ring = self.ring.load();
        if ring.is_empty() {
            return None;
        }
        ring.locate(self.hasher.hash(key)).cloned()
    }

    fn add_node(&self, node: PhysicalNode<D>) -> Result<(), RouterError> {
        node.node().validate()?;

        let replicas = node.virtual_node_count().unwrap_or(self.virtual_node_count);
        let node = Arc::new(node);
        self.ring.update(|ring| {
            ring.add_replicas(Arc::clone(&node), replicas, &*self.hasher)
        })?;

        debug!(node_id = %node.node_id(), replicas, "added node to ring");
        Ok(())
    }

    fn remove_node(&self, node_id: &str) -> Result<(), RouterError> {
        validate_node_id(node_id)?;

        let removed = self
            .ring
            .update(|ring| Ok::<_, RouterError>(ring.remove_node(node_id)))?;

        if removed == 0 {
            trace!(node_id, "node not on ring, nothing to remove");
        } else {
            debug!(node_id, removed, "removed node from ring");
        }
        Ok(())
    }
}
