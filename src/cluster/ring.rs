///Contains the implementation for assigning hashed keys to nodes placed on a circular key space.
use std::sync::Arc;

use im::{HashMap, OrdMap, OrdSet};
use tracing::warn;

use crate::cluster::hashing::HashFunction;
use crate::cluster::node::RoutedNode;
use crate::error::RouterError;

/// One of the ring positions held by a physical node. Its position is `hash(derived_id)`.
pub(crate) struct VirtualNode<N> {
    owner: Arc<N>,
    replica_index: u32,
    derived_id: String,
}

impl<N: RoutedNode> VirtualNode<N> {
    fn new(owner: Arc<N>, replica_index: u32) -> Self {
        let derived_id = format!("{}-{}", owner.node_id(), replica_index);
        Self {
            owner,
            replica_index,
            derived_id,
        }
    }

    fn is_virtual_node_of(&self, node_id: &str) -> bool {
        self.owner.node_id() == node_id
    }
}

impl<N> Clone for VirtualNode<N> {
    fn clone(&self) -> Self {
        Self {
            owner: Arc::clone(&self.owner),
            replica_index: self.replica_index,
            derived_id: self.derived_id.clone(),
        }
    }
}

/// Ordered ring of virtual nodes.
///
/// Both maps are persistent, so cloning a ring is O(1) and a clone can be
/// mutated without disturbing readers of the original.
pub(crate) struct HashRing<N> {
    //ring position -> virtual node, ordered for ceiling lookups
    ring: OrdMap<u64, VirtualNode<N>>,
    //physical node id -> positions it currently holds
    replicas: HashMap<String, OrdSet<u64>>,
}

impl<N> Clone for HashRing<N> {
    fn clone(&self) -> Self {
        Self {
            ring: self.ring.clone(),
            replicas: self.replicas.clone(),
        }
    }
}

impl<N> Default for HashRing<N> {
    fn default() -> Self {
        Self {
            ring: OrdMap::new(),
            replicas: HashMap::new(),
        }
    }
}

impl<N: RoutedNode> HashRing<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the owner of the first virtual node at or after `hash`,
    /// wrapping to the lowest position when `hash` is past the last one.
    pub fn locate(&self, hash: u64) -> Option<&Arc<N>> {
        self.ring
            .range(hash..)
            .next()
            .or_else(|| self.ring.iter().next())
            .map(|(_, virtual_node)| &virtual_node.owner)
    }

    /// Places `count` replicas of `owner` on the ring.
    ///
    /// Replica indices continue from the number of replicas the node currently holds,
    /// so re-adding a partially present node never reuses an index still on the ring.
    pub fn add_replicas(
        &mut self,
        owner: Arc<N>,
        count: u32,
        hasher: &dyn HashFunction,
    ) -> Result<(), RouterError> {
        let base = self.replica_count(owner.node_id());
        let end = base.checked_add(count).ok_or_else(|| {
            RouterError::InvalidArgument(format!(
                "replica index overflow for node {}: {} existing + {} new",
                owner.node_id(),
                base,
                count
            ))
        })?;

        for replica_index in base..end {
            let virtual_node = VirtualNode::new(Arc::clone(&owner), replica_index);
            let position = hasher.hash(&virtual_node.derived_id);
            self.insert(position, virtual_node);
        }
        Ok(())
    }

    /// Later insertions win a position collision; the loser drops out of its owner's index.
    fn insert(&mut self, position: u64, virtual_node: VirtualNode<N>) {
        let owner_id = virtual_node.owner.node_id().to_string();

        if let Some(previous) = self.ring.insert(position, virtual_node) {
            if !previous.is_virtual_node_of(&owner_id) {
                warn!(
                    position,
                    replaced = %previous.derived_id,
                    replaced_replica = previous.replica_index,
                    by = %owner_id,
                    "virtual node position collision"
                );
                self.forget_position(previous.owner.node_id(), position);
            }
        }

        match self.replicas.get_mut(owner_id.as_str()) {
            Some(positions) => {
                positions.insert(position);
            }
            None => {
                self.replicas.insert(owner_id, OrdSet::unit(position));
            }
        }
    }

    fn forget_position(&mut self, node_id: &str, position: u64) {
        let now_empty = match self.replicas.get_mut(node_id) {
            Some(positions) => {
                positions.remove(&position);
                positions.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.replicas.remove(node_id);
        }
    }

    /// Removes every virtual node owned by `node_id`, returning how many were dropped.
    pub fn remove_node(&mut self, node_id: &str) -> usize {
        match self.replicas.remove(node_id) {
            Some(positions) => {
                for position in positions.iter() {
                    self.ring.remove(position);
                }
                positions.len()
            }
            None => 0,
        }
    }

    pub fn replica_count(&self, node_id: &str) -> u32 {
        self.replicas
            .get(node_id)
            .map_or(0, |positions| positions.len() as u32)
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.replicas.contains_key(node_id)
    }

    pub fn node_count(&self) -> usize {
        self.replicas.len()
    }

    pub fn virtual_node_count(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Ids of every physical node on the ring, sorted.
    pub fn node_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.replicas.keys().cloned().collect();
        ids.sort();
        ids
    }
}
