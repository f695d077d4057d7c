use std::fmt;

use crate::error::RouterError;

/// Anything a router can hand back from a lookup. Identity is the node id.
pub trait RoutedNode {
    fn node_id(&self) -> &str;
}

/// A node is an abstraction for a member of the pool, it bundles the id used for hashing
/// with an optional opaque payload (an address, a connection handle, ...) that routing never looks at.
#[derive(Debug, Clone)]
pub struct Node<D = ()> {
    node_id: String,
    data: Option<D>,
}

impl<D> Node<D> {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            data: None,
        }
    }

    pub fn with_data(node_id: impl Into<String>, data: D) -> Self {
        Self {
            node_id: node_id.into(),
            data: Some(data),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }

    pub(crate) fn validate(&self) -> Result<(), RouterError> {
        validate_node_id(&self.node_id)
    }
}

/// Rejects ids that can never name a node in a pool.
pub(crate) fn validate_node_id(node_id: &str) -> Result<(), RouterError> {
    if node_id.is_empty() {
        return Err(RouterError::InvalidArgument(
            "node id cannot be empty".to_string(),
        ));
    }
    Ok(())
}

impl<D> PartialEq for Node<D> {
    fn eq(&self, other: &Self) -> bool {
        self.node_id == other.node_id
    }
}

impl<D> Eq for Node<D> {}

impl<D> RoutedNode for Node<D> {
    fn node_id(&self) -> &str {
        &self.node_id
    }
}

impl<D> fmt::Display for Node<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node_id)
    }
}

/// Node placed on the consistent hashing ring.
///
/// `virtual_node_count` overrides the router-wide replica count for this node
/// when set; `None` defers to the router.
#[derive(Debug, Clone)]
pub struct PhysicalNode<D = ()> {
    node: Node<D>,
    virtual_node_count: Option<u32>,
}

impl PhysicalNode {
    pub fn of(node_id: impl Into<String>) -> Self {
        Self::new(Node::new(node_id))
    }
}

impl<D> PhysicalNode<D> {
    pub fn new(node: Node<D>) -> Self {
        Self {
            node,
            virtual_node_count: None,
        }
    }

    pub fn with_virtual_node_count(node: Node<D>, virtual_node_count: u32) -> Self {
        Self {
            node,
            virtual_node_count: Some(virtual_node_count),
        }
    }

    pub fn node(&self) -> &Node<D> {
        &self.node
    }

    pub fn data(&self) -> Option<&D> {
        self.node.data()
    }

    pub fn virtual_node_count(&self) -> Option<u32> {
        self.virtual_node_count
    }
}

impl<D> PartialEq for PhysicalNode<D> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.virtual_node_count == other.virtual_node_count
    }
}

impl<D> Eq for PhysicalNode<D> {}

impl<D> RoutedNode for PhysicalNode<D> {
    fn node_id(&self) -> &str {
        self.node.node_id()
    }
}

impl<D> fmt::Display for PhysicalNode<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.virtual_node_count {
            Some(count) => write!(f, "{}[x{}]", self.node, count),
            None => write!(f, "{}", self.node),
        }
    }
}

/// Node taking part in rendezvous hashing. Weight only matters to the weighted strategy.
#[derive(Debug, Clone)]
pub struct WeightedNode<D = ()> {
    node: Node<D>,
    weight: u32,
}

impl WeightedNode {
    pub fn of(node_id: impl Into<String>, weight: u32) -> Self {
        Self::new(Node::new(node_id), weight)
    }
}

impl<D> WeightedNode<D> {
    pub fn new(node: Node<D>, weight: u32) -> Self {
        Self { node, weight }
    }

    pub fn node(&self) -> &Node<D> {
        &self.node
    }

    pub fn data(&self) -> Option<&D> {
        self.node.data()
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }
}

impl<D> PartialEq for WeightedNode<D> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.weight == other.weight
    }
}

impl<D> Eq for WeightedNode<D> {}

impl<D> RoutedNode for WeightedNode<D> {
    fn node_id(&self) -> &str {
        self.node.node_id()
    }
}

impl<D> fmt::Display for WeightedNode<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(w={})", self.node, self.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let node: Node = Node::new("cache-1");
        assert_eq!(node.node_id(), "cache-1");
        assert!(node.data().is_none());
    }

    #[test]
    fn test_payload_does_not_affect_equality() {
        let a = Node::with_data("cache-1", "10.0.0.1:6379");
        let b = Node::with_data("cache-1", "10.0.0.2:6379");
        assert_eq!(a, b);
        assert_eq!(a.data(), Some(&"10.0.0.1:6379"));
    }

    #[test]
    fn test_empty_id_fails_validation() {
        let node: Node = Node::new("");
        assert!(matches!(
            node.validate(),
            Err(RouterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_physical_node_equality_includes_replica_count() {
        let plain = PhysicalNode::of("a");
        let overridden = PhysicalNode::with_virtual_node_count(Node::new("a"), 3);
        assert_ne!(plain, overridden);
        assert_eq!(plain, PhysicalNode::of("a"));
        assert_eq!(overridden.virtual_node_count(), Some(3));
    }

    #[test]
    fn test_display() {
        assert_eq!(PhysicalNode::of("a").to_string(), "a");
        assert_eq!(
            PhysicalNode::with_virtual_node_count(Node::<()>::new("a"), 4).to_string(),
            "a[x4]"
        );
        assert_eq!(WeightedNode::of("b", 5).to_string(), "b(w=5)");
    }
}
