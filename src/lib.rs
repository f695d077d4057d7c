//! Key to node assignment over a dynamic pool.
//!
//! Two schemes share the [`NodeRouter`] contract:
//! - [`ConsistentNodeRouter`]: a consistent hashing ring of virtual node replicas.
//! - [`RendezvousNodeRouter`]: highest random weight hashing, optionally weighted.
//!
//! Routers that hold the same pool and hash function agree on every assignment,
//! and a pool change only moves the keys owned by the nodes that changed.
pub mod cluster;
pub mod error;

pub use crate::cluster::consistent::ConsistentNodeRouter;
pub use crate::cluster::hashing::{HashFunction, XxHash};
pub use crate::cluster::node::{Node, PhysicalNode, RoutedNode, WeightedNode};
pub use crate::cluster::rendezvous::RendezvousNodeRouter;
pub use crate::cluster::router::NodeRouter;
pub use crate::cluster::router_config::RouterConfig;
pub use crate::cluster::strategy::{
    DefaultStrategy, RendezvousStrategy, StrategyKind, WeightedStrategy,
};
pub use crate::error::RouterError;
