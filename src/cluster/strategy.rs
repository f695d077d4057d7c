//! Scoring functions for rendezvous (highest random weight) hashing.
//!
//! A score depends only on the node and the key, never on the rest of the pool.
//! That is what limits the keys moved by a pool change to the ones the changed
//! node won or now wins.

use std::fmt;
use std::str::FromStr;

use crate::cluster::hashing::HashFunction;
use crate::cluster::node::WeightedNode;
use crate::error::RouterError;

const MANTISSA_BITS: u32 = 53;
const MANTISSA_MASK: u64 = (1 << MANTISSA_BITS) - 1;
const MANTISSA_SCALE: f64 = (1u64 << MANTISSA_BITS) as f64;

pub trait RendezvousStrategy: Send + Sync {
    /// Score of `node` for `key`. The highest score wins the key.
    fn score<D>(&self, node: &WeightedNode<D>, key: &str, hasher: &dyn HashFunction) -> f64;
}

fn combined_hash<D>(node: &WeightedNode<D>, key: &str, hasher: &dyn HashFunction) -> u64 {
    hasher.hash(&format!("{}:{}", node.node().node_id(), key))
}

/// Unweighted HRW: every node is equally likely to win a random key.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStrategy;

impl RendezvousStrategy for DefaultStrategy {
    fn score<D>(&self, node: &WeightedNode<D>, key: &str, hasher: &dyn HashFunction) -> f64 {
        // compared as a signed value
        combined_hash(node, key, hasher) as i64 as f64
    }
}

/// Weighted HRW: a node wins with probability `weight / total weight`.
///
/// The low 53 bits of the hash become `u` in [0, 1) and the score is
/// `weight / -ln(u)`, i.e. the weight divided by an Exponential(1) draw.
/// A zero weight scores 0 and only wins when nothing else is in the pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedStrategy;

impl WeightedStrategy {
    fn to_unit_interval(hash: u64) -> f64 {
        (hash & MANTISSA_MASK) as f64 / MANTISSA_SCALE
    }
}

impl RendezvousStrategy for WeightedStrategy {
    fn score<D>(&self, node: &WeightedNode<D>, key: &str, hasher: &dyn HashFunction) -> f64 {
        let u = Self::to_unit_interval(combined_hash(node, key, hasher));
        // u == 0 gives -ln(u) == inf, hence a score of 0
        f64::from(node.weight()) / -u.ln()
    }
}

/// Closed set of strategies, selectable at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StrategyKind {
    #[default]
    Default,
    Weighted,
}

impl RendezvousStrategy for StrategyKind {
    fn score<D>(&self, node: &WeightedNode<D>, key: &str, hasher: &dyn HashFunction) -> f64 {
        match self {
            StrategyKind::Default => DefaultStrategy.score(node, key, hasher),
            StrategyKind::Weighted => WeightedStrategy.score(node, key, hasher),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(StrategyKind::Default),
            "weighted" => Ok(StrategyKind::Weighted),
            other => Err(RouterError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Default => write!(f, "default"),
            StrategyKind::Weighted => write!(f, "weighted"),
        }
    }
}
