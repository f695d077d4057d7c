pub mod consistent;
pub mod hashing;
pub mod node;
pub mod rendezvous;
mod ring;
pub mod router;
pub mod router_config;
mod snapshot;
pub mod strategy;
