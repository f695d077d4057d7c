pub mod router_error;

pub use router_error::RouterError;
