use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RouterError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown rendezvous strategy: {0}")]
    UnknownStrategy(String),
}
