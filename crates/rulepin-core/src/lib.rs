pub mod client;
pub mod config;
pub mod error;
pub mod health;
pub mod reconcile;
pub mod scheduler;

pub use error::{ErrorKind, Result, RulepinError};
