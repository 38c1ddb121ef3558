pub mod config;
pub mod console;
pub mod constants;
pub mod domain;
pub mod error;
pub mod observability;
pub mod pipeline;
pub mod schema;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

pub use error::{Result, TabkitError};
