// Data pipeline: processing (normalize, validate), query (filter, sort), export

pub mod debounce;
pub mod export;
pub mod processing;
pub mod query;
pub mod session;

// Re-export the pieces most callers need
pub use processing::normalize::{DefaultNormalizer, Normalizer};
pub use processing::validate::Validator;
pub use session::Session;
