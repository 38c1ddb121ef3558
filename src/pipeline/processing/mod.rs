// Pipeline processing: run once per data load

pub mod normalize;
pub mod validate;
