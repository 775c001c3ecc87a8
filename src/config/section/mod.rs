//! Configuration sections of `modserve.toml`.

mod serve;
mod transform;

pub use serve::ServeSection;
pub use transform::TransformSection;
