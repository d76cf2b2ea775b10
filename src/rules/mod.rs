pub mod builtin;
pub mod engine;
pub mod types;

pub use engine::PatternEngine;
pub use types::*;
