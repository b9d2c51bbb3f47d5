//! Progression domain: hero, world and inventory model plus the reward resolver.

mod resolver;
mod types;


pub use resolver::ProgressionState;
pub use types::*;
