//! Storage layer

mod memory;
mod traits;

pub use memory::MemoryResourceStore;
pub use traits::ResourceStore;
