mod memory;

pub use memory::{MemoryDirectory, MemorySettingsStore};
