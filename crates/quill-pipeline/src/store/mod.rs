//! [`quill_core::DocumentStore`] implementations.

mod memory;
mod vault;

pub use memory::MemoryStore;
pub use vault::VaultStore;
