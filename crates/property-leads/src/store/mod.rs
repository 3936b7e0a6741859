//! Store adapters implementing [`AgentDirectory`](crate::repository::AgentDirectory) and
//! [`LeadRepository`](crate::repository::LeadRepository).

pub mod memory;
pub mod postgrest;

pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;
