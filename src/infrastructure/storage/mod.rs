//! Record store implementations kept in process memory

mod memory;

pub use memory::InMemoryRepositoryProvider;
