//! Adapters implementing domain ports.

pub mod file_repository;
pub mod in_memory_repository;

pub use file_repository::FileRepository;
pub use in_memory_repository::InMemoryRepository;
