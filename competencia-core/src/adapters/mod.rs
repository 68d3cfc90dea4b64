//! Adapters - concrete implementations of the ports

pub mod duckdb;
pub mod memory;

pub use self::duckdb::DuckDbStore;
pub use self::memory::MemoryStore;
