//! In-memory repositories.

pub mod connection;

pub use connection::InMemoryConnectionRegistry;
