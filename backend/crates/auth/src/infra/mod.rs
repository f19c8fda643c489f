//! Infrastructure Layer
//!
//! Account stores: PostgreSQL for deployments, in-memory for local runs
//! and tests.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAccountRepository;
pub use postgres::PgAccountRepository;
