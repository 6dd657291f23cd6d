//! Transaction store adapters.

mod in_memory;
mod postgres;

pub use in_memory::InMemoryTransactionStore;
pub use postgres::PostgresTransactionStore;
