pub mod challenges;
pub mod connection;
pub mod ratings;
pub mod setup;
pub mod stats;
pub mod teams;

pub use connection::{DbConn, DbPool, create_memory_pool, create_pool, get_connection};
pub use setup::initialize_database;
