pub mod manager;
pub mod query_builder;
pub mod repository;
pub mod models;
pub mod postgres;
pub mod memory;

pub use manager::{DatabaseManager, DatabaseError};
pub use repository::{ToolRepository, ToolWriteError};
pub use postgres::PgToolRepository;
pub use memory::MemoryToolRepository;
