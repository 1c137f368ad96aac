pub mod types;
pub mod error;
pub mod sort;
pub mod filter;
pub mod params;
pub mod sql;
pub mod engine;

pub use types::*;
pub use error::QueryError;
pub use sort::{SortSpec, MAX_SORT_KEYS};
pub use filter::ToolFilter;
pub use params::ToolListParams;
pub use engine::{ToolQueryEngine, ToolQueryError};
