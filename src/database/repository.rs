use async_trait::async_trait;
use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewTool, Tool, ToolChanges, ToolValidationError};
use crate::query::ToolQuery;

/// Failures of a catalog write
#[derive(Debug, Error)]
pub enum ToolWriteError {
    #[error(transparent)]
    Invalid(#[from] ToolValidationError),

    #[error("Tool name '{0}' already exists")]
    DuplicateName(String),

    #[error("Tool {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

/// Access to the tool collection.
///
/// `select_page` must compute items and total from one consistent read so a
/// page never disagrees with its own count. Names are unique across the
/// collection; writes that would break that fail with `DuplicateName`.
#[async_trait]
pub trait ToolRepository: Send + Sync {
    /// Page of tools for a validated query, plus the unpaged match count
    async fn select_page(&self, query: &ToolQuery) -> Result<(Vec<Tool>, u64), DatabaseError>;

    /// Distinct non-empty categories, byte-wise sorted
    async fn categories(&self) -> Result<Vec<String>, DatabaseError>;

    /// Distinct non-empty tags, byte-wise sorted
    async fn tags(&self) -> Result<Vec<String>, DatabaseError>;

    async fn health(&self) -> Result<(), DatabaseError>;

    /// Validates, normalizes and stores a new tool with a fresh id
    async fn insert(&self, tool: NewTool) -> Result<Tool, ToolWriteError>;

    async fn update(&self, id: i64, changes: ToolChanges) -> Result<Tool, ToolWriteError>;

    async fn delete(&self, id: i64) -> Result<(), ToolWriteError>;
}
