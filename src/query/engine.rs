use std::sync::Arc;

use thiserror::Error;

use super::error::QueryError;
use super::params::ToolListParams;
use super::types::{ToolPage, ToolQuery};
use crate::config::QueryConfig;
use crate::database::manager::DatabaseError;
use crate::database::repository::ToolRepository;

#[derive(Debug, Error)]
pub enum ToolQueryError {
    /// Client input; the request is rejected as a whole
    #[error(transparent)]
    Invalid(#[from] QueryError),

    /// Infrastructure failure, passed through as-is
    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

/// Validates listing requests and runs them against a repository.
///
/// Holds no per-request state; clones share the repository.
#[derive(Clone)]
pub struct ToolQueryEngine {
    repository: Arc<dyn ToolRepository>,
    config: QueryConfig,
}

impl ToolQueryEngine {
    pub fn new(repository: Arc<dyn ToolRepository>, config: QueryConfig) -> Self {
        Self { repository, config }
    }

    /// Validation only; never touches storage
    pub fn prepare(&self, params: &ToolListParams) -> Result<ToolQuery, QueryError> {
        params.to_query(&self.config).map_err(|e| {
            tracing::info!("Rejected tool query ({}): {}", e.param(), e);
            e
        })
    }

    /// Validates then executes
    pub async fn list(&self, params: &ToolListParams) -> Result<ToolPage, ToolQueryError> {
        let query = self.prepare(params)?;
        self.query(&query).await
    }

    pub async fn query(&self, query: &ToolQuery) -> Result<ToolPage, ToolQueryError> {
        if self.config.debug_logging {
            tracing::debug!(
                "Tool query: filter={:?} sort={} limit={} offset={}",
                query.filter,
                query.sort,
                query.page.limit,
                query.page.offset
            );
        }

        let (items, total) = self.repository.select_page(query).await?;

        if self.config.debug_logging {
            tracing::debug!("Tool query returned {} of {} matching", items.len(), total);
        }

        Ok(ToolPage {
            items,
            total,
            limit: query.page.limit,
            offset: query.page.offset,
        })
    }

    pub async fn categories(&self) -> Result<Vec<String>, DatabaseError> {
        self.repository.categories().await
    }

    pub async fn tags(&self) -> Result<Vec<String>, DatabaseError> {
        self.repository.tags().await
    }

    pub async fn health(&self) -> Result<(), DatabaseError> {
        self.repository.health().await
    }
}
