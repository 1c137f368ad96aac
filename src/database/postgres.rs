use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{NewTool, Tool, ToolChanges};
use crate::database::query_builder;
use crate::database::repository::{ToolRepository, ToolWriteError};
use crate::query::{sql, ToolQuery};

/// Tool repository over the `tools` table. Expects a unique index on `name`.
#[derive(Clone)]
pub struct PgToolRepository {
    pool: PgPool,
    config: DatabaseConfig,
}

impl PgToolRepository {
    pub fn new(pool: PgPool, config: DatabaseConfig) -> Self {
        Self { pool, config }
    }

    fn log_timing(&self, label: &str, started: Instant) {
        let elapsed_ms = started.elapsed().as_millis() as u64;
        if self.config.enable_slow_query_warning && elapsed_ms > self.config.slow_query_threshold_ms {
            tracing::warn!(
                "Slow query '{}': {}ms (threshold {}ms)",
                label,
                elapsed_ms,
                self.config.slow_query_threshold_ms
            );
        } else if self.config.enable_query_logging {
            tracing::debug!("Query '{}' took {}ms", label, elapsed_ms);
        }
    }
}

/// Maps a unique violation on `name` to `DuplicateName`
fn write_error(err: sqlx::Error, name: &str) -> ToolWriteError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            ToolWriteError::DuplicateName(name.to_string())
        }
        _ => ToolWriteError::Storage(err.into()),
    }
}

#[async_trait]
impl ToolRepository for PgToolRepository {
    async fn select_page(&self, query: &ToolQuery) -> Result<(Vec<Tool>, u64), DatabaseError> {
        let page_sql = sql::select_page(query);
        let count_sql = sql::count(query.filter());

        if self.config.enable_query_logging {
            tracing::debug!("Tool page SQL: {}", page_sql.query);
        }

        let started = Instant::now();

        // Page and count must see the same snapshot
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        let items: Vec<Tool> = query_builder::fetch_all(&mut *tx, &page_sql).await?;
        let total = query_builder::fetch_count(&mut *tx, &count_sql).await?;
        tx.commit().await?;

        self.log_timing("select_page", started);
        Ok((items.into_iter().map(Tool::normalized).collect(), total))
    }

    async fn categories(&self) -> Result<Vec<String>, DatabaseError> {
        let started = Instant::now();
        let categories = query_builder::fetch_strings(&self.pool, &sql::categories()).await?;
        self.log_timing("categories", started);
        Ok(categories)
    }

    async fn tags(&self) -> Result<Vec<String>, DatabaseError> {
        let started = Instant::now();
        let tags = query_builder::fetch_strings(&self.pool, &sql::tags()).await?;
        self.log_timing("tags", started);
        Ok(tags)
    }

    async fn health(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn insert(&self, tool: NewTool) -> Result<Tool, ToolWriteError> {
        // Placeholder id; the database assigns the real one
        let tool = tool.into_tool(0, Utc::now())?;
        let started = Instant::now();

        let stored: Tool = sqlx::query_as(&sql::insert())
            .bind(tool.name.clone())
            .bind(tool.description)
            .bind(tool.url)
            .bind(tool.category)
            .bind(tool.tags)
            .bind(tool.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_error(e, &tool.name))?;

        self.log_timing("insert", started);
        Ok(stored.normalized())
    }

    async fn update(&self, id: i64, changes: ToolChanges) -> Result<Tool, ToolWriteError> {
        let started = Instant::now();
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let existing: Option<Tool> = sqlx::query_as(&sql::select_for_update())
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;
        let existing = existing.ok_or(ToolWriteError::NotFound(id))?;
        let updated = changes.apply(&existing.normalized())?;

        let stored: Tool = sqlx::query_as(&sql::update())
            .bind(id)
            .bind(updated.name.clone())
            .bind(updated.description)
            .bind(updated.url)
            .bind(updated.category)
            .bind(updated.tags)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| write_error(e, &updated.name))?;
        tx.commit().await.map_err(DatabaseError::from)?;

        self.log_timing("update", started);
        Ok(stored.normalized())
    }

    async fn delete(&self, id: i64) -> Result<(), ToolWriteError> {
        let started = Instant::now();
        let result = sqlx::query(&sql::delete())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        self.log_timing("delete", started);

        if result.rows_affected() == 0 {
            return Err(ToolWriteError::NotFound(id));
        }
        Ok(())
    }
}
