use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewTool, Tool, ToolChanges};
use crate::database::repository::{ToolRepository, ToolWriteError};
use crate::query::ToolQuery;

#[derive(Default)]
struct Catalog {
    tools: Vec<Tool>,
    last_id: i64,
}

impl Catalog {
    fn name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.tools.iter().any(|t| t.name == name && Some(t.id) != except)
    }
}

/// In-process tool collection. Backs local runs without Postgres and tests.
#[derive(Default)]
pub struct MemoryToolRepository {
    catalog: RwLock<Catalog>,
}

impl MemoryToolRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository holding the catalog a fresh install starts with
    pub async fn with_sample_tools() -> Result<Self, ToolWriteError> {
        let repo = Self::new();
        for tool in sample_tools() {
            repo.insert(tool).await?;
        }
        Ok(repo)
    }

    /// Loads a fixture row with an explicit creation time. Fields are
    /// validated, but names may repeat so ordering ties can be staged.
    pub async fn insert_at(&self, tool: NewTool, created_at: DateTime<Utc>) -> Result<Tool, ToolWriteError> {
        self.push(tool, created_at, false).await
    }

    async fn push(&self, tool: NewTool, created_at: DateTime<Utc>, unique_name: bool) -> Result<Tool, ToolWriteError> {
        let mut catalog = self.catalog.write().await;
        // ids are never reused, even after deletes
        let tool = tool.into_tool(catalog.last_id + 1, created_at)?;
        if unique_name && catalog.name_taken(&tool.name, None) {
            return Err(ToolWriteError::DuplicateName(tool.name));
        }
        catalog.last_id = tool.id;
        catalog.tools.push(tool.clone());
        Ok(tool)
    }

    pub async fn len(&self) -> usize {
        self.catalog.read().await.tools.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.catalog.read().await.tools.is_empty()
    }
}

#[async_trait]
impl ToolRepository for MemoryToolRepository {
    async fn select_page(&self, query: &ToolQuery) -> Result<(Vec<Tool>, u64), DatabaseError> {
        let catalog = self.catalog.read().await;
        Ok(query.apply(&catalog.tools))
    }

    async fn categories(&self) -> Result<Vec<String>, DatabaseError> {
        let catalog = self.catalog.read().await;
        let mut categories: Vec<String> = catalog
            .tools
            .iter()
            .map(|t| t.category.clone())
            .filter(|c| !c.is_empty())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn tags(&self) -> Result<Vec<String>, DatabaseError> {
        let catalog = self.catalog.read().await;
        let mut tags: Vec<String> = catalog
            .tools
            .iter()
            .flat_map(|t| t.tags.iter().cloned())
            .filter(|t| !t.is_empty())
            .collect();
        tags.sort();
        tags.dedup();
        Ok(tags)
    }

    async fn health(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn insert(&self, tool: NewTool) -> Result<Tool, ToolWriteError> {
        self.push(tool, Utc::now(), true).await
    }

    async fn update(&self, id: i64, changes: ToolChanges) -> Result<Tool, ToolWriteError> {
        let mut catalog = self.catalog.write().await;
        let index = catalog
            .tools
            .iter()
            .position(|t| t.id == id)
            .ok_or(ToolWriteError::NotFound(id))?;

        let updated = changes.apply(&catalog.tools[index])?;
        if catalog.name_taken(&updated.name, Some(id)) {
            return Err(ToolWriteError::DuplicateName(updated.name));
        }
        catalog.tools[index] = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), ToolWriteError> {
        let mut catalog = self.catalog.write().await;
        let before = catalog.tools.len();
        catalog.tools.retain(|t| t.id != id);
        if catalog.tools.len() == before {
            return Err(ToolWriteError::NotFound(id));
        }
        Ok(())
    }
}

fn sample_tools() -> Vec<NewTool> {
    vec![
        NewTool::new("Jenkins")
            .description("CI/CD automation server")
            .url("https://www.jenkins.io/")
            .category("ci-cd")
            .tags(["cicd", "pipelines"]),
        NewTool::new("Prometheus")
            .description("Monitoring and alerting toolkit")
            .url("https://prometheus.io/")
            .category("observability")
            .tags(["metrics", "monitoring"]),
        NewTool::new("Grafana")
            .description("Visualization and dashboards")
            .url("https://grafana.com/")
            .category("observability")
            .tags(["dashboards", "visualization"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeds_sample_catalog() {
        let repo = MemoryToolRepository::with_sample_tools().await.unwrap();
        assert_eq!(repo.len().await, 3);
        assert_eq!(repo.categories().await.unwrap(), vec!["ci-cd", "observability"]);
        assert_eq!(
            repo.tags().await.unwrap(),
            vec!["cicd", "dashboards", "metrics", "monitoring", "pipelines", "visualization"]
        );
    }

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let repo = MemoryToolRepository::new();
        assert!(repo.is_empty().await);
        let a = repo.insert(NewTool::new("alpha")).await.unwrap();
        let b = repo.insert(NewTool::new("beta")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        repo.delete(b.id).await.unwrap();
        let c = repo.insert(NewTool::new("gamma")).await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn rejects_invalid_tools() {
        let repo = MemoryToolRepository::new();
        let err = repo.insert(NewTool::new("a")).await.unwrap_err();
        assert!(matches!(err, ToolWriteError::Invalid(ref e) if e.field() == "name"));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn names_stay_unique() {
        let repo = MemoryToolRepository::new();
        repo.insert(NewTool::new("vault")).await.unwrap();
        let other = repo.insert(NewTool::new("consul")).await.unwrap();

        let err = repo.insert(NewTool::new(" vault ")).await.unwrap_err();
        assert!(matches!(err, ToolWriteError::DuplicateName(ref n) if n == "vault"));

        let rename = ToolChanges { name: Some("vault".into()), ..Default::default() };
        let err = repo.update(other.id, rename).await.unwrap_err();
        assert!(matches!(err, ToolWriteError::DuplicateName(_)));

        // Keeping its own name is not a conflict
        let retag = ToolChanges { tags: Some(vec!["service-mesh".into()]), ..Default::default() };
        let updated = repo.update(other.id, retag).await.unwrap();
        assert_eq!(updated.name, "consul");
        assert_eq!(updated.tags, vec!["service-mesh"]);
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn fixtures_may_share_names() {
        let repo = MemoryToolRepository::new();
        repo.insert_at(NewTool::new("aa").category("x"), Utc::now()).await.unwrap();
        repo.insert_at(NewTool::new("aa").category("y"), Utc::now()).await.unwrap();
        assert_eq!(repo.len().await, 2);
        assert!(repo.insert_at(NewTool::new("a"), Utc::now()).await.is_err());
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let repo = MemoryToolRepository::new();
        assert!(matches!(repo.update(9, ToolChanges::default()).await, Err(ToolWriteError::NotFound(9))));
        assert!(matches!(repo.delete(9).await, Err(ToolWriteError::NotFound(9))));
    }
}
