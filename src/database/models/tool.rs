use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 120;
pub const DESCRIPTION_MAX_CHARS: usize = 5000;
pub const CATEGORY_MAX_CHARS: usize = 80;
pub const DEFAULT_CATEGORY: &str = "general";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tool {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolValidationError {
    #[error("name must be between 2 and 120 characters")]
    InvalidName,

    #[error("description must be at most 5000 characters")]
    DescriptionTooLong,

    #[error("url is not a valid absolute URL: {0}")]
    InvalidUrl(String),

    #[error("category must be between 1 and 80 characters")]
    InvalidCategory,
}

impl ToolValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ToolValidationError::InvalidName => "name",
            ToolValidationError::DescriptionTooLong => "description",
            ToolValidationError::InvalidUrl(_) => "url",
            ToolValidationError::InvalidCategory => "category",
        }
    }
}

/// Input for a tool that has not been stored yet
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTool {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Validates and normalizes into a stored `Tool`
    pub fn into_tool(self, id: i64, created_at: DateTime<Utc>) -> Result<Tool, ToolValidationError> {
        let name = self.name.trim().to_string();
        let name_len = name.chars().count();
        if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name_len) {
            return Err(ToolValidationError::InvalidName);
        }

        let description = self.description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());
        if description.as_ref().is_some_and(|d| d.chars().count() > DESCRIPTION_MAX_CHARS) {
            return Err(ToolValidationError::DescriptionTooLong);
        }

        let url = match self.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            Some(raw) => {
                url::Url::parse(&raw).map_err(|e| ToolValidationError::InvalidUrl(e.to_string()))?;
                Some(raw)
            }
            None => None,
        };

        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        if category.chars().count() > CATEGORY_MAX_CHARS {
            return Err(ToolValidationError::InvalidCategory);
        }

        Ok(Tool {
            id,
            name,
            description,
            url,
            category,
            tags: normalize_tags(self.tags),
            created_at,
        })
    }
}

impl Tool {
    /// Re-applies tag normalization to a row read from storage
    pub fn normalized(mut self) -> Self {
        self.tags = normalize_tags(std::mem::take(&mut self.tags));
        self
    }
}

/// Partial update of a stored tool. Absent fields keep their current value;
/// the merged result is validated like a new tool.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl ToolChanges {
    /// Merged, validated tool. `id` and `created_at` never change.
    pub fn apply(self, existing: &Tool) -> Result<Tool, ToolValidationError> {
        NewTool {
            name: self.name.unwrap_or_else(|| existing.name.clone()),
            description: self.description.or_else(|| existing.description.clone()),
            url: self.url.or_else(|| existing.url.clone()),
            category: self.category.or_else(|| Some(existing.category.clone())),
            tags: self.tags.unwrap_or_else(|| existing.tags.clone()),
        }
        .into_tool(existing.id, existing.created_at)
    }
}

/// Trims tags, drops empty ones and duplicates (first occurrence wins)
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_tags() {
        assert_eq!(normalize_tags(["aws", " aws ", "", "gcp", "AWS"]), vec!["aws", "gcp", "AWS"]);
    }

    #[test]
    fn applies_defaults() {
        let tool = NewTool::new("  Jenkins ").description("").url(" ").into_tool(1, Utc::now()).unwrap();
        assert_eq!(tool.name, "Jenkins");
        assert_eq!(tool.category, DEFAULT_CATEGORY);
        assert_eq!(tool.description, None);
        assert_eq!(tool.url, None);
    }

    #[test]
    fn rejects_invalid_fields() {
        let now = Utc::now();
        assert_eq!(NewTool::new("x").into_tool(1, now).unwrap_err().field(), "name");
        assert_eq!(NewTool::new("x".repeat(121)).into_tool(1, now).unwrap_err().field(), "name");
        assert_eq!(
            NewTool::new("ok").description("d".repeat(5001)).into_tool(1, now).unwrap_err().field(),
            "description"
        );
        assert_eq!(NewTool::new("ok").url("not a url").into_tool(1, now).unwrap_err().field(), "url");
        assert_eq!(
            NewTool::new("ok").category("c".repeat(81)).into_tool(1, now).unwrap_err().field(),
            "category"
        );
    }

    #[test]
    fn stored_rows_are_renormalized() {
        let tool = Tool {
            id: 3,
            name: "Vault".to_string(),
            description: None,
            url: None,
            category: "security".to_string(),
            tags: vec!["secrets".into(), "".into(), " secrets".into(), "pki".into()],
            created_at: Utc::now(),
        };
        assert_eq!(tool.normalized().tags, vec!["secrets", "pki"]);
    }

    #[test]
    fn changes_merge_onto_existing() {
        let created = Utc::now();
        let existing = NewTool::new("Jenkins")
            .description("CI server")
            .category("ci-cd")
            .tags(["cicd"])
            .into_tool(7, created)
            .unwrap();

        let changes = ToolChanges { name: Some("Jenkins X".into()), description: Some("".into()), ..Default::default() };
        let updated = changes.apply(&existing).unwrap();
        assert_eq!(updated.id, 7);
        assert_eq!(updated.created_at, created);
        assert_eq!(updated.name, "Jenkins X");
        assert_eq!(updated.description, None);
        assert_eq!(updated.category, "ci-cd");
        assert_eq!(updated.tags, vec!["cicd"]);

        let bad = ToolChanges { name: Some("J".into()), ..Default::default() };
        assert_eq!(bad.apply(&existing).unwrap_err().field(), "name");
    }
}
