use super::types::SqlParam;
use crate::database::models::Tool;

/// Normalized listing filters, ANDed together. `None` means "not filtered".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolFilter {
    /// Exact, case-sensitive match on the stored category
    pub category: Option<String>,
    /// Exact, case-sensitive membership in the tag set
    pub tag: Option<String>,
    /// Case-insensitive substring of name, description or category
    pub search: Option<String>,
}

impl ToolFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.tag.is_none() && self.search.is_none()
    }

    pub fn matches(&self, tool: &Tool) -> bool {
        if let Some(category) = &self.category {
            if &tool.category != category {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !tool.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = tool.name.to_lowercase().contains(&needle)
                || tool.category.to_lowercase().contains(&needle)
                || tool
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }

    /// Builds the WHERE predicate, appending bound values to `params`.
    /// Returns `None` when nothing is filtered.
    pub fn to_sql(&self, params: &mut Vec<SqlParam>) -> Option<String> {
        let mut conditions = vec![];

        if let Some(category) = &self.category {
            conditions.push(format!("\"category\" = {}", bind(params, category)));
        }
        if let Some(tag) = &self.tag {
            conditions.push(format!("{} = ANY(\"tags\")", bind(params, tag)));
        }
        if let Some(search) = &self.search {
            // strpos keeps '%' and '_' literal, unlike LIKE
            let p = bind(params, search);
            conditions.push(format!(
                "(strpos(lower(\"name\"), lower({p})) > 0 \
                 OR strpos(lower(coalesce(\"description\", '')), lower({p})) > 0 \
                 OR strpos(lower(\"category\"), lower({p})) > 0)"
            ));
        }

        if conditions.is_empty() {
            None
        } else {
            Some(conditions.join(" AND "))
        }
    }
}

fn bind(params: &mut Vec<SqlParam>, value: &str) -> String {
    params.push(SqlParam::Text(value.to_string()));
    format!("${}", params.len())
}
