use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::filter::ToolFilter;
use super::sort::SortSpec;
use crate::database::models::Tool;

/// Columns a tool listing may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Category,
    CreatedAt,
}

impl SortField {
    pub const ALL: [SortField; 3] = [SortField::Name, SortField::Category, SortField::CreatedAt];

    /// Expects an already trimmed, lowercased name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(SortField::Name),
            "category" => Some(SortField::Category),
            "created_at" => Some(SortField::CreatedAt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Category => "category",
            SortField::CreatedAt => "created_at",
        }
    }

    /// ORDER BY expression. Text columns use the "C" collation so Postgres
    /// orders byte-wise, same as `str::cmp`.
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortField::Name => "\"name\" COLLATE \"C\"",
            SortField::Category => "\"category\" COLLATE \"C\"",
            SortField::CreatedAt => "\"created_at\"",
        }
    }

    pub fn compare(&self, a: &Tool, b: &Tool) -> Ordering {
        match self {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Category => a.category.cmp(&b.category),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }

    pub fn allowed() -> String {
        Self::ALL.iter().map(|f| f.as_str()).collect::<Vec<_>>().join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn compare(&self, a: &Tool, b: &Tool) -> Ordering {
        self.direction.apply(self.field.compare(a, b))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u64,
}

/// A validated listing request.
///
/// Fields are crate-private and the only public constructor is
/// `ToolListParams::to_query`, so a `ToolQuery` outside this crate has
/// always passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolQuery {
    pub(crate) filter: ToolFilter,
    pub(crate) sort: SortSpec,
    pub(crate) page: Pagination,
}

impl ToolQuery {
    pub fn filter(&self) -> &ToolFilter {
        &self.filter
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn page(&self) -> Pagination {
        self.page
    }

    /// Filters, orders and slices an in-memory collection.
    /// Returns the page plus the number of tools matching the filter.
    pub fn apply(&self, tools: &[Tool]) -> (Vec<Tool>, u64) {
        let mut matching: Vec<&Tool> = tools.iter().filter(|t| self.filter.matches(t)).collect();
        let total = matching.len() as u64;

        matching.sort_by(|a, b| self.sort.compare(a, b));

        let offset = usize::try_from(self.page.offset).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(self.page.limit as usize)
            .cloned()
            .collect();

        (items, total)
    }
}

/// One page of the tool listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolPage {
    pub items: Vec<Tool>,
    pub total: u64,
    pub limit: u32,
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
