use serde::Deserialize;

use super::error::QueryError;
use super::filter::ToolFilter;
use super::sort::SortSpec;
use super::types::{Pagination, ToolQuery};
use crate::config::QueryConfig;

/// Raw query string of `GET /api/tools`.
///
/// Numbers stay strings here so malformed values surface as 422 with the
/// parameter name instead of a generic extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolListParams {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub q: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    /// e.g. `category:asc,name:asc`
    pub sort: Option<String>,
    /// Single-column form kept for older clients
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl ToolListParams {
    pub fn to_query(&self, config: &QueryConfig) -> Result<ToolQuery, QueryError> {
        // Legacy values are checked even when `sort` wins
        let legacy = SortSpec::from_legacy(self.sort_by.as_deref(), self.sort_dir.as_deref())?;
        let modern = match self.sort.as_deref() {
            Some(raw) => SortSpec::parse(raw)?,
            None => None,
        };
        let sort = modern.or(legacy).unwrap_or_default();

        let page = Pagination {
            limit: parse_limit(self.limit.as_deref(), config)?,
            offset: parse_offset(self.offset.as_deref())?,
        };

        let search = non_blank(self.q.as_deref());
        if let Some(q) = &search {
            let length = q.chars().count();
            if length > config.max_search_length {
                return Err(QueryError::InvalidFilter {
                    param: "q",
                    reason: format!("must be at most {} characters, got {}", config.max_search_length, length),
                });
            }
        }

        let filter = ToolFilter {
            category: non_blank(self.category.as_deref()),
            tag: non_blank(self.tag.as_deref()),
            search,
        };

        Ok(ToolQuery { filter, sort, page })
    }
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn parse_limit(raw: Option<&str>, config: &QueryConfig) -> Result<u32, QueryError> {
    let Some(raw) = raw else {
        return Ok(config.effective_default_limit());
    };
    let invalid = |reason: String| QueryError::InvalidLimit { value: raw.to_string(), reason };

    let value: i64 = raw.trim().parse().map_err(|_| invalid("must be an integer".to_string()))?;
    if value < 0 {
        return Err(invalid("must be non-negative".to_string()));
    }
    if value == 0 {
        return Err(invalid("must be at least 1".to_string()));
    }
    if value > i64::from(config.max_limit) {
        return Err(invalid(format!("must not exceed {}", config.max_limit)));
    }
    // Bounded by max_limit above
    Ok(value as u32)
}

fn parse_offset(raw: Option<&str>) -> Result<u64, QueryError> {
    let Some(raw) = raw else {
        return Ok(0);
    };
    let invalid = |reason: &str| QueryError::InvalidOffset { value: raw.to_string(), reason: reason.to_string() };

    let value: i64 = raw.trim().parse().map_err(|_| invalid("must be an integer"))?;
    if value < 0 {
        return Err(invalid("must be non-negative"));
    }
    Ok(value as u64)
}
