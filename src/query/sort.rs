use std::cmp::Ordering;
use std::fmt;

use super::error::QueryError;
use super::types::{SortDirection, SortField, SortKey};
use crate::database::models::Tool;

pub const MAX_SORT_KEYS: usize = 3;

/// Final ORDER BY term; keeps pages reproducible when every sort key ties.
const TIEBREAK_SQL: &str = "\"id\" DESC";

/// Ordered list of 1..=3 sort keys with no repeated field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self { keys: vec![SortKey::new(SortField::CreatedAt, SortDirection::Desc)] }
    }
}

impl SortSpec {
    pub fn new(keys: Vec<SortKey>) -> Result<Self, QueryError> {
        if keys.is_empty() {
            return Err(QueryError::EmptySortSpec);
        }
        if keys.len() > MAX_SORT_KEYS {
            return Err(QueryError::TooManySortFields { max: MAX_SORT_KEYS, given: keys.len() });
        }
        for (i, key) in keys.iter().enumerate() {
            if keys[..i].iter().any(|k| k.field == key.field) {
                return Err(QueryError::DuplicateSortField(key.field.as_str().to_string()));
            }
        }
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Parses `field:direction[,field:direction...]`.
    ///
    /// A blank string means "no sort given" and yields `None`. Names are
    /// trimmed and ASCII-lowercased, but every token must carry a direction.
    pub fn parse(input: &str) -> Result<Option<Self>, QueryError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let tokens: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if tokens.len() > MAX_SORT_KEYS {
            return Err(QueryError::TooManySortFields { max: MAX_SORT_KEYS, given: tokens.len() });
        }

        let mut keys = Vec::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            if token.is_empty() {
                return Err(QueryError::EmptySortToken { position: i + 1 });
            }
            keys.push(Self::parse_token(token)?);
        }
        Self::new(keys).map(Some)
    }

    fn parse_token(token: &str) -> Result<SortKey, QueryError> {
        let (field_part, direction_part) = match token.split_once(':') {
            Some((f, d)) => (f, Some(d)),
            None => (token, None),
        };

        let field = parse_field("sort", field_part)?;
        let direction = match direction_part.map(str::trim) {
            Some(d) if !d.is_empty() => parse_direction("sort", d)?,
            _ => {
                return Err(QueryError::MissingSortDirection { field: field.as_str().to_string() })
            }
        };
        Ok(SortKey::new(field, direction))
    }

    /// Translates the single-column `sort_by`/`sort_dir` pair.
    ///
    /// Both values are validated whenever present. A missing half falls back
    /// to `created_at` / `desc`; neither present yields `None`.
    pub fn from_legacy(sort_by: Option<&str>, sort_dir: Option<&str>) -> Result<Option<Self>, QueryError> {
        let sort_by = sort_by.map(str::trim).filter(|s| !s.is_empty());
        let sort_dir = sort_dir.map(str::trim).filter(|s| !s.is_empty());
        if sort_by.is_none() && sort_dir.is_none() {
            return Ok(None);
        }

        let field = match sort_by {
            Some(raw) => parse_field("sort_by", raw)?,
            None => SortField::CreatedAt,
        };
        let direction = match sort_dir {
            Some(raw) => parse_direction("sort_dir", raw)?,
            None => SortDirection::Desc,
        };
        Self::new(vec![SortKey::new(field, direction)]).map(Some)
    }

    /// Composite comparator: each key in turn, then id descending.
    pub fn compare(&self, a: &Tool, b: &Tool) -> Ordering {
        self.keys
            .iter()
            .map(|k| k.compare(a, b))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| b.id.cmp(&a.id))
    }

    pub fn to_sql(&self) -> String {
        let parts: Vec<String> = self
            .keys
            .iter()
            .map(|k| format!("{} {}", k.field.to_sql(), k.direction.to_sql()))
            .chain(std::iter::once(TIEBREAK_SQL.to_string()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .keys
            .iter()
            .map(|k| format!("{}:{}", k.field.as_str(), k.direction.as_str()))
            .collect();
        write!(f, "{}", parts.join(","))
    }
}

fn parse_field(param: &'static str, raw: &str) -> Result<SortField, QueryError> {
    let name = raw.trim().to_ascii_lowercase();
    SortField::parse(&name).ok_or_else(|| QueryError::UnknownSortField {
        param,
        field: name,
        allowed: SortField::allowed(),
    })
}

fn parse_direction(param: &'static str, raw: &str) -> Result<SortDirection, QueryError> {
    let name = raw.trim().to_ascii_lowercase();
    SortDirection::parse(&name).ok_or(QueryError::InvalidSortDirection { param, direction: name })
}
