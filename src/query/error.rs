use thiserror::Error;

/// Client input errors for the tool listing. Every variant rejects the whole
/// request; nothing is repaired or replaced with a default.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("sort supports at most {max} fields, got {given}")]
    TooManySortFields { max: usize, given: usize },

    #[error("sort must name at least one field")]
    EmptySortSpec,

    #[error("Empty sort token at position {position}")]
    EmptySortToken { position: usize },

    #[error("Invalid sort field '{field}'. Allowed: {allowed}")]
    UnknownSortField {
        param: &'static str,
        field: String,
        allowed: String,
    },

    #[error("Sort field '{field}' requires an explicit direction (asc or desc)")]
    MissingSortDirection { field: String },

    #[error("Invalid sort direction '{direction}'. Allowed: asc, desc")]
    InvalidSortDirection {
        param: &'static str,
        direction: String,
    },

    #[error("Duplicate sort field '{0}'")]
    DuplicateSortField(String),

    #[error("Invalid limit '{value}': {reason}")]
    InvalidLimit { value: String, reason: String },

    #[error("Invalid offset '{value}': {reason}")]
    InvalidOffset { value: String, reason: String },

    #[error("Invalid filter '{param}': {reason}")]
    InvalidFilter { param: &'static str, reason: String },
}

impl QueryError {
    /// Query parameter the error refers to
    pub fn param(&self) -> &'static str {
        match self {
            QueryError::TooManySortFields { .. }
            | QueryError::EmptySortSpec
            | QueryError::EmptySortToken { .. }
            | QueryError::MissingSortDirection { .. }
            | QueryError::DuplicateSortField(_) => "sort",
            QueryError::UnknownSortField { param, .. } => *param,
            QueryError::InvalidSortDirection { param, .. } => *param,
            QueryError::InvalidLimit { .. } => "limit",
            QueryError::InvalidOffset { .. } => "offset",
            QueryError::InvalidFilter { param, .. } => *param,
        }
    }
}
