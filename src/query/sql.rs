use super::filter::ToolFilter;
use super::types::{SqlResult, ToolQuery};

pub const TOOLS_TABLE: &str = "tools";

const TOOL_COLUMNS: &str = "\"id\", \"name\", \"description\", \"url\", \"category\", \"tags\", \"created_at\"";

/// Page query: filtered, ordered, sliced
pub fn select_page(query: &ToolQuery) -> SqlResult {
    let mut params = vec![];
    let where_clause = query.filter.to_sql(&mut params);

    let sql = [
        format!("SELECT {}", TOOL_COLUMNS),
        format!("FROM \"{}\"", TOOLS_TABLE),
        where_clause.map(|w| format!("WHERE {}", w)).unwrap_or_default(),
        query.sort.to_sql(),
        format!("LIMIT {} OFFSET {}", query.page.limit, query.page.offset),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    SqlResult { query: sql, params }
}

/// Count of all rows matching the filter, ignoring limit/offset
pub fn count(filter: &ToolFilter) -> SqlResult {
    let mut params = vec![];
    let sql = match filter.to_sql(&mut params) {
        Some(w) => format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", TOOLS_TABLE, w),
        None => format!("SELECT COUNT(*) AS count FROM \"{}\"", TOOLS_TABLE),
    };
    SqlResult { query: sql, params }
}

pub fn categories() -> String {
    format!(
        "SELECT \"category\" FROM \"{t}\" WHERE \"category\" <> '' \
         GROUP BY \"category\" ORDER BY \"category\" COLLATE \"C\"",
        t = TOOLS_TABLE
    )
}

pub fn tags() -> String {
    format!(
        "SELECT t.tag AS tag FROM \"{}\", unnest(\"tags\") AS t(tag) WHERE t.tag <> '' \
         GROUP BY t.tag ORDER BY t.tag COLLATE \"C\"",
        TOOLS_TABLE
    )
}

/// Single row by id, locked for the rest of the transaction
pub fn select_for_update() -> String {
    format!("SELECT {} FROM \"{}\" WHERE \"id\" = $1 FOR UPDATE", TOOL_COLUMNS, TOOLS_TABLE)
}

/// Binds: name, description, url, category, tags, created_at
pub fn insert() -> String {
    format!(
        "INSERT INTO \"{}\" (\"name\", \"description\", \"url\", \"category\", \"tags\", \"created_at\") \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
        TOOLS_TABLE, TOOL_COLUMNS
    )
}

/// Binds: id, name, description, url, category, tags
pub fn update() -> String {
    format!(
        "UPDATE \"{}\" SET \"name\" = $2, \"description\" = $3, \"url\" = $4, \"category\" = $5, \"tags\" = $6 \
         WHERE \"id\" = $1 RETURNING {}",
        TOOLS_TABLE, TOOL_COLUMNS
    )
}

pub fn delete() -> String {
    format!("DELETE FROM \"{}\" WHERE \"id\" = $1", TOOLS_TABLE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::sort::SortSpec;
    use crate::query::types::{Pagination, SqlParam};

    fn query(filter: ToolFilter, sort: &str, limit: u32, offset: u64) -> ToolQuery {
        ToolQuery {
            filter,
            sort: SortSpec::parse(sort).unwrap().unwrap_or_default(),
            page: Pagination { limit, offset },
        }
    }

    #[test]
    fn unfiltered_page() {
        let sql = select_page(&query(ToolFilter::default(), "", 20, 0));
        assert_eq!(
            sql.query,
            "SELECT \"id\", \"name\", \"description\", \"url\", \"category\", \"tags\", \"created_at\" \
             FROM \"tools\" ORDER BY \"created_at\" DESC, \"id\" DESC LIMIT 20 OFFSET 0"
        );
        assert!(sql.params.is_empty());
    }

    #[test]
    fn page_and_count_share_the_predicate() {
        let filter = ToolFilter { category: Some("ci-cd".into()), tag: Some("pipelines".into()), search: None };
        let page = select_page(&query(filter.clone(), "category:asc,name:asc", 5, 10));
        let total = count(&filter);

        assert!(page.query.contains("WHERE \"category\" = $1 AND $2 = ANY(\"tags\") ORDER BY"));
        assert!(page.query.ends_with("LIMIT 5 OFFSET 10"));
        assert_eq!(
            total.query,
            "SELECT COUNT(*) AS count FROM \"tools\" WHERE \"category\" = $1 AND $2 = ANY(\"tags\")"
        );
        assert_eq!(page.params, total.params);
        assert_eq!(page.params[0], SqlParam::Text("ci-cd".into()));
    }

    #[test]
    fn aggregates_use_byte_order() {
        assert!(categories().ends_with("ORDER BY \"category\" COLLATE \"C\""));
        assert!(tags().contains("unnest(\"tags\")"));
    }

    #[test]
    fn write_statements_return_full_rows() {
        assert!(insert().starts_with("INSERT INTO \"tools\""));
        assert!(insert().ends_with(&format!("RETURNING {}", TOOL_COLUMNS)));
        assert!(update().contains("WHERE \"id\" = $1 RETURNING"));
        assert!(!update().contains("created_at\" ="));
        assert_eq!(delete(), "DELETE FROM \"tools\" WHERE \"id\" = $1");
        assert!(select_for_update().ends_with("FOR UPDATE"));
    }
}
