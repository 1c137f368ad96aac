use sqlx::{self, postgres::PgArguments, postgres::PgRow, Executor, FromRow, Postgres, Row};

use crate::database::manager::DatabaseError;
use crate::query::{SqlParam, SqlResult};

/// Runs a generated SELECT and maps every row to `T`
pub async fn fetch_all<'c, T, E>(executor: E, sql: &SqlResult) -> Result<Vec<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    E: Executor<'c, Database = Postgres>,
{
    let mut q = sqlx::query_as::<_, T>(&sql.query);
    for p in sql.params.iter() {
        q = bind_param_query_as(q, p);
    }
    let rows = q.fetch_all(executor).await?;
    Ok(rows)
}

/// Runs a generated `SELECT COUNT(*) AS count ...`
pub async fn fetch_count<'c, E>(executor: E, sql: &SqlResult) -> Result<u64, DatabaseError>
where
    E: Executor<'c, Database = Postgres>,
{
    let mut q = sqlx::query(&sql.query);
    for p in sql.params.iter() {
        q = bind_param_query(q, p);
    }
    let row = q.fetch_one(executor).await?;
    let count: i64 = row.try_get("count")?;
    u64::try_from(count).map_err(|_| DatabaseError::QueryError(format!("negative row count: {}", count)))
}

/// Runs a single-column text query (aggregates)
pub async fn fetch_strings<'c, E>(executor: E, query: &str) -> Result<Vec<String>, DatabaseError>
where
    E: Executor<'c, Database = Postgres>,
{
    let rows: Vec<(String,)> = sqlx::query_as(query).fetch_all(executor).await?;
    Ok(rows.into_iter().map(|(s,)| s).collect())
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match v {
        SqlParam::Text(s) => q.bind(s.as_str()),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        SqlParam::Text(s) => q.bind(s.as_str()),
    }
}
