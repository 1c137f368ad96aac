use std::collections::HashMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Extension, Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::database::models::{NewTool, Tool, ToolChanges};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::query::{ToolListParams, ToolPage};
use crate::server::AppState;

/// GET /api/tools - Filtered, sorted, paginated tool listing
///
/// Query parameters: `category`, `tag`, `q`, `sort` (`field:dir,...`, at most
/// three keys), legacy `sort_by`/`sort_dir`, `limit`, `offset`.
///
/// ```json
/// { "items": [...], "total": 42, "limit": 20, "offset": 0 }
/// ```
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    params: Result<Query<ToolListParams>, QueryRejection>,
) -> Result<Json<ToolPage>, ApiError> {
    let Query(params) = params.map_err(|rejection| {
        let mut field_errors = HashMap::new();
        field_errors.insert("query".to_string(), rejection.body_text());
        ApiError::unprocessable_entity("Malformed query string", field_errors)
    })?;

    tracing::debug!("Tool listing for user {} ({})", auth_user.user_id, auth_user.role);

    let page = state.engine.list(&params).await?;
    Ok(Json(page))
}

/// GET /api/tools/categories - Distinct non-empty categories, ascending
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.engine.categories().await?))
}

/// GET /api/tools/tags - Distinct tags across all tools, ascending
pub async fn tags(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.engine.tags().await?))
}

/// POST /api/tools - Create a tool (admin only)
///
/// Names are unique; a taken name is a 409 with `"field": "name"`.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<NewTool>, JsonRejection>,
) -> Result<(StatusCode, Json<Tool>), ApiError> {
    auth_user.require_admin()?;
    let Json(payload) = payload.map_err(malformed_body)?;

    let tool = state.repository.insert(payload).await?;
    tracing::info!("Tool {} '{}' created by {}", tool.id, tool.name, auth_user.user_id);
    Ok((StatusCode::CREATED, Json(tool)))
}

/// PUT /api/tools/:id - Partial update; omitted fields keep their value (admin only)
pub async fn update(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ToolChanges>, JsonRejection>,
) -> Result<Json<Tool>, ApiError> {
    auth_user.require_admin()?;
    let Path(id) = id.map_err(|_| ApiError::not_found("Tool not found"))?;
    let Json(changes) = payload.map_err(malformed_body)?;

    let tool = state.repository.update(id, changes).await?;
    tracing::info!("Tool {} updated by {}", tool.id, auth_user.user_id);
    Ok(Json(tool))
}

/// DELETE /api/tools/:id - Remove a tool (admin only)
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    auth_user.require_admin()?;
    let Path(id) = id.map_err(|_| ApiError::not_found("Tool not found"))?;

    state.repository.delete(id).await?;
    tracing::info!("Tool {} deleted by {}", id, auth_user.user_id);
    Ok(Json(json!({ "ok": true })))
}

fn malformed_body(rejection: JsonRejection) -> ApiError {
    let mut field_errors = HashMap::new();
    field_errors.insert("body".to_string(), rejection.body_text());
    ApiError::unprocessable_entity("Malformed tool payload", field_errors)
}
