use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use super::rejected;
use crate::database::models::{Company, CompanyDetail, CompanyFilter, NewCompany};
use crate::database::UpdatePayload;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// GET /companies - List companies, optionally filtered by nameLike, minEmployees, maxEmployees
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<CompanyFilter>, QueryRejection>,
) -> ApiResult<Vec<Company>> {
    let Query(filter) = query.map_err(rejected)?;
    let companies = Company::find_all(&state.pool, &filter).await?;
    Ok(ApiResponse::success(companies))
}

/// GET /companies/:handle - A company with its jobs
pub async fn get(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> ApiResult<CompanyDetail> {
    let company = Company::get(&state.pool, &handle).await?;
    Ok(ApiResponse::success(company))
}

/// POST /companies - Create a company (admin)
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewCompany>, JsonRejection>,
) -> ApiResult<Company> {
    let Json(data) = body.map_err(rejected)?;
    let company = Company::create(&state.pool, data).await?;
    Ok(ApiResponse::created(company))
}

/// PATCH /companies/:handle - Partially update a company (admin)
pub async fn update(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    body: Result<Json<UpdatePayload>, JsonRejection>,
) -> ApiResult<Company> {
    let Json(data) = body.map_err(rejected)?;
    let company = Company::update(&state.pool, &handle, data).await?;
    Ok(ApiResponse::success(company))
}

/// DELETE /companies/:handle - Remove a company and its jobs (admin)
pub async fn remove(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> ApiResult<Value> {
    Company::remove(&state.pool, &handle).await?;
    Ok(ApiResponse::success(json!({ "deleted": handle })))
}
