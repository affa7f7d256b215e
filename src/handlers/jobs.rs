use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde_json::{json, Value};

use super::rejected;
use crate::database::models::{Job, JobFilter, NewJob};
use crate::database::UpdatePayload;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// GET /jobs - List jobs, optionally filtered by title, minSalary, hasEquity
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<JobFilter>, QueryRejection>,
) -> ApiResult<Vec<Job>> {
    let Query(filter) = query.map_err(rejected)?;
    let jobs = Job::find_all(&state.pool, &filter).await?;
    Ok(ApiResponse::success(jobs))
}

/// GET /jobs/:id
pub async fn get(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Job> {
    let Path(id) = id.map_err(rejected)?;
    let job = Job::get(&state.pool, id).await?;
    Ok(ApiResponse::success(job))
}

/// POST /jobs - Create a job (admin)
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewJob>, JsonRejection>,
) -> ApiResult<Job> {
    let Json(data) = body.map_err(rejected)?;
    let job = Job::create(&state.pool, data).await?;
    Ok(ApiResponse::created(job))
}

/// PATCH /jobs/:id - Partially update title, salary and equity (admin)
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<UpdatePayload>, JsonRejection>,
) -> ApiResult<Job> {
    let Path(id) = id.map_err(rejected)?;
    let Json(data) = body.map_err(rejected)?;
    let job = Job::update(&state.pool, id, data).await?;
    Ok(ApiResponse::success(job))
}

/// DELETE /jobs/:id (admin)
pub async fn remove(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Value> {
    let Path(id) = id.map_err(rejected)?;
    Job::remove(&state.pool, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id })))
}
