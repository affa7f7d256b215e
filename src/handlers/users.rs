use axum::extract::{Path, State};

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// GET /users/:username - The user's own record, or any record for admins
pub async fn get(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<User> {
    let user = state.users.get(&username).await?;
    Ok(ApiResponse::success(user))
}
