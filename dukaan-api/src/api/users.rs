//! User endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::db::users::{self, User};
use crate::error::ApiError;
use crate::AppState;

/// GET /api/user/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    users::load_user_by_guid(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}
