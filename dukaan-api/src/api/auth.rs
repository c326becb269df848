//! Authentication middleware and auth endpoints
//!
//! The middleware extracts the bearer token, delegates verification to the
//! configured identity service and injects an `AuthContext` into the request.
//! A verified caller may still have no local user row; registration is the
//! endpoint that creates it.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use tracing::debug;

use crate::db::users::{self, User};
use crate::error::ApiError;
use crate::identity::{IdentityClaims, IdentityError};
use crate::AppState;

/// Verified identity plus the matching local user row, if any
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: IdentityClaims,
    pub user: Option<User>,
}

/// Authentication middleware for protected routes.
///
/// Returns 401 when the token is missing, malformed, or rejected by the
/// identity service. Does not require a local user row.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let Some(header_value) = header_value else {
        return Err(ApiError::Unauthorized("No token provided".to_string()));
    };
    let Some(token) = header_value.strip_prefix("Bearer ") else {
        return Err(ApiError::Unauthorized("No token provided".to_string()));
    };
    if token.is_empty() {
        return Err(ApiError::Unauthorized("Invalid token format".to_string()));
    }

    let claims = state.verifier.verify(token).await.map_err(|err| match err {
        IdentityError::Rejected(msg) => ApiError::Unauthorized(format!("Invalid token: {}", msg)),
        IdentityError::Unavailable(msg) => ApiError::Internal(msg),
    })?;

    debug!(uid = %claims.uid, "Token verified");

    let user = users::load_user_by_external_uid(&state.db, &claims.uid).await?;

    request.extensions_mut().insert(AuthContext { claims, user });
    Ok(next.run(request).await)
}

/// Local user row of the authenticated caller, or 401 if they never registered
pub fn require_user(ctx: &AuthContext) -> Result<&User, ApiError> {
    ctx.user
        .as_ref()
        .ok_or_else(|| ApiError::Unauthorized("User not registered".to_string()))
}

/// POST /api/auth/register
///
/// Create the local user row from the verified claims.
pub async fn register(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    if ctx.user.is_some() {
        return Err(ApiError::Conflict(
            "User already exists. Please login instead.".to_string(),
        ));
    }

    let user = User::new(
        ctx.claims.uid.clone(),
        ctx.claims.email.clone(),
        ctx.claims.name.clone(),
        ctx.claims.email_verified,
        ctx.claims.picture.clone(),
    );
    users::insert_user(&state.db, &user).await?;

    let stored = users::load_user_by_external_uid(&state.db, &ctx.claims.uid)
        .await?
        .ok_or_else(|| ApiError::Internal("User row missing after insert".to_string()))?;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// POST /api/auth/login
///
/// Refresh the local profile from the latest claims. A name or picture is
/// only overwritten when the claims actually carry one, and a verified email
/// never becomes unverified again.
pub async fn login(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<User>, ApiError> {
    let Some(user) = ctx.user else {
        return Err(ApiError::NotFound(
            "User not found. Please register first.".to_string(),
        ));
    };

    let name = ctx.claims.name.clone().unwrap_or_else(|| user.name.clone());
    let email_verified = ctx.claims.email_verified || user.email_verified;
    let picture = ctx
        .claims
        .picture
        .clone()
        .or_else(|| user.profile_picture.clone());

    users::update_user_profile(&state.db, &user.guid, &name, email_verified, picture.as_deref())
        .await?;

    let updated = users::load_user_by_guid(&state.db, &user.guid)
        .await?
        .ok_or_else(|| ApiError::Internal("User row missing after update".to_string()))?;

    Ok(Json(updated))
}

/// GET /api/auth/profile
pub async fn profile(
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<User>, ApiError> {
    match ctx.user {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::NotFound("User not found".to_string())),
    }
}
