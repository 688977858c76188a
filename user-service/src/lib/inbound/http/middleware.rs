use auth::StoredUser;
use axum::extract::Request;
use axum::extract::State;
use axum::http;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type carrying the user a bearer token resolved to.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub StoredUser);

impl CurrentUser {
    pub fn id(&self) -> UserId {
        UserId(self.0.id)
    }

    /// Users may only modify their own record.
    pub fn ensure_owns(&self, user_id: UserId) -> Result<(), ApiError> {
        if self.id() != user_id {
            tracing::warn!(
                current_user = %self.id(),
                target_user = %user_id,
                "Rejected modification of another user"
            );
            return Err(ApiError::BadRequest("Not enough permissions.".to_string()));
        }
        Ok(())
    }
}

/// Middleware that resolves the bearer token and adds the user to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    // Owned, so no borrow of the request is held across the await.
    let token = extract_token_from_header(&req)
        .map(str::to_string)
        .ok_or_else(|| {
            tracing::debug!("Missing or malformed Authorization header");
            ApiError::Unauthorized.into_response()
        })?;

    let user = state
        .authenticator
        .resolve(&token)
        .await
        .map_err(|e| ApiError::from(e).into_response())?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Option<&str> {
    let auth_str = req
        .headers()
        .get(http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;

    let (scheme, token) = auth_str.split_once(' ')?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("Bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}
