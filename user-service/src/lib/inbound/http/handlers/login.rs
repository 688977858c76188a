use auth::AccessToken;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::extractors::Form;
use crate::inbound::http::router::AppState;

/// OAuth2 password grant form; `username` carries the email.
#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<ApiSuccess<AccessToken>, ApiError> {
    state
        .authenticator
        .login(&form.username, &form.password)
        .await
        .map_err(ApiError::from)
        .map(|token| ApiSuccess::new(StatusCode::OK, token))
}
