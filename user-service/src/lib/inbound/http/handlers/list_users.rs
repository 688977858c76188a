use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserPublic;
use crate::domain::user::models::Pagination;
use crate::inbound::http::extractors::Query;
use crate::inbound::http::router::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<ApiSuccess<UserList>, ApiError> {
    state
        .user_service
        .list_users(page)
        .await
        .map_err(ApiError::from)
        .map(|users| {
            ApiSuccess::new(
                StatusCode::OK,
                UserList {
                    users: users.iter().map(UserPublic::from).collect(),
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserList {
    pub users: Vec<UserPublic>,
}
