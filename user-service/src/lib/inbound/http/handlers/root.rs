use axum::http::StatusCode;

use super::ApiSuccess;
use super::Message;

pub async fn root() -> ApiSuccess<Message> {
    ApiSuccess::new(StatusCode::OK, Message::new("Olá Mundo!"))
}
