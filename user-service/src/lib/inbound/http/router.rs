use std::sync::Arc;
use std::time::Duration;

use auth::AuthSettings;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::UserLookup;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_user::create_user;
use super::handlers::delete_user::delete_user;
use super::handlers::get_user::get_user;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::root::root;
use super::handlers::update_user::update_user;
use super::middleware::authenticate as auth_middleware;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::ports::UserServicePort;
use crate::domain::user::service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub authenticator: Arc<Authenticator<dyn UserLookup>>,
}

/// Wire the user service and authenticator over a repository and build the router.
///
/// # Errors
/// * `SigningError` - Settings cannot be used to sign or verify tokens
pub fn build_router<UR: UserRepository>(
    repository: Arc<UR>,
    settings: &AuthSettings,
) -> Result<Router, AuthenticationError> {
    let user_service = Arc::new(UserService::new(repository));
    let lookup: Arc<dyn UserLookup> = user_service.clone();
    let authenticator = Arc::new(Authenticator::new(settings, lookup)?);

    Ok(create_router(user_service, authenticator))
}

pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    authenticator: Arc<Authenticator<dyn UserLookup>>,
) -> Router {
    let state = AppState {
        user_service,
        authenticator,
    };

    let public_routes = Router::new()
        .route("/", get(root))
        .route("/token", post(login))
        .route("/users/", post(create_user).get(list_users))
        .route("/users/:user_id", get(get_user));

    let protected_routes = Router::new()
        .route("/users/:user_id", put(update_user).delete(delete_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Headers are left out of the span; they carry bearer tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
