//! Axum router wiring: shared state, routes, CORS and request logging.

use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::{Router, middleware as axum_middleware};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tracing::{info, warn};
use url::Url;

use crate::db::postgres::UserStorage;
use crate::handlers::{health, roles, users};
use crate::middleware::log_requests;
use crate::service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub storage: UserStorage,
    pub admin_key: Arc<str>,
}

impl AppState {
    pub fn new(storage: UserStorage, admin_key: impl Into<Arc<str>>) -> Self {
        Self {
            users: UserService::new(storage.clone()),
            storage,
            admin_key: admin_key.into(),
        }
    }
}

pub fn app_router(state: AppState, version_prefix: &str, cors_origins: &str) -> Router {
    let api = Router::new()
        .route("/users", post(users::create_user).get(users::list_users))
        .route(
            "/users/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::deactivate_user),
        )
        .route("/auth/login", post(users::login))
        .route("/roles", get(roles::list_roles))
        .route("/roles/{name}", put(roles::put_role));

    let mut app = Router::new()
        .route("/health-check", post(health::health_check))
        .route("/health/db", get(health::db_health))
        .nest(version_prefix, api)
        .layer(axum_middleware::from_fn(log_requests));

    if let Some(cors) = cors_layer(cors_origins) {
        info!("adding CORS origins");
        app = app.layer(cors);
    }

    app.with_state(state)
}

/// Build a CORS layer from a comma-separated origin list. Invalid entries
/// are skipped with a warning; an empty list disables CORS entirely.
fn cors_layer(origins: &str) -> Option<CorsLayer> {
    let allowed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|origin| {
            if Url::parse(origin).is_err() {
                warn!(origin, "skipping invalid CORS origin");
                return None;
            }
            HeaderValue::from_str(origin.trim_end_matches('/')).ok()
        })
        .collect();

    if allowed.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(allowed)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_origin_list_disables_cors() {
        assert!(cors_layer("").is_none());
        assert!(cors_layer(" , ").is_none());
    }

    #[test]
    fn invalid_origins_are_skipped() {
        assert!(cors_layer("not a url").is_none());
        assert!(cors_layer("https://app.example.com,not a url").is_some());
    }
}
