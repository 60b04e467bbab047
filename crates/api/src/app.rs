//! Router assembly.

use axum::Router;
use axum::routing::post;

use crate::middleware::{CHANGE_PASSWORD_PATH, LOGIN_PATH, auth_middleware};
use crate::routes;
use crate::state::AppState;

/// Build the full router.
///
/// Login is public; everything else sits behind the bearer middleware.
/// The password-change route is authenticated but, like login, exempt from
/// session-reset semantics on failure (the middleware checks the path).
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/v1/authorize", post(routes::authorize))
        .route(CHANGE_PASSWORD_PATH, post(routes::change_password))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route(LOGIN_PATH, post(routes::login))
        .merge(protected)
        .with_state(state)
}
