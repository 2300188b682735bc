//! Axum router wiring.
//!
//! Layer order matters: `timed` is outermost so it sees the exception header
//! written by `exception_hook` and strips it before the response is sent.
//! Panics are caught inside the hook and recorded as `PanicException`.

use axum::{middleware, routing::get, Router};
use tower_http::catch_panic::CatchPanicLayer;

use crate::{app_state::AppState, obs, ops, routes};

pub fn build_router(state: AppState) -> Router {
    let hello: Router<AppState> = Router::new()
        .route("/hello/:name", get(routes::hello))
        .route_layer(middleware::from_fn(routes::after_hello));

    let hi: Router<AppState> = Router::new().route("/:name", get(routes::hello));

    let app = Router::new()
        .route("/", get(routes::root))
        .route("/boom", get(routes::boom))
        .route("/prometheus", get(ops::prometheus))
        .merge(hello)
        .nest("/hi", hi);

    instrument(app, &state).with_state(state)
}

/// Wrap every route (and the fallback) with panic catching, the exception
/// hook and the request timer.
pub fn instrument(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router
        .layer(CatchPanicLayer::custom(obs::exception::panic_response))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            obs::exception::exception_hook,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), obs::timed::timed))
}
