use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use meterwire_core::tags::RequestOutcome;

use crate::app_state::AppState;
use crate::obs::exception::take_exception_header;

/// Axum middleware that times every request into `http_server_requests_seconds`.
///
/// Must wrap [`exception_hook`](crate::obs::exception::exception_hook) so the
/// exception header is already set when the response comes back here.
pub async fn timed(
    State(state): State<AppState>,
    matched_path: Option<MatchedPath>,
    req: Request,
    next: Next,
) -> Response {
    let matched = matched_path.map(|mp| mp.as_str().to_owned());
    let method = req.method().as_str().to_owned();
    let http = state.http_metrics();
    let _active = http.start();
    let start = Instant::now();

    let mut response = next.run(req).await;

    let exception = take_exception_header(response.headers_mut());
    let outcome = RequestOutcome::new(
        matched.as_deref(),
        response.status().as_u16(),
        exception.as_deref(),
    );
    let labels = state.tags_provider().tags(&outcome);
    http.record(&method, &outcome, &labels, start.elapsed());

    tracing::debug!(
        %method,
        route = %labels.route(),
        exception = %labels.exception(),
        status = outcome.status,
        "request timed"
    );

    response
}
