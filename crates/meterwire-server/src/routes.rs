//! Sample routes.

use axum::{extract::Path, extract::Request, middleware::Next, response::Response};

use meterwire_core::error::MeterwireError;

use crate::error::AppError;

pub async fn root() -> &'static str {
    "Hello World"
}

pub async fn hello(Path(name): Path<String>) -> String {
    format!("Hello: {name}")
}

pub async fn boom() -> Result<String, AppError> {
    Err(MeterwireError::IllegalArgument("boom".into()).into())
}

/// After-filter for `/hello/*`.
pub async fn after_hello(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    tracing::info!("hello");
    response
}
