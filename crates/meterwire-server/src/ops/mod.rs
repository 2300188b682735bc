//! Scrape endpoint.
//!
//! - `/prometheus` : Prometheus text format

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;
use crate::error::AppError;
use crate::obs::registry::CONTENT_TYPE_004;

pub async fn prometheus(State(state): State<AppState>) -> Result<Response, AppError> {
    let body = state.meters().scrape()?;

    Ok((StatusCode::OK, [(CONTENT_TYPE, CONTENT_TYPE_004)], body).into_response())
}
