//! HTTP face of [`MeterwireError`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use meterwire_core::error::{ClientCode, MeterwireError};
use meterwire_core::exception::RecordedException;

/// Handler error. Renders a plain-text response and records the exception
/// for [`exception_hook`](crate::obs::exception::exception_hook).
#[derive(Debug, Error)]
#[error(transparent)]
pub struct AppError(#[from] pub MeterwireError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self.0.client_code() {
            ClientCode::BadRequest | ClientCode::UnsupportedVersion => StatusCode::BAD_REQUEST,
            ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let recorded = RecordedException::capture(&self.0);
        let mut response = (self.status(), self.0.to_string()).into_response();
        response.extensions_mut().insert(recorded);
        response
    }
}
