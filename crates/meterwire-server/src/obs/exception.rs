//! Exception hook.
//!
//! A failing handler leaves a [`RecordedException`] in the response
//! extensions. [`exception_hook`] hands it to the registered handler, and the
//! metrics handler writes its label into [`EXCEPTION_HEADER`] for the timer.
//! The timer strips that header before the response leaves the server.

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use meterwire_core::exception::RecordedException;

use crate::app_state::AppState;

/// Transient header carrying the exception label from the hook to the timer.
pub const EXCEPTION_HEADER: HeaderName = HeaderName::from_static("x-meterwire-exception");

pub trait ExceptionHandler: Send + Sync {
    fn handle(&self, exception: &RecordedException, response: &mut Response);
}

impl<F> ExceptionHandler for F
where
    F: Fn(&RecordedException, &mut Response) + Send + Sync,
{
    fn handle(&self, exception: &RecordedException, response: &mut Response) {
        self(exception, response)
    }
}

/// Tags the response for the request timer and turns it into a 500.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsExceptionHandler;

impl ExceptionHandler for MetricsExceptionHandler {
    fn handle(&self, exception: &RecordedException, response: &mut Response) {
        match HeaderValue::from_str(exception.label()) {
            Ok(v) => {
                response.headers_mut().insert(EXCEPTION_HEADER, v);
            }
            Err(_) => {
                tracing::warn!(exception = %exception.label(), "exception label is not a valid header value");
            }
        }
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    }
}

/// Delegates, then logs the exception.
#[derive(Debug, Clone, Default)]
pub struct LoggingExceptionHandler<H> {
    inner: H,
}

impl<H> LoggingExceptionHandler<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H: ExceptionHandler> ExceptionHandler for LoggingExceptionHandler<H> {
    fn handle(&self, exception: &RecordedException, response: &mut Response) {
        self.inner.handle(exception, response);
        tracing::error!(
            exception = %exception.label(),
            qualified = %exception.qualified_name(),
            message = %exception.message(),
            status = %response.status(),
            "request failed"
        );
    }
}

/// Handlers keyed by exception simple name, with a fallback for everything else.
pub struct ExceptionHandlers {
    by_name: DashMap<String, Arc<dyn ExceptionHandler>>,
    fallback: Arc<dyn ExceptionHandler>,
}

impl ExceptionHandlers {
    pub fn new(fallback: Arc<dyn ExceptionHandler>) -> Self {
        Self {
            by_name: DashMap::new(),
            fallback,
        }
    }

    pub fn register(&self, simple_name: impl Into<String>, handler: Arc<dyn ExceptionHandler>) {
        self.by_name.insert(simple_name.into(), handler);
    }

    pub fn registered(&self) -> Vec<String> {
        self.by_name.iter().map(|e| e.key().clone()).collect()
    }

    pub fn handle(&self, exception: &RecordedException, response: &mut Response) {
        let handler = self
            .by_name
            .get(exception.simple_name())
            .map(|e| Arc::clone(e.value()))
            .unwrap_or_else(|| Arc::clone(&self.fallback));
        handler.handle(exception, response);
    }
}

impl Default for ExceptionHandlers {
    fn default() -> Self {
        Self::new(Arc::new(MetricsExceptionHandler))
    }
}

/// Middleware: route a recorded exception to its handler.
pub async fn exception_hook(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    if let Some(exception) = response.extensions_mut().remove::<RecordedException>() {
        state.exception_handlers().handle(&exception, &mut response);
    }
    response
}

/// Exception name recorded for a handler that panicked.
pub const PANIC_EXCEPTION: &str = "PanicException";

/// Response for a caught panic. Used by `CatchPanicLayer` inside the hook,
/// so the panic is handled and timed like any other exception.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    let mut response = (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response();
    response.extensions_mut().insert(RecordedException::new(
        PANIC_EXCEPTION,
        "std::panic::PanicHookInfo",
        message,
    ));
    response
}

/// Remove the side-channel header, returning its value.
pub fn take_exception_header(headers: &mut HeaderMap) -> Option<String> {
    headers
        .remove(EXCEPTION_HEADER)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn boom() -> RecordedException {
        RecordedException::new("IllegalArgumentException", "sample::IllegalArgument", "boom")
    }

    #[test]
    fn metrics_handler_sets_header_and_500() {
        let mut resp = (StatusCode::BAD_REQUEST, "bad").into_response();
        MetricsExceptionHandler.handle(&boom(), &mut resp);

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            take_exception_header(resp.headers_mut()).as_deref(),
            Some("IllegalArgumentException")
        );
        assert!(resp.headers().get(EXCEPTION_HEADER).is_none());
    }

    #[test]
    fn registered_handler_wins_over_fallback() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let handlers = ExceptionHandlers::default();
        handlers.register(
            "IllegalArgumentException",
            Arc::new(|_: &RecordedException, r: &mut Response| {
                CALLS.fetch_add(1, Ordering::Relaxed);
                *r.status_mut() = StatusCode::IM_A_TEAPOT;
            }),
        );

        let mut resp = "x".into_response();
        handlers.handle(&boom(), &mut resp);
        assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(CALLS.load(Ordering::Relaxed), 1);

        let other = RecordedException::new("InternalException", "x::Internal", "oops");
        let mut resp = "x".into_response();
        handlers.handle(&other, &mut resp);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(CALLS.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn panic_payload_becomes_recorded_exception() {
        let resp = panic_response(Box::new(String::from("kaboom")));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let rec = resp.extensions().get::<RecordedException>().unwrap();
        assert_eq!(rec.label(), "PanicException");
        assert_eq!(rec.message(), "kaboom");

        let resp = panic_response(Box::new(7_u32));
        let rec = resp.extensions().get::<RecordedException>().unwrap();
        assert_eq!(rec.message(), "unknown panic payload");
    }

    #[test]
    fn logging_handler_delegates() {
        let mut resp = "x".into_response();
        LoggingExceptionHandler::new(MetricsExceptionHandler).handle(&boom(), &mut resp);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(resp.headers().contains_key(EXCEPTION_HEADER));
    }
}
