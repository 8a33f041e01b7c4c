use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;
use watios_common::constants::SERVER_ERROR_BODY;
use watios_common::Failure;

use crate::alerter::Alerter;

/// Handler error that turns into a generic 500 and is alerted on by
/// [`report_errors`].
#[derive(Debug)]
pub struct ReportedError(pub Failure);

impl<E> From<E> for ReportedError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        ReportedError(Failure::from(err.into()))
    }
}

#[derive(Clone)]
struct PendingFailure(Failure);

impl IntoResponse for ReportedError {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_BODY).into_response();
        response.extensions_mut().insert(PendingFailure(self.0));
        response
    }
}

/// Middleware for `axum::middleware::from_fn_with_state`.
pub async fn report_errors(
    State(alerter): State<Arc<Alerter>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let mut response = next.run(request).await;

    if let Some(PendingFailure(failure)) = response.extensions_mut().remove::<PendingFailure>() {
        let record = alerter.capture_error(&failure);
        warn!(
            "Handler for {} {} failed with {}",
            method, uri, record.error_code
        );
    }

    response
}
