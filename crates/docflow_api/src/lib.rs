pub mod handlers;
pub mod routes;

use axum::http::StatusCode;

use docflow_core::Error;
use docflow_db::PgStore;
use docflow_service::WorkflowService;

#[derive(Clone)]
pub struct AppState {
    pub svc: WorkflowService<PgStore>,
}

/// One place turns the workflow taxonomy into HTTP. Conflict-shaped errors
/// (lost races, idempotency violations, locks) are all 409 so clients retry
/// with a fresh read.
pub fn error_response(e: Error) -> (StatusCode, String) {
    let status = match &e {
        Error::Unauthorized(_) => StatusCode::FORBIDDEN,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidRoute(_) | Error::Validation(_) | Error::InvalidState(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        Error::AlreadyReviewed
        | Error::AlreadySigned(_)
        | Error::DocumentLocked
        | Error::ConcurrentModification(_) => StatusCode::CONFLICT,
        Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %e, "internal error");
        (status, "internal server error".to_string())
    } else {
        (status, e.to_string())
    }
}
