use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{documents, health_check, messages, submissions};
use crate::AppState;

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/documents", post(documents::create_document))
        .route("/documents/:id", get(documents::get_document))
        .route("/documents/:id/submit", post(documents::submit_document))
        .route("/documents/:id/start-review", post(documents::start_review))
        .route("/documents/:id/approve", post(documents::approve_document))
        .route("/documents/:id/reject", post(documents::reject_document))
        .route("/documents/:id/resubmit", post(documents::resubmit_document))
        .route("/documents/:id/archive", post(documents::archive_document))
        .route("/documents/:id/sign", post(documents::sign_document))
        .route(
            "/documents/:id/signatures/:signature_id/verify",
            get(documents::verify_signature),
        )
        .route("/documents/:id/restore", post(documents::restore_version))
        .route("/submissions", post(submissions::create_submission))
        .route("/submissions/:id", get(submissions::get_submission))
        .route("/submissions/:id/review", post(submissions::review_submission))
        .route("/messages/direct", post(messages::send_direct))
        .route("/messages/broadcast", post(messages::send_broadcast))
        .route("/messages/:id/read", post(messages::mark_read))
        .route("/messages/:id/acknowledge", post(messages::acknowledge))
        .route("/messages/stats/:user_id", get(messages::message_stats))
        .with_state(state)
}
