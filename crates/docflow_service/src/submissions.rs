use serde_json::json;
use uuid::Uuid;

use docflow_core::models::submission::{DocumentSubmission, SubmissionType};
use docflow_core::workflow::routing::{self, SubmissionDecision};
use docflow_core::{Error, Result};

use crate::{Store, WorkflowService};

impl<S: Store> WorkflowService<S> {
    /// Route a document from the acting sender to a recipient. The routing
    /// matrix decides which role pairs and department combinations are
    /// legal; a legal pair yields a `Pending` submission.
    pub async fn create_submission(
        &self,
        actor_id: Uuid,
        document_id: Uuid,
        to_user: Uuid,
        submission_type: SubmissionType,
    ) -> Result<DocumentSubmission> {
        let from = self.actor(actor_id).await?;
        let to = self.store.get_user(to_user).await?;
        if !to.active {
            return Err(Error::Validation(format!(
                "recipient {} is deactivated",
                to.id
            )));
        }
        routing::validate_route(submission_type, &from, &to)?;

        // The document must exist before it can be routed.
        let doc = self.store.get_document(document_id).await?;

        let submission =
            DocumentSubmission::new(doc.id, from.id, to.id, submission_type, self.now());
        self.store.create_submission(&submission).await?;
        self.record_audit(
            from.id,
            "submission.create",
            "submission",
            submission.id,
            json!({
                "document": doc.id,
                "type": submission_type.as_str(),
                "to": to.id,
            }),
        )
        .await;
        Ok(submission)
    }

    pub async fn get_submission(&self, id: Uuid) -> Result<DocumentSubmission> {
        self.store.get_submission(id).await
    }

    /// Apply the recipient's verdict, exactly once. A stale caller token or
    /// a lost race fails with `ConcurrentModification`; a submission that
    /// already left `Pending` fails with `AlreadyReviewed`.
    pub async fn review_submission(
        &self,
        actor_id: Uuid,
        submission_id: Uuid,
        decision: SubmissionDecision,
        feedback: Option<&str>,
        expected_revision: Option<i32>,
    ) -> Result<DocumentSubmission> {
        let reviewer = self.actor(actor_id).await?;
        let mut submission = self.store.get_submission(submission_id).await?;
        let base_revision = submission.revision;
        if let Some(expected) = expected_revision {
            if expected != base_revision {
                return Err(Error::ConcurrentModification(format!(
                    "submission {submission_id}"
                )));
            }
        }

        let now = self.now();
        routing::review_submission(&mut submission, &reviewer, decision, feedback, now)?;
        self.store
            .update_submission_status(
                submission.id,
                submission.status,
                submission.feedback.as_deref(),
                now,
                base_revision,
            )
            .await?;
        submission.revision = base_revision + 1;

        self.record_audit(
            reviewer.id,
            "submission.review",
            "submission",
            submission.id,
            json!({
                "status": submission.status.as_str(),
                "on_behalf": submission.to_user != reviewer.id,
            }),
        )
        .await;
        Ok(submission)
    }
}
