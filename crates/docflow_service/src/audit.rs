use serde_json::Value;
use uuid::Uuid;

use docflow_core::models::audit::AuditEntry;

use crate::{Store, WorkflowService};

impl<S: Store> WorkflowService<S> {
    /// Fire-and-forget audit write. A failed write must never roll back or
    /// fail the transition it describes; it is logged and dropped.
    pub(crate) async fn record_audit(
        &self,
        actor_id: Uuid,
        action: &str,
        target_kind: &str,
        target_id: Uuid,
        details: Value,
    ) {
        let entry = AuditEntry::new(actor_id, action, target_kind, target_id, details, self.now());
        if let Err(e) = self.store.append_audit_log(&entry).await {
            tracing::warn!(action, %target_id, error = %e, "audit write failed, continuing");
        }
    }
}
