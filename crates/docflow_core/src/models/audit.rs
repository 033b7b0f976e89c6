use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Append-only audit record. Never mutated or deleted; writes are
/// best-effort and must not block the transition they describe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub action: String,
    pub target_kind: String,
    pub target_id: Uuid,
    pub details: serde_json::Value,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

impl AuditEntry {
    pub fn new(
        actor_id: Uuid,
        action: impl Into<String>,
        target_kind: impl Into<String>,
        target_id: Uuid,
        details: serde_json::Value,
        now: OffsetDateTime,
    ) -> Self {
        AuditEntry {
            id: Uuid::new_v4(),
            actor_id,
            action: action.into(),
            target_kind: target_kind.into(),
            target_id,
            details,
            recorded_at: now,
        }
    }
}
