use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagePriority {
    Low,
    Normal,
    High,
    Urgent,
}

/// Per-recipient delivery state. Strictly monotonic: a recipient never moves
/// backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    Sent,
    Read,
    Acknowledged,
}

impl DeliveryState {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryState::Sent => "sent",
            DeliveryState::Read => "read",
            DeliveryState::Acknowledged => "acknowledged",
        }
    }

    pub fn parse(value: &str) -> Option<DeliveryState> {
        Some(match value {
            "sent" => DeliveryState::Sent,
            "read" => DeliveryState::Read,
            "acknowledged" => DeliveryState::Acknowledged,
            _ => return None,
        })
    }
}

/// Who a message is addressed to: exactly one of a single user (direct) or a
/// whole department (broadcast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageAddress {
    User(Uuid),
    Department(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterDepartmentMessage {
    pub id: Uuid,
    pub from_user: Uuid,
    pub to: MessageAddress,
    pub subject: String,
    pub body: String,
    pub priority: MessagePriority,
    pub requires_response: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub response_deadline: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
}

impl InterDepartmentMessage {
    pub fn is_broadcast(&self) -> bool {
        matches!(self.to, MessageAddress::Department(_))
    }
}

/// One row per target user. Direct messages get a single recipient row so
/// read/acknowledge tracking is uniform across both send modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecipient {
    pub message_id: Uuid,
    pub user_id: Uuid,
    pub state: DeliveryState,
    #[serde(with = "time::serde::rfc3339::option")]
    pub read_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub acknowledged_at: Option<OffsetDateTime>,
}

impl MessageRecipient {
    pub fn new(message_id: Uuid, user_id: Uuid) -> Self {
        MessageRecipient {
            message_id,
            user_id,
            state: DeliveryState::Sent,
            read_at: None,
            acknowledged_at: None,
        }
    }

    /// `Sent → Read`. Reading an already-read message is a no-op; reading
    /// after acknowledgment would be a regression and is refused.
    pub fn mark_read(&mut self, now: OffsetDateTime) -> Result<()> {
        match self.state {
            DeliveryState::Sent => {
                self.state = DeliveryState::Read;
                self.read_at = Some(now);
                Ok(())
            }
            DeliveryState::Read => Ok(()),
            DeliveryState::Acknowledged => Err(Error::InvalidState(
                "message already acknowledged".to_string(),
            )),
        }
    }

    /// `Read → Acknowledged`. Acknowledging straight from `Sent` promotes
    /// through `Read` first, stamping both timestamps; re-acknowledging is a
    /// no-op.
    pub fn acknowledge(&mut self, now: OffsetDateTime) -> Result<()> {
        match self.state {
            DeliveryState::Sent => {
                self.read_at = Some(now);
                self.acknowledged_at = Some(now);
                self.state = DeliveryState::Acknowledged;
                Ok(())
            }
            DeliveryState::Read => {
                self.acknowledged_at = Some(now);
                self.state = DeliveryState::Acknowledged;
                Ok(())
            }
            DeliveryState::Acknowledged => Ok(()),
        }
    }
}

/// Read-side aggregate for a user's message dashboard. Pure computation, no
/// side effects; deadlines are compared at read time, never scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MessageStats {
    pub unread: usize,
    pub pending_response: usize,
    pub sent_today: usize,
}

pub fn message_stats<'a>(
    inbox: impl IntoIterator<Item = (&'a InterDepartmentMessage, &'a MessageRecipient)>,
    sent: impl IntoIterator<Item = &'a InterDepartmentMessage>,
    now: OffsetDateTime,
) -> MessageStats {
    let mut stats = MessageStats::default();
    for (message, recipient) in inbox {
        if recipient.state == DeliveryState::Sent {
            stats.unread += 1;
        }
        if message.requires_response
            && recipient.state != DeliveryState::Acknowledged
            && message.response_deadline.map_or(true, |d| now < d)
        {
            stats.pending_response += 1;
        }
    }
    stats.sent_today = sent
        .into_iter()
        .filter(|m| m.sent_at.date() == now.date())
        .count();
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn recipient() -> MessageRecipient {
        MessageRecipient::new(Uuid::new_v4(), Uuid::new_v4())
    }

    fn message(requires_response: bool, deadline: Option<OffsetDateTime>) -> InterDepartmentMessage {
        InterDepartmentMessage {
            id: Uuid::new_v4(),
            from_user: Uuid::new_v4(),
            to: MessageAddress::Department("Radiology".to_string()),
            subject: "Equipment audit".to_string(),
            body: "Submit inventory counts by Friday.".to_string(),
            priority: MessagePriority::Normal,
            requires_response,
            response_deadline: deadline,
            sent_at: datetime!(2026-03-05 09:00 UTC),
        }
    }

    #[test]
    fn delivery_state_is_monotonic() {
        let now = datetime!(2026-03-05 10:00 UTC);
        let mut r = recipient();
        r.mark_read(now).unwrap();
        r.acknowledge(now).unwrap();
        assert_eq!(r.state, DeliveryState::Acknowledged);
        // No regression back to read.
        assert!(matches!(r.mark_read(now), Err(Error::InvalidState(_))));
    }

    #[test]
    fn acknowledge_from_sent_promotes_through_read() {
        let now = datetime!(2026-03-05 10:00 UTC);
        let mut r = recipient();
        r.acknowledge(now).unwrap();
        assert_eq!(r.state, DeliveryState::Acknowledged);
        assert_eq!(r.read_at, Some(now));
        assert_eq!(r.acknowledged_at, Some(now));
    }

    #[test]
    fn repeated_read_and_acknowledge_are_idempotent() {
        let now = datetime!(2026-03-05 10:00 UTC);
        let mut r = recipient();
        r.mark_read(now).unwrap();
        r.mark_read(now).unwrap();
        r.acknowledge(now).unwrap();
        r.acknowledge(now).unwrap();
        assert_eq!(r.state, DeliveryState::Acknowledged);
    }

    #[test]
    fn stats_count_unread_pending_and_sent_today() {
        let now = datetime!(2026-03-05 12:00 UTC);

        let unread_msg = message(false, None);
        let unread_rcpt = MessageRecipient::new(unread_msg.id, Uuid::new_v4());

        let pending_msg = message(true, Some(datetime!(2026-03-06 12:00 UTC)));
        let mut pending_rcpt = MessageRecipient::new(pending_msg.id, Uuid::new_v4());
        pending_rcpt.mark_read(now).unwrap();

        // Past deadline: no longer counted as pending.
        let expired_msg = message(true, Some(datetime!(2026-03-05 09:30 UTC)));
        let expired_rcpt = MessageRecipient::new(expired_msg.id, Uuid::new_v4());

        let sent = [message(false, None)];

        let stats = message_stats(
            [
                (&unread_msg, &unread_rcpt),
                (&pending_msg, &pending_rcpt),
                (&expired_msg, &expired_rcpt),
            ],
            sent.iter(),
            now,
        );
        // The expired message is still unread even though its deadline passed.
        assert_eq!(stats.unread, 2);
        assert_eq!(stats.pending_response, 1);
        assert_eq!(stats.sent_today, 1);
    }
}
