use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

use docflow_core::models::message::{
    message_stats, InterDepartmentMessage, MessageAddress, MessagePriority, MessageRecipient,
    MessageStats,
};
use docflow_core::{Error, Result};

use crate::{Store, WorkflowService};

#[derive(Debug, Clone)]
pub struct MessageParams {
    pub subject: String,
    pub body: String,
    pub priority: MessagePriority,
    pub requires_response: bool,
    pub response_deadline: Option<OffsetDateTime>,
}

impl MessageParams {
    fn validate(&self) -> Result<()> {
        if self.subject.trim().is_empty() {
            return Err(Error::Validation("message subject is required".to_string()));
        }
        Ok(())
    }
}

impl<S: Store> WorkflowService<S> {
    /// One recipient, one tracking row.
    pub async fn send_direct(
        &self,
        actor_id: Uuid,
        to_user: Uuid,
        params: MessageParams,
    ) -> Result<InterDepartmentMessage> {
        params.validate()?;
        let from = self.actor(actor_id).await?;
        let to = self.store.get_user(to_user).await?;
        if !to.active {
            return Err(Error::Validation(format!(
                "recipient {} is deactivated",
                to.id
            )));
        }

        let message = self.build_message(&from.id, MessageAddress::User(to.id), params);
        let recipients = [MessageRecipient::new(message.id, to.id)];
        self.store.create_message(&message, &recipients).await?;
        self.record_audit(
            from.id,
            "message.send_direct",
            "message",
            message.id,
            json!({ "to": to.id }),
        )
        .await;
        Ok(message)
    }

    /// One row per active department member, sender excluded. Each recipient
    /// reads and acknowledges independently.
    pub async fn send_broadcast(
        &self,
        actor_id: Uuid,
        department: &str,
        params: MessageParams,
    ) -> Result<(InterDepartmentMessage, usize)> {
        params.validate()?;
        let from = self.actor(actor_id).await?;
        let members = self.store.users_by_department(department).await?;

        let message = self.build_message(
            &from.id,
            MessageAddress::Department(department.to_string()),
            params,
        );
        let recipients: Vec<MessageRecipient> = members
            .iter()
            .filter(|u| u.active && u.id != from.id)
            .map(|u| MessageRecipient::new(message.id, u.id))
            .collect();

        self.store.create_message(&message, &recipients).await?;
        self.record_audit(
            from.id,
            "message.send_broadcast",
            "message",
            message.id,
            json!({ "department": department, "recipients": recipients.len() }),
        )
        .await;
        Ok((message, recipients.len()))
    }

    pub async fn mark_read(&self, actor_id: Uuid, message_id: Uuid) -> Result<MessageRecipient> {
        let actor = self.actor(actor_id).await?;
        let mut recipient = self.store.get_recipient(message_id, actor.id).await?;
        recipient.mark_read(self.now())?;
        self.store.save_recipient(&recipient).await?;
        Ok(recipient)
    }

    pub async fn acknowledge(&self, actor_id: Uuid, message_id: Uuid) -> Result<MessageRecipient> {
        let actor = self.actor(actor_id).await?;
        let mut recipient = self.store.get_recipient(message_id, actor.id).await?;
        recipient.acknowledge(self.now())?;
        self.store.save_recipient(&recipient).await?;
        self.record_audit(
            actor.id,
            "message.acknowledge",
            "message",
            message_id,
            json!({}),
        )
        .await;
        Ok(recipient)
    }

    /// Dashboard counters; read-side only.
    pub async fn message_stats(&self, user_id: Uuid) -> Result<MessageStats> {
        let inbox = self.store.inbox(user_id).await?;
        let sent = self.store.sent_by(user_id).await?;
        let pairs = inbox.iter().map(|(m, r)| (m, r));
        Ok(message_stats(pairs, sent.iter(), self.now()))
    }

    fn build_message(
        &self,
        from: &Uuid,
        to: MessageAddress,
        params: MessageParams,
    ) -> InterDepartmentMessage {
        InterDepartmentMessage {
            id: Uuid::new_v4(),
            from_user: *from,
            to,
            subject: params.subject,
            body: params.body,
            priority: params.priority,
            requires_response: params.requires_response,
            response_deadline: params.response_deadline,
            sent_at: self.now(),
        }
    }
}
