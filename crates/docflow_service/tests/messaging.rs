mod common;

use common::{seed_inactive_user, seed_user, service};
use docflow_core::models::message::{DeliveryState, MessagePriority};
use docflow_core::models::user::Role;
use docflow_core::Error;
use docflow_service::messaging::MessageParams;
use docflow_service::Store;

fn params(subject: &str) -> MessageParams {
    MessageParams {
        subject: subject.to_string(),
        body: "Please action before the ward round.".to_string(),
        priority: MessagePriority::Normal,
        requires_response: false,
        response_deadline: None,
    }
}

#[tokio::test]
async fn broadcast_creates_one_recipient_per_active_member() {
    let (svc, store) = service();
    let hod = seed_user(&store, Role::Hod, "Radiology");
    let a = seed_user(&store, Role::Staff, "Radiology");
    let b = seed_user(&store, Role::Staff, "Radiology");
    let c = seed_user(&store, Role::Staff, "Radiology");
    // Neither the sender, an inactive member, nor another department counts.
    seed_inactive_user(&store, Role::Staff, "Radiology");
    seed_user(&store, Role::Staff, "Pharmacy");

    let (message, fanned_out) = svc
        .send_broadcast(hod.id, "Radiology", params("CT scanner downtime"))
        .await
        .unwrap();
    assert_eq!(fanned_out, 3);
    assert!(message.is_broadcast());

    for user in [&a, &b, &c] {
        let inbox = svc.store.inbox(user.id).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].1.state, DeliveryState::Sent);
    }
}

#[tokio::test]
async fn recipients_progress_independently() {
    let (svc, store) = service();
    let hod = seed_user(&store, Role::Hod, "Radiology");
    let a = seed_user(&store, Role::Staff, "Radiology");
    let b = seed_user(&store, Role::Staff, "Radiology");

    let (message, _) = svc
        .send_broadcast(hod.id, "Radiology", params("New consent forms"))
        .await
        .unwrap();

    svc.mark_read(a.id, message.id).await.unwrap();
    let a_state = svc.store.get_recipient(message.id, a.id).await.unwrap();
    let b_state = svc.store.get_recipient(message.id, b.id).await.unwrap();
    assert_eq!(a_state.state, DeliveryState::Read);
    assert_eq!(b_state.state, DeliveryState::Sent);
}

#[tokio::test]
async fn acknowledge_from_sent_promotes_through_read() {
    let (svc, store) = service();
    let hod = seed_user(&store, Role::Hod, "Radiology");
    let staff = seed_user(&store, Role::Staff, "Radiology");

    let (message, _) = svc
        .send_broadcast(hod.id, "Radiology", params("Fire drill"))
        .await
        .unwrap();

    let r = svc.acknowledge(staff.id, message.id).await.unwrap();
    assert_eq!(r.state, DeliveryState::Acknowledged);
    assert!(r.read_at.is_some());
    assert!(r.acknowledged_at.is_some());

    // Monotonic: no path back to read.
    let err = svc.mark_read(staff.id, message.id).await.unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn direct_message_tracks_a_single_recipient() {
    let (svc, store) = service();
    let hod = seed_user(&store, Role::Hod, "Radiology");
    let cmd = seed_user(&store, Role::Cmd, "Administration");

    let message = svc
        .send_direct(hod.id, cmd.id, params("Budget variance"))
        .await
        .unwrap();
    assert!(!message.is_broadcast());

    svc.mark_read(cmd.id, message.id).await.unwrap();
    let r = svc.acknowledge(cmd.id, message.id).await.unwrap();
    assert_eq!(r.state, DeliveryState::Acknowledged);

    // Non-recipients have no tracking row to act on.
    let outsider = seed_user(&store, Role::Staff, "Pharmacy");
    let err = svc.mark_read(outsider.id, message.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn stats_reflect_inbox_and_sent_counts() {
    let (svc, store) = service();
    let hod = seed_user(&store, Role::Hod, "Radiology");
    let staff = seed_user(&store, Role::Staff, "Radiology");

    let mut needs_reply = params("Roster confirmation");
    needs_reply.requires_response = true;
    svc.send_direct(hod.id, staff.id, needs_reply).await.unwrap();
    svc.send_direct(hod.id, staff.id, params("FYI: parking closure"))
        .await
        .unwrap();

    let stats = svc.message_stats(staff.id).await.unwrap();
    assert_eq!(stats.unread, 2);
    assert_eq!(stats.pending_response, 1);
    assert_eq!(stats.sent_today, 0);

    let sender_stats = svc.message_stats(hod.id).await.unwrap();
    assert_eq!(sender_stats.sent_today, 2);
}

#[tokio::test]
async fn messages_to_deactivated_users_are_refused() {
    let (svc, store) = service();
    let hod = seed_user(&store, Role::Hod, "Radiology");
    let gone = seed_inactive_user(&store, Role::Staff, "Radiology");

    let err = svc
        .send_direct(hod.id, gone.id, params("Exit checklist"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
