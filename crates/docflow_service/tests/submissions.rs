mod common;

use common::{doc_params, seed_user, service};
use docflow_core::models::submission::{SubmissionStatus, SubmissionType};
use docflow_core::models::user::Role;
use docflow_core::workflow::routing::SubmissionDecision;
use docflow_core::Error;

#[tokio::test]
async fn staff_submits_to_hod_in_same_department() {
    let (svc, store) = service();
    let staff = seed_user(&store, Role::Staff, "Radiology");
    let hod = seed_user(&store, Role::Hod, "Radiology");

    let doc = svc
        .create_document(staff.id, doc_params("Radiology", vec![hod.id]))
        .await
        .unwrap();
    let sub = svc
        .create_submission(staff.id, doc.id, hod.id, SubmissionType::StaffToHod)
        .await
        .unwrap();
    assert_eq!(sub.status, SubmissionStatus::Pending);

    // Approval with no feedback is allowed.
    let sub = svc
        .review_submission(hod.id, sub.id, SubmissionDecision::Approve, None, None)
        .await
        .unwrap();
    assert_eq!(sub.status, SubmissionStatus::Approved);
    assert!(sub.reviewed_at.is_some());
}

#[tokio::test]
async fn cross_department_staff_submission_is_rejected() {
    let (svc, store) = service();
    let staff = seed_user(&store, Role::Staff, "Radiology");
    let hod_pharmacy = seed_user(&store, Role::Hod, "Pharmacy");

    let doc = svc
        .create_document(staff.id, doc_params("Radiology", vec![hod_pharmacy.id]))
        .await
        .unwrap();
    let err = svc
        .create_submission(staff.id, doc.id, hod_pharmacy.id, SubmissionType::StaffToHod)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRoute(_)));
}

#[tokio::test]
async fn role_mismatch_is_an_invalid_route() {
    let (svc, store) = service();
    let staff = seed_user(&store, Role::Staff, "Radiology");
    let other_staff = seed_user(&store, Role::Staff, "Radiology");

    let doc = svc
        .create_document(staff.id, doc_params("Radiology", vec![other_staff.id]))
        .await
        .unwrap();
    let err = svc
        .create_submission(staff.id, doc.id, other_staff.id, SubmissionType::StaffToHod)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRoute(_)));
}

#[tokio::test]
async fn hod_routes_cross_department_to_hod_and_cmd() {
    let (svc, store) = service();
    let hod_a = seed_user(&store, Role::Hod, "Radiology");
    let hod_b = seed_user(&store, Role::Hod, "Pharmacy");
    let cmd = seed_user(&store, Role::Cmd, "Administration");

    let doc = svc
        .create_document(hod_a.id, doc_params("Radiology", vec![cmd.id]))
        .await
        .unwrap();
    svc.create_submission(hod_a.id, doc.id, hod_b.id, SubmissionType::HodToHod)
        .await
        .unwrap();
    svc.create_submission(hod_a.id, doc.id, cmd.id, SubmissionType::HodToCmd)
        .await
        .unwrap();
}

#[tokio::test]
async fn submission_reviews_exactly_once() {
    let (svc, store) = service();
    let staff = seed_user(&store, Role::Staff, "Radiology");
    let hod = seed_user(&store, Role::Hod, "Radiology");

    let doc = svc
        .create_document(staff.id, doc_params("Radiology", vec![hod.id]))
        .await
        .unwrap();
    let sub = svc
        .create_submission(staff.id, doc.id, hod.id, SubmissionType::StaffToHod)
        .await
        .unwrap();

    svc.review_submission(hod.id, sub.id, SubmissionDecision::RequestRevision, Some("resend with appendix"), None)
        .await
        .unwrap();
    let err = svc
        .review_submission(hod.id, sub.id, SubmissionDecision::Approve, None, None)
        .await
        .unwrap_err();
    assert_eq!(err, Error::AlreadyReviewed);
}

#[tokio::test]
async fn concurrent_reviews_have_one_winner() {
    let (svc, store) = service();
    let staff = seed_user(&store, Role::Staff, "Radiology");
    let hod = seed_user(&store, Role::Hod, "Radiology");
    let cmd = seed_user(&store, Role::Cmd, "Administration");

    let doc = svc
        .create_document(staff.id, doc_params("Radiology", vec![hod.id]))
        .await
        .unwrap();
    let sub = svc
        .create_submission(staff.id, doc.id, hod.id, SubmissionType::StaffToHod)
        .await
        .unwrap();

    // Recipient and CMD both read the pending submission at revision 0.
    let seen = sub.revision;
    svc.review_submission(hod.id, sub.id, SubmissionDecision::Approve, None, Some(seen))
        .await
        .unwrap();
    let err = svc
        .review_submission(cmd.id, sub.id, SubmissionDecision::Reject, None, Some(seen))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::ConcurrentModification(_) | Error::AlreadyReviewed
    ));

    let stored = svc.get_submission(sub.id).await.unwrap();
    assert_eq!(stored.status, SubmissionStatus::Approved);
}

#[tokio::test]
async fn only_recipient_or_oversight_roles_review() {
    let (svc, store) = service();
    let staff = seed_user(&store, Role::Staff, "Radiology");
    let hod = seed_user(&store, Role::Hod, "Radiology");
    let bystander = seed_user(&store, Role::Staff, "Radiology");

    let doc = svc
        .create_document(staff.id, doc_params("Radiology", vec![hod.id]))
        .await
        .unwrap();
    let sub = svc
        .create_submission(staff.id, doc.id, hod.id, SubmissionType::StaffToHod)
        .await
        .unwrap();

    let err = svc
        .review_submission(bystander.id, sub.id, SubmissionDecision::Approve, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
}
