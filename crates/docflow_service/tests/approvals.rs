mod common;

use common::{doc_params, seed_user, service};
use docflow_core::models::document::DocumentStatus;
use docflow_core::models::signature::SignatureType;
use docflow_core::models::user::Role;
use docflow_core::Error;

#[tokio::test]
async fn lifecycle_submit_review_approve_locks_the_document() {
    let (svc, store) = service();
    let staff = seed_user(&store, Role::Staff, "Radiology");
    let hod = seed_user(&store, Role::Hod, "Radiology");

    let doc = svc
        .create_document(staff.id, doc_params("Radiology", vec![hod.id]))
        .await
        .unwrap();
    let doc = svc.submit_document(staff.id, doc.id, None).await.unwrap();
    assert_eq!(doc.status, DocumentStatus::Submitted);

    let doc = svc.start_review(hod.id, doc.id, None).await.unwrap();
    assert_eq!(doc.status, DocumentStatus::UnderReview);

    let doc = svc
        .approve_document(hod.id, doc.id, Some("approved for circulation"), None)
        .await
        .unwrap();
    assert_eq!(doc.status, DocumentStatus::Approved);
    assert!(doc.is_locked);

    // Lock implies an effective approval signature in the ledger.
    let stored = svc.get_document(doc.id).await.unwrap();
    assert!(stored
        .signatures
        .iter()
        .any(|s| s.valid && s.signature_type == SignatureType::Approval));

    // Transitions were audited.
    let actions: Vec<String> = store
        .audit_entries()
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert!(actions.contains(&"document.submit".to_string()));
    assert!(actions.contains(&"document.approve".to_string()));
}

#[tokio::test]
async fn concurrent_approvals_one_wins_one_fails() {
    let (svc, store) = service();
    let staff = seed_user(&store, Role::Staff, "Radiology");
    let hod = seed_user(&store, Role::Hod, "Radiology");
    let cmd = seed_user(&store, Role::Cmd, "Administration");

    let doc = svc
        .create_document(staff.id, doc_params("Radiology", vec![hod.id]))
        .await
        .unwrap();
    svc.submit_document(staff.id, doc.id, None).await.unwrap();
    let doc = svc.start_review(hod.id, doc.id, None).await.unwrap();

    // Both approvers read the same revision before acting.
    let seen_revision = svc.get_document(doc.id).await.unwrap().revision;

    svc.approve_document(hod.id, doc.id, None, Some(seen_revision))
        .await
        .unwrap();
    let err = svc
        .approve_document(cmd.id, doc.id, None, Some(seen_revision))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConcurrentModification(_)));

    // Exactly one effective transition: approved once, locked once.
    let stored = svc.get_document(doc.id).await.unwrap();
    assert_eq!(stored.status, DocumentStatus::Approved);
    assert_eq!(stored.signatures.len(), 1);
}

#[tokio::test]
async fn rejection_without_feedback_is_a_validation_error() {
    let (svc, store) = service();
    let staff = seed_user(&store, Role::Staff, "Pharmacy");
    let hod = seed_user(&store, Role::Hod, "Pharmacy");

    let doc = svc
        .create_document(staff.id, doc_params("Pharmacy", vec![hod.id]))
        .await
        .unwrap();
    svc.submit_document(staff.id, doc.id, None).await.unwrap();
    svc.start_review(hod.id, doc.id, None).await.unwrap();

    let err = svc
        .sign_document(hod.id, doc.id, SignatureType::Rejection, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    // With feedback the rejection goes through and does not lock.
    svc.sign_document(hod.id, doc.id, SignatureType::Rejection, Some("wrong quarter"), None)
        .await
        .unwrap();
    let stored = svc.get_document(doc.id).await.unwrap();
    assert_eq!(stored.status, DocumentStatus::Rejected);
    assert!(!stored.is_locked);
}

#[tokio::test]
async fn signing_locked_document_needs_super_admin() {
    let (svc, store) = service();
    let staff = seed_user(&store, Role::Staff, "Radiology");
    let hod = seed_user(&store, Role::Hod, "Radiology");
    let cmd = seed_user(&store, Role::Cmd, "Administration");
    let root = seed_user(&store, Role::SuperAdmin, "ICT");

    let doc = svc
        .create_document(staff.id, doc_params("Radiology", vec![hod.id]))
        .await
        .unwrap();
    svc.submit_document(staff.id, doc.id, None).await.unwrap();
    svc.start_review(hod.id, doc.id, None).await.unwrap();
    svc.approve_document(hod.id, doc.id, None, None).await.unwrap();

    let err = svc
        .sign_document(cmd.id, doc.id, SignatureType::Approval, None, None)
        .await
        .unwrap_err();
    assert_eq!(err, Error::DocumentLocked);

    // Acknowledgment stays available on the locked document.
    svc.sign_document(root.id, doc.id, SignatureType::Acknowledgment, Some("filed"), None)
        .await
        .unwrap();
    let stored = svc.get_document(doc.id).await.unwrap();
    assert_eq!(stored.status, DocumentStatus::Approved);
}

#[tokio::test]
async fn resubmission_after_rejection_preserves_history() {
    let (svc, store) = service();
    let staff = seed_user(&store, Role::Staff, "Radiology");
    let hod = seed_user(&store, Role::Hod, "Radiology");

    let doc = svc
        .create_document(staff.id, doc_params("Radiology", vec![hod.id]))
        .await
        .unwrap();
    svc.submit_document(staff.id, doc.id, None).await.unwrap();
    svc.start_review(hod.id, doc.id, None).await.unwrap();
    svc.reject_document(hod.id, doc.id, "missing cover sheet", None)
        .await
        .unwrap();

    let doc = svc.resubmit_document(staff.id, doc.id, None).await.unwrap();
    assert_eq!(doc.status, DocumentStatus::Draft);
    assert_eq!(doc.version, 2);
    assert!(doc.find_version(1).is_some());

    // The resubmitted document can run the chain again.
    svc.submit_document(staff.id, doc.id, None).await.unwrap();
    svc.start_review(hod.id, doc.id, None).await.unwrap();
    let doc = svc.approve_document(hod.id, doc.id, None, None).await.unwrap();
    assert!(doc.is_locked);
}

#[tokio::test]
async fn deactivated_signer_invalidates_signatures_not_status() {
    let (svc, store) = service();
    let staff = seed_user(&store, Role::Staff, "Radiology");
    let hod = seed_user(&store, Role::Hod, "Radiology");
    let admin = seed_user(&store, Role::Admin, "ICT");

    let doc = svc
        .create_document(staff.id, doc_params("Radiology", vec![hod.id]))
        .await
        .unwrap();
    svc.submit_document(staff.id, doc.id, None).await.unwrap();
    svc.start_review(hod.id, doc.id, None).await.unwrap();
    let doc = svc.approve_document(hod.id, doc.id, None, None).await.unwrap();
    let sig_id = doc.signatures[0].id;
    assert!(svc.verify_signature(doc.id, sig_id).await.unwrap());

    let invalidated = svc
        .invalidate_signatures_for(admin.id, hod.id)
        .await
        .unwrap();
    assert_eq!(invalidated, 1);

    // Signature no longer verifies; document status is untouched.
    assert!(!svc.verify_signature(doc.id, sig_id).await.unwrap());
    let stored = svc.get_document(doc.id).await.unwrap();
    assert_eq!(stored.status, DocumentStatus::Approved);
    assert!(stored.is_locked);
}
