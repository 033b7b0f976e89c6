// Not every test binary touches every helper.
#![allow(dead_code)]

use uuid::Uuid;

use docflow_core::models::document::Priority;
use docflow_core::models::user::{Role, User};
use docflow_service::documents::CreateDocumentParams;
use docflow_service::{MemStore, WorkflowService};

pub fn service() -> (WorkflowService<MemStore>, MemStore) {
    let store = MemStore::new();
    (WorkflowService::new(store.clone()), store)
}

pub fn seed_user(store: &MemStore, role: Role, department: &str) -> User {
    let user = User {
        id: Uuid::new_v4(),
        email: format!("{}.{}@hospital.example", role.as_str(), department.to_lowercase()),
        first_name: "Amina".to_string(),
        last_name: "Yusuf".to_string(),
        role,
        department: department.to_string(),
        active: true,
    };
    store.insert_user(user.clone());
    user
}

pub fn seed_inactive_user(store: &MemStore, role: Role, department: &str) -> User {
    let mut user = seed_user(store, role, department);
    user.active = false;
    store.insert_user(user.clone());
    user
}

pub fn doc_params(department: &str, chain: Vec<Uuid>) -> CreateDocumentParams {
    CreateDocumentParams {
        name: "Oncall Rota Q2".to_string(),
        doc_type: "rota".to_string(),
        department: department.to_string(),
        file_url: Some("files/rota-q2.pdf".to_string()),
        tags: vec!["rota".to_string()],
        priority: Priority::Medium,
        approval_chain: chain,
        assigned_to: vec![],
    }
}
