use clap::Args;
use sqlx::PgPool;
use uuid::Uuid;

use docflow_core::models::user::{Role, User};
use docflow_db::PgStore;

#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Department the demo staff belong to
    #[arg(long, default_value = "Radiology")]
    pub department: String,
}

/// Minimal org chart for local bring-up: one of each oversight role plus a
/// small department.
pub async fn execute(pool: PgPool, args: SeedArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!("🌱 Seeding demo users...");

    let store = PgStore::new(pool);
    let roster = [
        (Role::SuperAdmin, "root", "ICT"),
        (Role::Admin, "admin", "ICT"),
        (Role::Cmd, "cmd", "Administration"),
        (Role::Hod, "hod", args.department.as_str()),
        (Role::Staff, "staff1", args.department.as_str()),
        (Role::Staff, "staff2", args.department.as_str()),
        (Role::Staff, "staff3", args.department.as_str()),
    ];

    for (role, handle, department) in roster {
        let user = User {
            id: Uuid::new_v4(),
            email: format!("{handle}@hospital.example"),
            first_name: handle.to_string(),
            last_name: "Demo".to_string(),
            role,
            department: department.to_string(),
            active: true,
        };
        store.insert_user(&user).await?;
        println!(
            "   👤 {:<16} {:<28} {:<12} {}",
            user.full_name(),
            user.email,
            role.as_str(),
            department
        );
    }

    println!("✅ Seed complete.");
    Ok(())
}
