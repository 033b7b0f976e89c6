use clap::Args;
use sqlx::PgPool;
use uuid::Uuid;

use docflow_db::PgStore;
use docflow_service::Store;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Document id to inspect
    #[arg(long)]
    pub id: Uuid,
}

pub async fn execute(pool: PgPool, args: InspectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = PgStore::new(pool);
    let doc = store.get_document(args.id).await?;

    println!("📄 {} ({})", doc.name, doc.doc_type);
    println!("   Department: {}", doc.department);
    println!(
        "   Status:     {}{}",
        doc.status.as_str(),
        if doc.is_locked { " 🔒" } else { "" }
    );
    println!("   Version:    {} (revision {})", doc.version, doc.revision);

    if doc.approval_chain.is_empty() {
        println!("   Chain:      (none)");
    } else {
        println!("   Chain:");
        for (i, approver) in doc.approval_chain.iter().enumerate() {
            let marker = if i == doc.chain_position { "→" } else { " " };
            println!("     {marker} {i}. {approver}");
        }
    }

    println!("   Signatures: {}", doc.signatures.len());
    for sig in &doc.signatures {
        println!(
            "     {} {} by {} at {}{}",
            sig.signature_type.as_str(),
            if sig.valid { "✓" } else { "✗ (invalid)" },
            sig.signer_id,
            sig.signed_at,
            sig.comment
                .as_deref()
                .map(|c| format!(" \"{c}\""))
                .unwrap_or_default()
        );
    }

    println!("   History:    {} snapshot(s)", doc.versions.len());
    for v in &doc.versions {
        println!("     v{} \"{}\" at {}", v.version, v.name, v.created_at);
    }

    Ok(())
}
