use clap::Args;
use docflow_db::schema::rebuild_database;
use sqlx::{Executor, PgPool};

#[derive(Debug, Args)]
pub struct RebuildArgs {
    /// DANGER: Drop the whole public schema before rebuilding?
    #[arg(long)]
    pub reset: bool,
}

pub async fn execute(pool: PgPool, args: RebuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!("🏗️  Rebuilding Database Schema...");

    if args.reset {
        println!("🔥 Reset requested. Dropping public schema...");
        // Raw string goes over the simple protocol, which allows the two
        // statements in one round trip.
        pool.execute("DROP SCHEMA public CASCADE; CREATE SCHEMA public;")
            .await?;
    }

    rebuild_database(&pool).await?;

    println!("✅ Database Schema Applied Successfully.");
    Ok(())
}
