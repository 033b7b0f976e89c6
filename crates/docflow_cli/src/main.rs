use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

use docflow_cli::commands;
use docflow_cli::config::Config;

#[derive(Parser)]
#[command(name = "docflow")]
#[command(about = "Hospital document-workflow operations toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the database schema from embedded assets
    Rebuild(commands::rebuild::RebuildArgs),

    /// Create demo departments and users for local bring-up
    Seed(commands::seed::SeedArgs),

    /// Print a document's workflow state, chain, signatures, and history
    Inspect(commands::inspect::InspectArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let cli = Cli::parse();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    match cli.command {
        Commands::Rebuild(args) => commands::rebuild::execute(pool, args).await?,
        Commands::Seed(args) => commands::seed::execute(pool, args).await?,
        Commands::Inspect(args) => commands::inspect::execute(pool, args).await?,
    }

    Ok(())
}
