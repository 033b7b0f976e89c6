use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use docflow_api::routes::app_router;
use docflow_api::AppState;
use docflow_db::PgStore;
use docflow_service::WorkflowService;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let listen_addr =
        std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        svc: WorkflowService::new(PgStore::new(pool)),
    };
    let app = app_router(state);

    let listener = TcpListener::bind(&listen_addr).await.unwrap();
    tracing::info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
}
