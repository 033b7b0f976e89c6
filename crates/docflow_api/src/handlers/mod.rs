pub mod documents;
pub mod messages;
pub mod submissions;

pub async fn health_check() -> &'static str {
    "ok"
}
