use serde_json::json;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mock_server::Workspace;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let token = std::env::var("NOTION_TOKEN").unwrap_or_else(|_| "secret_mock".to_string());

    let mut workspace = Workspace::new(token);
    workspace.insert_database("demo", "Demo");
    workspace.insert_page(
        json!({"database_id": "demo"}),
        json!({"Name": {"title": [{"text": {"content": "Welcome"}}]}}),
    );

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, base_url = %format!("http://{addr}/v1/"), "mock Notion API listening");
    mock_server::run(listener, workspace.into_db()).await
}
