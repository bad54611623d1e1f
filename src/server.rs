use crate::config::AppConfig;
use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Serve the generated dashboard directory. Static files only; the page has
/// no machine-readable API.
pub async fn start_server(config: AppConfig) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], config.server.port));

    println!("Starting server on http://{}", addr);

    let app = Router::new()
        .fallback_service(ServeDir::new(&config.output.dir))
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
