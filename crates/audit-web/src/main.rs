//! Audit Pro web server: dashboard, regulation search/audit editor, settings.

use audit_gateway::HttpGateway;
use audit_view::{AuditSession, ViewConfig};
use audit_web::server::{self, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ViewConfig::from_env()?;
    let gateway = Arc::new(HttpGateway::new(config.api_url.clone()));
    tracing::info!(api = %gateway.base_url(), "using audit backend");
    let session = AuditSession::start(gateway, &config).await;

    let app = server::router(Arc::new(AppState { session }));
    let addr: SocketAddr = std::env::var("AUDIT_LISTEN")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()?;
    tracing::info!("Audit Pro listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        app.into_make_service(),
    )
    .await?;
    Ok(())
}
