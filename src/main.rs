use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use extraction_gateway::{
    config::Config,
    api::routes::create_router,
    firecrawl::FirecrawlClient,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,extraction_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let server_addr = config.server_addr;
    tracing::info!(provider = %config.firecrawl_api_url, "Configuration loaded");

    let extractor = FirecrawlClient::from_config(&config)?;

    let app_state = AppState {
        config: Arc::new(config),
        extractor: Arc::new(extractor),
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    tracing::info!("Listening on {}", server_addr);
    tracing::info!("API docs: http://{}/apidocs", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
