//! Node Detail Service - serves published content nodes with their card paragraphs.

mod api;
mod config;
mod entity;
mod file_url;
mod service;
mod store;

use anyhow::Context;
use api::AppState;
use config::{ContentBackend, Settings};
use file_url::StreamWrapperUrlGenerator;
use service::NodeDetailService;
use std::sync::Arc;
use store::memory::InMemoryRepository;
use store::rest::RestRepository;
use store::EntityRepository;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "node_detail_service=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    let repo: Arc<dyn EntityRepository> = match &settings.backend {
        ContentBackend::Fixtures { dir } => {
            let repo = InMemoryRepository::load_from_dir(dir)?;
            info!("Loaded {} nodes from {:?}", repo.node_count(), dir);
            Arc::new(repo)
        }
        ContentBackend::Rest { base_url, token } => {
            info!("Using content API at {}", base_url);
            Arc::new(RestRepository::new(base_url, token.clone())?)
        }
    };

    let urls = StreamWrapperUrlGenerator::new(&settings.site_base_url)
        .context("SITE_BASE_URL is invalid")?
        .with_public_path(settings.public_files_path.as_str());

    let state = AppState {
        service: Arc::new(NodeDetailService::new(repo, Arc::new(urls))),
    };
    let app = api::router(state);

    // Run server
    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    info!("Server listening on http://{}", settings.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
