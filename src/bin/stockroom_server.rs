//! stockroom-server: inventory REST API
//!
//! Serves the product inventory over HTTP backed by the configured
//! record store, with SNS low-stock alerting when enabled.
//!
//! ## Configuration
//!
//! Loaded from `config.yaml` (or the file named by STOCKROOM_CONFIG),
//! overridable via STOCKROOM__-prefixed environment variables:
//! - server.host / server.port: bind address (default 0.0.0.0:8080)
//! - storage.type: "memory" or "dynamo"
//! - storage.dynamo.table / region / endpoint_url
//! - storage.cache: wrap the remote store with a local fallback cache
//! - notifier.type: "noop" or "sns"
//! - notifier.sns.topic_arn / region / endpoint_url

use std::sync::Arc;

use tracing::{error, info};

use stockroom::bootstrap::init_tracing;
use stockroom::config::{Config, NotifierType};
use stockroom::http::server::serve;
use stockroom::inventory::InventoryService;
use stockroom::notify::{NoopNotifier, Notifier, SnsNotifier};
use stockroom::store::init_store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting stockroom-server");

    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    let store = init_store(&config.storage).await?;

    let notifier: Arc<dyn Notifier> = match config.notifier.notifier_type {
        NotifierType::Noop => {
            info!("Notifier: disabled");
            Arc::new(NoopNotifier)
        }
        NotifierType::Sns => Arc::new(SnsNotifier::new(&config.notifier.sns).await),
    };

    let service = Arc::new(InventoryService::new(store, notifier));

    serve(&config.server, service).await?;
    Ok(())
}
