use std::sync::Arc;

use clap::Parser;
use lampadaire_import::{ImportError, ImportPipeline, ServiceConfig, SupabaseClient, serve};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ImportError> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lampadaire_import=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::parse();
    info!(
        "UTM zone {}{}, batch size {}",
        config.utm_zone,
        if config.utm_south { "S" } else { "N" },
        config.batch_size
    );

    let pipeline = ImportPipeline::new(SupabaseClient::from_config(&config))
        .with_config(config.import_config());

    serve(&config.bind, Arc::new(pipeline)).await
}
