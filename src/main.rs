//! Payment gateway service entry point.

use std::sync::Arc;

use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing_subscriber::EnvFilter;

use payment_gateway_client::adapters::gateway::{GatewayClient, ReqwestTransport};
use payment_gateway_client::adapters::http::payment::{payment_router, PaymentAppState};
use payment_gateway_client::adapters::store::{InMemoryTransactionStore, PostgresTransactionStore};
use payment_gateway_client::application::TransactionRecorder;
use payment_gateway_client::config::{AppConfig, ServerConfig};
use payment_gateway_client::ports::TransactionStore;

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    if server.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.server);

    let store: Arc<dyn TransactionStore> = match &config.database {
        Some(database) => {
            let pool = database.pool_options().connect(&database.url).await?;
            tracing::info!("Using PostgreSQL transaction store");
            Arc::new(PostgresTransactionStore::new(pool))
        }
        None => {
            tracing::warn!("No database configured; transactions are kept in memory");
            Arc::new(InMemoryTransactionStore::new())
        }
    };

    let gateway_config = &config.gateway;
    if !gateway_config.is_configured() {
        tracing::warn!("Gateway merchant id or secret key missing; gateway calls are disabled");
    }

    let transport = ReqwestTransport::new(gateway_config.request_timeout())?;
    let gateway = GatewayClient::from_config(gateway_config, Arc::new(transport));
    tracing::info!(base_url = gateway.base_url(), "Gateway client ready");

    let state = PaymentAppState::new(
        Arc::new(gateway),
        Arc::new(TransactionRecorder::new(store)),
        Arc::new(gateway_config.webhook_verifier()),
    )
    .with_retry_budgets(
        gateway_config.initiate_max_retries,
        gateway_config.status_max_retries,
    );

    let app = payment_router().with_state(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::default())
            .on_response(DefaultOnResponse::new()),
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
