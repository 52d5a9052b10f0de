//! HTTP ingress server.
//!
//! Encoders `POST` segments and playlists to any path; only the last path
//! component is looked at. Every accepted ingress request is answered `200 OK`
//! with an empty body, whatever happened; only oversized bodies get `413`.
//! Failures are logged here and nowhere else.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{StatusCode, Uri};
use axum::routing::{get, post};
use axum::Router;
use castconf::CastConfig;
use swarmchunk::{LocalSigner, Signer, Topic};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::bee::{BeeClient, StorageApi};
use crate::feed_index::{resolve_start_index, FeedCounter};
use crate::manifest::Rewriter;
use crate::publisher::FeedPublisher;
use crate::relay::{Ingress, Outcome, Relay, RelayHandle};
use crate::segments::SegmentCache;

/// Shared state for the ingress and health handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: RelayHandle,
    pub playlist_marker: Arc<str>,
    pub owner: String,
    pub topic: String,
    pub start_time: Instant,
}

/// Health check endpoint
pub async fn handle_health(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let uptime = state.start_time.elapsed();
    maintain_cache(&state, "health");

    axum::Json(serde_json::json!({
        "status": "healthy",
        "uptime_secs": uptime.as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
        "feed": {
            "owner": state.owner,
            "topic": state.topic,
            "next_index": state.relay.next_index(),
        },
        "cached_segments": state.relay.cached_segments(),
    }))
}

fn maintain_cache(state: &AppState, after: &str) {
    let evicted = state.relay.maintain_cache();
    if evicted > 0 {
        debug!(evicted, after, "segment cache maintained");
    }
}

/// Ingress endpoint for segments and playlists.
///
/// Bodies over the limit are refused with the extractor's status; they never
/// reach the relay, so the cache is maintained here instead.
pub async fn handle_ingress(
    State(state): State<AppState>,
    uri: Uri,
    body: std::result::Result<Bytes, BytesRejection>,
) -> StatusCode {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            error!(path = %uri.path(), "refused body: {}", rejection);
            maintain_cache(&state, "rejection");
            return rejection.status();
        }
    };

    let ingress = Ingress::classify(uri.path(), body, &state.playlist_marker);
    let name = ingress.name().to_string();

    match state.relay.submit(ingress).await {
        Ok(Outcome::Cached { .. }) => {}
        Ok(Outcome::Published(update)) => {
            info!(
                index = update.index,
                manifest = %update.manifest,
                reference = %update.reference,
                "published {}", name
            );
        }
        Err(e) => error!(request = %name, "error: {}", e),
    }

    StatusCode::OK
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handle_health).post(handle_ingress))
        .route("/", post(handle_ingress))
        .route("/{*path}", post(handle_ingress))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Everything the relay needs, wired from configuration.
pub struct Service {
    pub relay: Relay,
    pub owner: String,
    pub topic: Topic,
    pub start_index: u64,
}

/// Build the relay from configuration, resolving the start index against Bee.
///
/// Fails on anything that should stop the process before it serves: a bad
/// key, an unusable Bee URL, or a feed lookup error other than not-found.
pub async fn build_service(config: &CastConfig) -> Result<Service> {
    config.validate()?;

    let signer = Arc::new(LocalSigner::from_hex(&config.feed.private_key).context("Invalid private key")?);
    let owner = signer.address();
    let topic = Topic::from_name(&config.feed.topic);

    let bee = BeeClient::new(
        &config.infra.bee.api_url,
        &config.feed.batch_id,
        config.infra.bee.timeout(),
    )
    .context("Failed to build Bee client")?;
    let storage: Arc<dyn StorageApi> = Arc::new(bee);

    let start_index = resolve_start_index(storage.as_ref(), &owner, &topic)
        .await
        .context("Failed to look up the feed's latest index")?;

    let publisher = FeedPublisher::new(Arc::clone(&storage), signer, topic);
    let relay = Relay::new(
        storage,
        publisher,
        Rewriter::new(config.relay.segment_marker.clone()),
        Arc::new(SegmentCache::new(config.relay.segment_retention())),
        Arc::new(FeedCounter::new(start_index)),
    );

    Ok(Service {
        relay,
        owner: owner.to_string(),
        topic,
        start_index,
    })
}

/// Run the ingress relay until SIGINT/SIGTERM.
pub async fn run(config: CastConfig) -> Result<()> {
    info!("📡 swarmcast relay starting");
    info!("   Bee: {}", config.infra.bee.api_url);

    let service = build_service(&config).await?;
    info!("   Topic: {} ({})", config.feed.topic, service.topic);
    info!("   Owner: {}", service.owner);
    info!("   Start index: {}", service.start_index);

    let (relay, relay_task) = service.relay.spawn(config.relay.queue_depth);

    let state = AppState {
        relay,
        playlist_marker: Arc::from(config.relay.playlist_marker.as_str()),
        owner: service.owner,
        topic: service.topic.to_hex(),
        start_time: Instant::now(),
    };
    let app = router(state, config.relay.max_body_bytes);

    let addr = config.infra.bind.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("📡 swarmcast ready!");
    info!("   Ingress: POST http://{}/<name>", addr);
    info!("   Health: GET http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // The router held the last relay handles, so the queue drains and closes
    if let Err(e) = relay_task.await {
        error!("relay task ended abnormally: {}", e);
    }

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down...");
        }
        _ = terminate() => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
