//! ipwhois - country of an IP address over WHOIS
//!
//! This is the composition root that wires together all the components.

use ipwhois::adapters::inbound::LineFrontend;
use ipwhois::adapters::outbound::{DashMapCountryCache, TcpWhoisTransport, TransportConfig};
use ipwhois::application::{DelegationResolver, QueryDispatcher};
use ipwhois::config::load_config;
use ipwhois::infrastructure::{shutdown_signal, RateLimitConfig, RateLimiter, ShutdownController};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging; stdout is reserved for results
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        "starting ipwhois root={} rate={}/{}s cache_ttl={}s",
        cfg.root_host,
        cfg.rate_burst,
        cfg.rate_refill_secs,
        cfg.cache_ttl_secs
    );

    // ===== COMPOSITION ROOT =====

    let shutdown = ShutdownController::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    // 1. Outbound adapters
    let transport = Arc::new(TcpWhoisTransport::new(TransportConfig {
        connect_timeout: cfg.connect_timeout(),
        max_response_bytes: cfg.max_response_bytes,
    }));

    let cache = Arc::new(DashMapCountryCache::new(cfg.cache_ttl()));
    if let Some(interval) = cfg.cache_sweep_interval() {
        cache.start_sweep(interval, shutdown.token());
    }

    // 2. Application services
    let resolver = Arc::new(DelegationResolver::new(transport, cfg.max_hops));
    let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        burst_size: cfg.rate_burst,
        refill_interval: cfg.rate_refill_interval(),
    }));
    let dispatcher = Arc::new(QueryDispatcher::new(
        resolver,
        cache,
        limiter,
        cfg.root_host.clone(),
        shutdown.clone(),
    ));

    let (tx, rx) = mpsc::unbounded_channel();
    let server = tokio::spawn(dispatcher.clone().serve(rx));

    // 3. Inbound adapter
    let frontend = LineFrontend::new(tx, cfg.request_timeout());
    frontend
        .run(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            shutdown.token(),
        )
        .await?;

    tracing::info!(
        "input closed, {} resolutions still in flight",
        dispatcher.in_flight()
    );
    shutdown.shutdown();
    server.await?;
    shutdown.wait_for_drain(Duration::from_secs(5)).await;

    Ok(())
}
