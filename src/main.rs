//! LRU TTL Cache - demonstration binary
//!
//! Builds a small cache, fills it past capacity, and prints its contents before
//! and after the first expiration sweep.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lru_ttl_cache::{Cache, CacheConfig, Entry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lru_ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: default_expiration={:?}, cleanup_interval={:?}, capacity={}",
        config.default_expiration, config.cleanup_interval, config.capacity
    );

    let cache = Cache::from_config(&config).context("failed to build cache")?;

    cache.add(1, "hello").await;
    cache.add(2, "world").await;
    cache.add(3, "how").await;
    cache.add(4, "are").await;
    cache.add(5, "you").await;
    cache.add_with_ttl(6, "ok", Duration::ZERO).await;

    info!("get(3) = {:?}", cache.get(&3).await);
    info!("get(4) = {:?}", cache.get(&4).await);
    print_snapshot(&cache).await?;

    let wait = config.cleanup_interval + Duration::from_secs(1);
    info!("Waiting {:?} for the expiration sweeper", wait);
    tokio::time::sleep(wait).await;

    print_snapshot(&cache).await?;
    Ok(())
}

async fn print_snapshot(cache: &Cache<i32, &'static str>) -> anyhow::Result<()> {
    let snapshot: BTreeMap<i32, Entry<i32, &str>> = cache.get_all().await.into_iter().collect();
    let json = serde_json::to_string_pretty(&snapshot).context("failed to encode snapshot")?;
    println!("{json}");
    Ok(())
}
