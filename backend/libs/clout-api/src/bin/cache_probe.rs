/// Cache probe: warms a cache session for one account and reports what it holds
///
/// Usage:
/// ```bash
/// cargo run --bin cache-probe -- <PUBLIC_KEY> [--refresh]
/// ```
///
/// Environment:
/// - `CLOUT_NODE_URL`, `CLOUT_FEED_API_URL`, `CLOUT_CACHE_*_TTL_SECS`: see `ApiConfig`
/// - `CLOUT_JWT`: pre-issued token used for saved posts (skipped when unset)
/// - `LOG_FORMAT=json`: structured log output
use anyhow::{bail, Context, Result};
use clout_api::{session_manager, ApiConfig, NoTokenSigner, StaticTokenSigner, TokenSigner};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
struct ProbeArgs {
    public_key: String,
    refresh: bool,
}

fn parse_args() -> Result<ProbeArgs> {
    let mut public_key = None;
    let mut refresh = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--refresh" => refresh = true,
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            key => public_key = Some(key.to_string()),
        }
    }

    Ok(ProbeArgs {
        public_key: public_key.context("Usage: cache-probe <PUBLIC_KEY> [--refresh]")?,
        refresh,
    })
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = parse_args()?;
    let config = ApiConfig::from_env().context("Failed to load API configuration")?;
    info!(node_url = %config.node_url, feed_api_url = %config.feed_api_url, "Starting cache probe");

    let token = std::env::var("CLOUT_JWT").ok();
    let has_token = token.is_some();
    let signer: Arc<dyn TokenSigner> = match token {
        Some(token) => Arc::new(StaticTokenSigner::new(token)),
        None => Arc::new(NoTokenSigner),
    };

    let manager = session_manager(&config, signer).context("Failed to build API client")?;
    let session = manager.create_session(&args.public_key);

    let user = session
        .user
        .get_data(args.refresh)
        .await
        .context("Failed to load user")?;
    info!(
        public_key = %user.public_key_base58_check,
        username = user.username().unwrap_or("<no profile>"),
        following = user.public_keys_base58_check_followed_by_user.len(),
        balance_nanos = user.balance_nanos,
        "User loaded"
    );

    match session.exchange_rate.get_data(args.refresh).await {
        Ok(rate) => info!(
            usd_per_coin = rate.usd_per_coin(),
            balance_usd = rate.nanos_to_usd(user.balance_nanos),
            "Exchange rate loaded"
        ),
        Err(e) => warn!(error = %e, "Exchange rate unavailable"),
    }

    match session.pinned_post.get_data(args.refresh).await {
        Ok(pinned) => info!(post_hash_hex = ?pinned.as_deref(), "Pinned post loaded"),
        Err(e) => warn!(error = %e, "Pinned post unavailable"),
    }

    if has_token {
        let saved = session
            .saved_posts
            .reload_data()
            .await
            .context("Failed to load saved posts")?;
        info!(count = saved.len(), "Saved posts loaded");
    } else {
        info!("CLOUT_JWT not set, skipping saved posts");
    }

    manager.destroy_session();
    Ok(())
}
