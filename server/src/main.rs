use std::{sync::Arc, time::Duration};

use github_stats_card::{
    aggregate::DEFAULT_LANGUAGE_CONCURRENCY,
    cache::MemoryCache,
    cards::{CardService, DEFAULT_UPSTREAM_TIMEOUT},
    entrypoints,
};
use shared::github::GithubClient;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

#[derive(serde::Deserialize)]
pub struct Env {
    github_token: Option<String>,
    upstream_timeout_secs: Option<u64>,
    language_fetch_concurrency: Option<usize>,
    cache_capacity: Option<u64>,
}

fn card_service(env: Env) -> anyhow::Result<CardService> {
    if env.github_token.is_none() {
        tracing::warn!("GITHUB_TOKEN is not set, talking to GitHub anonymously");
    }
    let github = GithubClient::new(env.github_token)?;
    let cache = MemoryCache::new(env.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY));
    let upstream_timeout = env
        .upstream_timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT);

    Ok(CardService::new(Arc::new(github), Arc::new(cache))
        .with_upstream_timeout(upstream_timeout)
        .with_language_concurrency(
            env.language_fetch_concurrency
                .unwrap_or(DEFAULT_LANGUAGE_CONCURRENCY),
        ))
}

#[rocket::launch]
async fn rocket() -> _ {
    dotenv::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let env = envy::from_env::<Env>().expect("Failed to load environment variables");
    let cards = card_service(env).expect("Failed to set up card service");

    rocket::build()
        .manage(cards)
        .attach(entrypoints::stage())
}
