use std::{sync::Arc, time::Duration};

use rocket::tokio::time::timeout;
use shared::github::GithubApi;
use tracing::{debug, error, instrument};

use crate::{
    aggregate::{self, DEFAULT_LANGUAGE_CONCURRENCY},
    cache::{CacheKey, CardCache, CardKind, CARD_TTL},
    error::CardError,
    svg,
    theme::Theme,
};

pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Serves rendered cards from the cache, building and storing them on a miss.
pub struct CardService {
    github: Arc<dyn GithubApi>,
    cache: Arc<dyn CardCache>,
    upstream_timeout: Duration,
    language_concurrency: usize,
}

impl CardService {
    pub fn new(github: Arc<dyn GithubApi>, cache: Arc<dyn CardCache>) -> Self {
        Self {
            github,
            cache,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            language_concurrency: DEFAULT_LANGUAGE_CONCURRENCY,
        }
    }

    pub fn with_upstream_timeout(mut self, upstream_timeout: Duration) -> Self {
        self.upstream_timeout = upstream_timeout;
        self
    }

    pub fn with_language_concurrency(mut self, language_concurrency: usize) -> Self {
        self.language_concurrency = language_concurrency.max(1);
        self
    }

    /// Failed cards are returned as errors and never stored.
    #[instrument(skip(self))]
    pub async fn card(
        &self,
        kind: CardKind,
        username: &str,
        theme: Theme,
    ) -> Result<String, CardError> {
        if username.trim().is_empty() {
            return Err(CardError::MissingUsername);
        }
        if !shared::is_github_login(username) {
            return Err(CardError::UserNotFound(username.to_string()));
        }

        let key = CacheKey::new(kind, username);
        if let Some(svg) = self.cache.get(&key).await {
            debug!("Cache hit for {key}");
            return Ok(svg);
        }
        debug!("Cache miss for {key}");

        let svg = match timeout(self.upstream_timeout, self.render(kind, username, theme)).await {
            Ok(Ok(svg)) => svg,
            Ok(Err(e)) => {
                error!("Failed to build {} card for {username}: {e}", kind.as_str());
                return Err(e);
            }
            Err(_) => {
                error!(
                    "Timed out building {} card for {username} after {:?}",
                    kind.as_str(),
                    self.upstream_timeout
                );
                return Err(CardError::Timeout(self.upstream_timeout));
            }
        };

        self.cache.put(key, svg.clone(), CARD_TTL).await;
        Ok(svg)
    }

    async fn render(
        &self,
        kind: CardKind,
        username: &str,
        theme: Theme,
    ) -> Result<String, CardError> {
        let github = self.github.as_ref();
        match kind {
            CardKind::Stats => {
                let stats = aggregate::user_stats(github, username).await?;
                Ok(svg::stats_card(&stats, theme))
            }
            CardKind::Languages => {
                let languages =
                    aggregate::user_languages(github, username, self.language_concurrency)
                        .await?;
                Ok(svg::languages_card(&languages, theme))
            }
        }
    }
}
