use std::{
    fmt,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use moka::{future::Cache, Expiry};

/// How long a rendered card stays fresh.
pub const CARD_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardKind {
    Stats,
    Languages,
}

impl CardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stats => "stats",
            Self::Languages => "languages",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: CardKind,
    pub username: String,
}

impl CacheKey {
    pub fn new(kind: CardKind, username: &str) -> Self {
        Self {
            kind,
            username: username.to_string(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.username, self.kind.as_str())
    }
}

/// Store of rendered cards. Every `put` replaces whatever was stored under the key.
#[async_trait]
pub trait CardCache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Option<String>;

    async fn put(&self, key: CacheKey, svg: String, ttl: Duration);
}

#[derive(Debug, Clone)]
struct CachedCard {
    svg: String,
    ttl: Duration,
}

struct CardExpiry;

impl Expiry<String, CachedCard> for CardExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedCard,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedCard,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache with a per-entry time to live.
#[derive(Clone)]
pub struct MemoryCache {
    cards: Cache<String, CachedCard>,
}

impl MemoryCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            cards: Cache::builder()
                .max_capacity(capacity)
                .expire_after(CardExpiry)
                .build(),
        }
    }
}

#[async_trait]
impl CardCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<String> {
        self.cards.get(&key.to_string()).await.map(|card| card.svg)
    }

    async fn put(&self, key: CacheKey, svg: String, ttl: Duration) {
        self.cards
            .insert(key.to_string(), CachedCard { svg, ttl })
            .await;
    }
}
