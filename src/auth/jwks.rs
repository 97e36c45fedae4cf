use std::time::{Duration, Instant};

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::DecodingKey;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::AuthError;

/// Default floor between two fetches of the key set, successful or not.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Cached public key set of the identity provider.
///
/// Keys are fetched lazily and kept for `ttl`. A token signed with a key id
/// that is not in the cache triggers one refresh so rotated keys are picked up
/// without waiting for expiry. Fetches never run more often than
/// `min_refresh`, and only one runs at a time.
pub struct JwksCache {
    source: Option<JwksSource>,
    min_refresh: Duration,
    state: RwLock<CacheState>,
    refresh_lock: Mutex<()>,
}

struct JwksSource {
    url: String,
    client: reqwest::Client,
    ttl: Duration,
}

#[derive(Default)]
struct CacheState {
    keys: Option<CachedKeys>,
    last_attempt: Option<Instant>,
    last_error: Option<String>,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

impl JwksCache {
    /// Key set fetched from `url`, each request bounded by `fetch_timeout`.
    pub fn remote(url: impl Into<String>, ttl: Duration, fetch_timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .map_err(|e| AuthError::Config(format!("key set client: {}", e)))?;

        Ok(Self {
            source: Some(JwksSource {
                url: url.into(),
                client,
                ttl,
            }),
            min_refresh: MIN_REFRESH_INTERVAL,
            state: RwLock::new(CacheState::default()),
            refresh_lock: Mutex::new(()),
        })
    }

    /// A fixed key set that is never refreshed.
    pub fn fixed(keys: JwkSet) -> Self {
        Self {
            source: None,
            min_refresh: MIN_REFRESH_INTERVAL,
            state: RwLock::new(CacheState {
                keys: Some(CachedKeys {
                    keys,
                    fetched_at: Instant::now(),
                }),
                ..CacheState::default()
            }),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh = interval;
        self
    }

    /// Resolve the decoding key for `kid`, refreshing the set when needed.
    pub async fn key_for(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.lookup(kid, true).await? {
            return Ok(key);
        }

        if let Err(err) = self.refresh_if_due().await {
            if !self.has_keys().await {
                return Err(err);
            }
            warn!("Key set refresh failed, serving cached keys: {}", err);
        }

        if let Some(key) = self.lookup(kid, false).await? {
            return Ok(key);
        }

        let state = self.state.read().await;
        match (&state.keys, &state.last_error) {
            (None, Some(error)) => Err(AuthError::KeyFetch(error.clone())),
            (None, None) => Err(AuthError::KeyFetch("signing keys not loaded".into())),
            (Some(_), _) => Err(AuthError::UnknownKey(kid.to_string())),
        }
    }

    async fn lookup(&self, kid: &str, fresh_only: bool) -> Result<Option<DecodingKey>, AuthError> {
        let state = self.state.read().await;
        let Some(cached) = state.keys.as_ref() else {
            return Ok(None);
        };

        if fresh_only && self.is_stale(cached) {
            return Ok(None);
        }

        match cached.keys.find(kid) {
            Some(jwk) => DecodingKey::from_jwk(jwk)
                .map(Some)
                .map_err(|e| AuthError::KeyFetch(format!("unusable key '{}': {}", kid, e))),
            None => Ok(None),
        }
    }

    async fn has_keys(&self) -> bool {
        self.state.read().await.keys.is_some()
    }

    fn is_stale(&self, cached: &CachedKeys) -> bool {
        match &self.source {
            Some(source) => cached.fetched_at.elapsed() >= source.ttl,
            None => false,
        }
    }

    fn is_due(&self, state: &CacheState) -> bool {
        match state.last_attempt {
            Some(at) => at.elapsed() >= self.min_refresh,
            None => true,
        }
    }

    async fn refresh_if_due(&self) -> Result<(), AuthError> {
        let Some(source) = &self.source else {
            return Ok(());
        };

        // Callers queue here; whoever gets in after a fetch sees it as not due
        let _guard = self.refresh_lock.lock().await;
        let due = self.is_due(&*self.state.read().await);
        if !due {
            return Ok(());
        }

        self.state.write().await.last_attempt = Some(Instant::now());

        match fetch(source).await {
            Ok(keys) => {
                info!("Loaded {} signing keys from {}", keys.keys.len(), source.url);
                let mut state = self.state.write().await;
                state.keys = Some(CachedKeys {
                    keys,
                    fetched_at: Instant::now(),
                });
                state.last_error = None;
                Ok(())
            }
            Err(message) => {
                self.state.write().await.last_error = Some(message.clone());
                Err(AuthError::KeyFetch(message))
            }
        }
    }
}

async fn fetch(source: &JwksSource) -> Result<JwkSet, String> {
    debug!("Fetching signing keys from {}", source.url);
    source
        .client
        .get(&source.url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| e.to_string())?
        .json()
        .await
        .map_err(|e| e.to_string())
}
