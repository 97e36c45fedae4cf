pub mod jwks;

use std::collections::BTreeSet;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;
pub use jwks::JwksCache;

/// Claims carried by an access token from the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    pub iss: String,
    pub aud: Audience,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

/// `aud` may be a single string or a list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Many(Vec<String>),
}

/// Verified caller: subject plus the granted permission scopes
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub subject: Option<String>,
    pub permissions: BTreeSet<String>,
}

impl AuthUser {
    pub fn has_permission(&self, scope: &str) -> bool {
        self.permissions.contains(scope)
    }

    pub fn require(&self, scope: &str) -> Result<(), AuthError> {
        if self.has_permission(scope) {
            Ok(())
        } else {
            Err(AuthError::InsufficientScope(scope.to_string()))
        }
    }
}

impl TryFrom<Claims> for AuthUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let permissions = claims
            .permissions
            .ok_or_else(|| AuthError::InvalidClaims("Permissions not included in token.".into()))?;

        Ok(Self {
            subject: claims.sub,
            permissions: permissions.into_iter().collect(),
        })
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    MissingToken(String),

    #[error("Unable to parse authentication token: {0}")]
    InvalidHeader(String),

    #[error("Unable to find the appropriate key (kid '{0}').")]
    UnknownKey(String),

    #[error("Token signature could not be verified.")]
    InvalidSignature,

    #[error("Token expired.")]
    Expired,

    #[error("Incorrect claims: {0}")]
    InvalidClaims(String),

    #[error("Permission '{0}' not granted.")]
    InsufficientScope(String),

    #[error("Signing keys unavailable: {0}")]
    KeyFetch(String),

    #[error("Authorizer configuration error: {0}")]
    Config(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::InvalidAudience => AuthError::InvalidClaims("Incorrect audience.".into()),
            ErrorKind::InvalidIssuer => AuthError::InvalidClaims("Incorrect issuer.".into()),
            ErrorKind::ImmatureSignature => AuthError::InvalidClaims("Token not yet valid.".into()),
            ErrorKind::MissingRequiredClaim(claim) => {
                AuthError::InvalidClaims(format!("Missing '{}' claim.", claim))
            }
            ErrorKind::InvalidAlgorithm => AuthError::InvalidHeader("algorithm mismatch".into()),
            ErrorKind::Json(e) => AuthError::InvalidClaims(e.to_string()),
            other => AuthError::InvalidHeader(format!("{:?}", other)),
        }
    }
}

/// Where verification keys come from
pub enum KeySource {
    /// Provider key set, selected by the token's `kid`
    Jwks(JwksCache),
    /// Shared HS256 secret
    Secret(DecodingKey),
}

/// Verifies bearer tokens and turns them into an [`AuthUser`]
pub struct Authorizer {
    keys: KeySource,
    issuer: String,
    audience: String,
    algorithms: Vec<Algorithm>,
    leeway: u64,
}

impl Authorizer {
    pub fn new(
        keys: KeySource,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        algorithms: Vec<Algorithm>,
    ) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
            algorithms,
            leeway: 0,
        }
    }

    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway = seconds;
        self
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let issuer = config
            .issuer()
            .ok_or_else(|| AuthError::Config("set AUTH0_DOMAIN or AUTH_ISSUER".into()))?;

        let (keys, algorithms) = match &config.hs256_secret {
            Some(secret) => {
                tracing::warn!("Using shared HS256 secret for token verification");
                (
                    KeySource::Secret(DecodingKey::from_secret(secret.as_bytes())),
                    vec![Algorithm::HS256],
                )
            }
            None => {
                let url = config.jwks_url().ok_or_else(|| {
                    AuthError::Config("set AUTH0_DOMAIN or AUTH_JWKS_URL".into())
                })?;
                let algorithms = config
                    .algorithms
                    .iter()
                    .map(|a| {
                        Algorithm::from_str(a)
                            .map_err(|_| AuthError::Config(format!("unknown algorithm '{}'", a)))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if algorithms.is_empty() {
                    return Err(AuthError::Config("no signing algorithms allowed".into()));
                }
                let cache = JwksCache::remote(
                    url,
                    Duration::from_secs(config.jwks_cache_secs),
                    Duration::from_secs(config.jwks_timeout_secs),
                )?;
                (KeySource::Jwks(cache), algorithms)
            }
        };

        Ok(Self::new(keys, issuer, config.audience.clone(), algorithms).with_leeway(config.leeway_secs))
    }

    /// Authorizer over a fixed key set (no network)
    pub fn with_jwks(keys: JwkSet, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self::new(
            KeySource::Jwks(JwksCache::fixed(keys)),
            issuer,
            audience,
            vec![Algorithm::RS256],
        )
    }

    /// Verify signature, expiry, issuer and audience, then read the permissions
    pub async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidHeader(e.to_string()))?;

        if !self.algorithms.contains(&header.alg) {
            return Err(AuthError::InvalidHeader(format!(
                "algorithm {:?} not accepted",
                header.alg
            )));
        }

        let key = match &self.keys {
            KeySource::Jwks(cache) => {
                let kid = header
                    .kid
                    .as_deref()
                    .ok_or_else(|| AuthError::InvalidHeader("token header has no 'kid'".into()))?;
                cache.key_for(kid).await?
            }
            KeySource::Secret(key) => key.clone(),
        };

        let mut validation = Validation::new(header.alg);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.validate_nbf = true;
        validation.leeway = self.leeway;

        let data = decode::<Claims>(token, &key, &validation)?;
        AuthUser::try_from(data.claims)
    }
}
