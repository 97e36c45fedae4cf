use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. `None` selects the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identity provider tenant domain, e.g. `example.us.auth0.com`.
    pub domain: Option<String>,
    /// Explicit issuer; derived from `domain` when unset.
    pub issuer: Option<String>,
    pub audience: String,
    /// Explicit key set location; derived from `domain` when unset.
    pub jwks_url: Option<String>,
    pub algorithms: Vec<String>,
    pub jwks_cache_secs: u64,
    /// Upper bound on one key set fetch.
    pub jwks_timeout_secs: u64,
    pub leeway_secs: u64,
    /// Shared HS256 secret. When set it replaces the remote key set.
    pub hs256_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    /// Empty list means any origin.
    pub cors_origins: Vec<String>,
}

impl AuthConfig {
    pub fn issuer(&self) -> Option<String> {
        self.issuer
            .clone()
            .or_else(|| self.domain.as_ref().map(|d| format!("https://{}/", d)))
    }

    pub fn jwks_url(&self) -> Option<String> {
        self.jwks_url.clone().or_else(|| {
            self.domain
                .as_ref()
                .map(|d| format!("https://{}/.well-known/jwks.json", d))
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        Self::preset(environment).with_overrides(|key| env::var(key).ok())
    }

    pub fn preset(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    /// Apply overrides from a key lookup (normally the process environment).
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("DRINKS_API_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("DRINKS_API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Auth overrides
        if let Some(v) = lookup("AUTH0_DOMAIN") {
            self.auth.domain = Some(v);
        }
        if let Some(v) = lookup("AUTH_ISSUER") {
            self.auth.issuer = Some(v);
        }
        if let Some(v) = lookup("API_AUDIENCE") {
            self.auth.audience = v;
        }
        if let Some(v) = lookup("AUTH_JWKS_URL") {
            self.auth.jwks_url = Some(v);
        }
        if let Some(v) = lookup("AUTH_ALGORITHMS") {
            self.auth.algorithms = split_list(&v);
        }
        if let Some(v) = lookup("AUTH_JWKS_CACHE_SECS") {
            self.auth.jwks_cache_secs = v.parse().unwrap_or(self.auth.jwks_cache_secs);
        }
        if let Some(v) = lookup("AUTH_JWKS_TIMEOUT_SECS") {
            self.auth.jwks_timeout_secs = v.parse().unwrap_or(self.auth.jwks_timeout_secs);
        }
        if let Some(v) = lookup("AUTH_LEEWAY_SECS") {
            self.auth.leeway_secs = v.parse().unwrap_or(self.auth.leeway_secs);
        }
        if let Some(v) = lookup("AUTH_HS256_SECRET") {
            self.auth.hs256_secret = Some(v).filter(|s| !s.is_empty());
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
            },
            auth: AuthConfig {
                domain: None,
                issuer: None,
                audience: "drinks".to_string(),
                jwks_url: None,
                algorithms: vec!["RS256".to_string()],
                jwks_cache_secs: 300,
                jwks_timeout_secs: 10,
                leeway_secs: 60,
                hs256_secret: None,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: Vec::new(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
            },
            auth: AuthConfig {
                domain: None,
                issuer: None,
                audience: "drinks".to_string(),
                jwks_url: None,
                algorithms: vec!["RS256".to_string()],
                jwks_cache_secs: 600,
                jwks_timeout_secs: 10,
                leeway_secs: 30,
                hs256_secret: None,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: Vec::new(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
            },
            auth: AuthConfig {
                domain: None,
                issuer: None,
                audience: "drinks".to_string(),
                jwks_url: None,
                algorithms: vec!["RS256".to_string()],
                jwks_cache_secs: 3600,
                jwks_timeout_secs: 10,
                leeway_secs: 10,
                hs256_secret: None,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: Vec::new(),
            },
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
