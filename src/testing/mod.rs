use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::app::AppState;
use crate::auth::{Authorizer, KeySource};
use crate::database::MemoryDrinkStore;

pub const TEST_SECRET: &str = "drinks-test-secret";
pub const TEST_ISSUER: &str = "https://drinks.test/";
pub const TEST_AUDIENCE: &str = "drinks";
pub const TEST_KID: &str = "test-key-1";

const RSA_PRIVATE_PEM: &[u8] = include_bytes!("fixtures/rsa_private.pem");
const JWKS_JSON: &str = include_str!("fixtures/jwks.json");

/// Claims for a one-hour token granting `permissions`
pub fn claims(permissions: &[&str]) -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "sub": "auth0|barista",
        "iss": TEST_ISSUER,
        "aud": TEST_AUDIENCE,
        "iat": now,
        "exp": now + 3600,
        "permissions": permissions,
    })
}

pub fn sign_hs256(claims: &Value, secret: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("sign hs256 token")
}

pub fn sign_rs256(claims: &Value, kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(RSA_PRIVATE_PEM).expect("test rsa key");
    encode(&header, claims, &key).expect("sign rs256 token")
}

/// HS256 token accepted by [`test_authorizer`]
pub fn token(permissions: &[&str]) -> String {
    sign_hs256(&claims(permissions), TEST_SECRET)
}

pub fn test_jwks() -> JwkSet {
    serde_json::from_str(JWKS_JSON).expect("test jwks fixture")
}

pub fn test_authorizer() -> Authorizer {
    Authorizer::new(
        KeySource::Secret(DecodingKey::from_secret(TEST_SECRET.as_bytes())),
        TEST_ISSUER,
        TEST_AUDIENCE,
        vec![Algorithm::HS256],
    )
}

pub fn jwks_authorizer() -> Authorizer {
    Authorizer::with_jwks(test_jwks(), TEST_ISSUER, TEST_AUDIENCE)
}

/// Fresh state over an empty in-memory store
pub fn test_state() -> AppState {
    AppState::new(Arc::new(MemoryDrinkStore::new()), Arc::new(test_authorizer()))
}

/// Run one request through the router and decode the JSON body
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("router response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}
