mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::json;

fn gated_routes() -> Vec<(Method, &'static str, &'static str)> {
    vec![
        (Method::GET, "/drinks-detail", "get:drinks-detail"),
        (Method::POST, "/drinks", "post:drinks"),
        (Method::PATCH, "/drinks/1", "patch:drinks"),
        (Method::DELETE, "/drinks/1", "delete:drinks"),
    ]
}

fn body() -> serde_json::Value {
    json!({"title": "Water", "recipe": [{"name": "water", "color": "blue", "parts": 1}]})
}

#[tokio::test]
async fn missing_or_malformed_tokens_are_401() -> Result<()> {
    let server = common::start_server().await?;

    for (method, path, _) in gated_routes() {
        let (status, res) = server.call(method.clone(), path, None, Some(body())).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, path);
        assert_eq!(res["success"], json!(false));
        assert_eq!(res["error"], json!(401));
        assert!(res["message"].is_string());

        let res = server
            .client
            .request(method.clone(), server.url(path))
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .json(&body())
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{} {}", method, path);
    }
    Ok(())
}

#[tokio::test]
async fn invalid_or_expired_tokens_are_401() -> Result<()> {
    let server = common::start_server().await?;
    let forged = common::token_with(common::ALL_SCOPES, "not-the-secret", 3600);
    let expired = common::token_with(common::ALL_SCOPES, common::SECRET, -3600);

    for (method, path, _) in gated_routes() {
        for token in [forged.as_str(), expired.as_str(), "garbage"] {
            let (status, res) = server.call(method.clone(), path, Some(token), Some(body())).await?;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, path);
            assert_eq!(res["error"], json!(401));
        }
    }
    Ok(())
}

#[tokio::test]
async fn tokens_without_the_scope_are_403() -> Result<()> {
    let server = common::start_server().await?;

    for (method, path, scope) in gated_routes() {
        // Every scope except the one the route needs
        let others: Vec<&str> = common::ALL_SCOPES.iter().copied().filter(|s| *s != scope).collect();
        let token = common::token(&others);
        let (status, res) = server.call(method.clone(), path, Some(&token), Some(body())).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, path);
        assert_eq!(res["success"], json!(false));
        assert_eq!(res["error"], json!(403));
    }
    Ok(())
}

#[tokio::test]
async fn public_listing_needs_no_token() -> Result<()> {
    let server = common::start_server().await?;
    let (status, res) = server.call(Method::GET, "/drinks", None, None).await?;
    // Empty store: not found, but never an auth failure
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(res["error"], json!(404));
    Ok(())
}
