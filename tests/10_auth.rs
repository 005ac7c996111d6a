mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{expect, TestServer, PASSWORD};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    let body = expect(res, StatusCode::OK).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn first_registration_becomes_admin() -> Result<()> {
    let server = TestServer::spawn().await?;

    let admin = server.register("admin@effitech.com").await?;
    let user = server.register("user@effitech.com").await?;
    assert_eq!(admin.role, "admin");
    assert_eq!(user.role, "user");
    Ok(())
}

#[tokio::test]
async fn register_response_never_contains_password() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .client
        .post(server.url("/auth/register"))
        .json(&json!({"email": "a@example.com", "password": PASSWORD, "full_name": "A"}))
        .send()
        .await?;
    let body = expect(res, StatusCode::OK).await?;

    assert_eq!(body["data"]["token_type"], "bearer");
    let user = body["data"]["user"].as_object().unwrap();
    assert!(!user.contains_key("password"));
    assert!(!user.contains_key("password_hash"));
    assert_eq!(user["email"], "a@example.com");
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.register("dup@example.com").await?;

    let res = server
        .client
        .post(server.url("/auth/register"))
        .json(&json!({"email": "dup@example.com", "password": "different1", "full_name": "Other"}))
        .send()
        .await?;
    let body = expect(res, StatusCode::BAD_REQUEST).await?;
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(body["error"], "Email is already registered");
    Ok(())
}

#[tokio::test]
async fn invalid_registration_reports_fields() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .client
        .post(server.url("/auth/register"))
        .json(&json!({"email": "not-an-email", "password": "123", "full_name": ""}))
        .send()
        .await?;
    let body = expect(res, StatusCode::UNPROCESSABLE_ENTITY).await?;
    let fields = body["field_errors"].as_object().unwrap();
    assert!(fields.contains_key("email"));
    assert!(fields.contains_key("password"));
    assert!(fields.contains_key("full_name"));

    // Nothing was stored, so the next account still bootstraps as admin
    let first = server.register("first@example.com").await?;
    assert_eq!(first.role, "admin");
    Ok(())
}

#[tokio::test]
async fn login_and_whoami() -> Result<()> {
    let server = TestServer::spawn().await?;
    let registered = server.register("me@example.com").await?;

    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({"email": "me@example.com", "password": PASSWORD}))
        .send()
        .await?;
    let body = expect(res, StatusCode::OK).await?;
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let me = expect(server.get("/auth/me", &token).await?, StatusCode::OK).await?;
    assert_eq!(me["data"]["id"], registered.id.as_str());
    assert_eq!(me["data"]["role"], "admin");
    Ok(())
}

#[tokio::test]
async fn bad_credentials_share_one_message() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.register("me@example.com").await?;

    let mut messages = Vec::new();
    for (email, password) in [("me@example.com", "wrong-password"), ("ghost@example.com", PASSWORD)] {
        let res = server
            .client
            .post(server.url("/auth/login"))
            .json(&json!({"email": email, "password": password}))
            .send()
            .await?;
        let body = expect(res, StatusCode::UNAUTHORIZED).await?;
        messages.push(body["error"].clone());
    }
    assert_eq!(messages[0], messages[1]);
    Ok(())
}

#[tokio::test]
async fn protected_routes_reject_missing_or_bad_tokens() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.client.get(server.url("/auth/me")).send().await?;
    expect(res, StatusCode::UNAUTHORIZED).await?;

    let res = server.get("/panels", "garbage").await?;
    let body = expect(res, StatusCode::UNAUTHORIZED).await?;
    assert_eq!(body["success"], false);
    Ok(())
}
