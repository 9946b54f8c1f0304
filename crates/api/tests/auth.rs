mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestContext;

#[tokio::test]
async fn login_returns_token_and_me_resolves() {
    let ctx = TestContext::new().await;
    let token = ctx.login("member@acme.test", "memberpass").await;

    let (status, body) = ctx.request("GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "member@acme.test");
    assert_eq!(body["roles"], json!(["MEMBER"]));
    let acme = ctx.seeded.company_named("ACME Industries").unwrap();
    assert_eq!(body["companyId"], acme.id.to_string());
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "member@acme.test", "password": "nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = ctx
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "ghost@acme.test", "password": "memberpass" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn requests_without_token_are_unauthenticated() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx.request("GET", "/branches", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn member_writes_are_forbidden() {
    let ctx = TestContext::new().await;
    let token = ctx.login("member@acme.test", "memberpass").await;
    let (status, body) = ctx
        .request(
            "POST",
            "/branches",
            Some(&token),
            Some(json!({ "name": "Side Office" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn deactivated_accounts_lose_access_immediately() {
    let ctx = TestContext::new().await;
    let member = ctx.seeded.user_email("member@acme.test").unwrap().clone();
    let member_token = ctx.login("member@acme.test", "memberpass").await;
    let admin_token = ctx.login("admin@acme.test", "adminpass").await;

    let (status, _) = ctx
        .request(
            "PATCH",
            &format!("/users/{}", member.id),
            Some(&admin_token),
            Some(json!({ "isActive": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The old token is still unexpired, but the account re-check fails.
    let (status, _) = ctx.request("GET", "/auth/me", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "member@acme.test", "password": "memberpass" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_manages_users_in_own_tenant_only() {
    let ctx = TestContext::new().await;
    let acme_admin = ctx.login("admin@acme.test", "adminpass").await;
    let nimbus_admin = ctx.login("admin@nimbus.test", "nimbuspass").await;
    let member = ctx.seeded.user_email("member@acme.test").unwrap();

    let (status, body) = ctx
        .request("GET", &format!("/users/{}", member.id), Some(&acme_admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "member@acme.test");

    let (status, _) = ctx
        .request(
            "GET",
            &format!("/users/{}", member.id),
            Some(&nimbus_admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
