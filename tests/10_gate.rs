mod common;

use anyhow::Result;
use cartuner_api::auth::{Role, TokenAuthority, TokenSubject};
use reqwest::{header, StatusCode};

fn location(res: &reqwest::Response) -> String {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = common::client().get(server.url("/health")).send().await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    Ok(())
}

#[tokio::test]
async fn anonymous_request_to_client_screen_goes_to_client_signin() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = common::client()
        .get(server.url("/screens/client/dashboard"))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/auth/client/signin");
    Ok(())
}

#[tokio::test]
async fn mechanic_token_opens_mechanic_dashboard() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::token_for(Role::Mechanic, "mech-7");

    let res = common::client()
        .get(server.url("/screens/mechanic/dashboard"))
        .header(header::COOKIE, common::cookie(&token))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["identity"]["id"], "mech-7");
    assert_eq!(body["data"]["identity"]["role"], "mechanic");
    Ok(())
}

#[tokio::test]
async fn customer_token_on_admin_screen_goes_to_admin_signin() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::token_for(Role::Customer, "cust-1");

    let res = common::client()
        .get(server.url("/screens/admin/dashboard"))
        .header(header::COOKIE, common::cookie(&token))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/auth/admin/signin");
    Ok(())
}

#[tokio::test]
async fn signed_in_owner_on_mechanic_signin_stays_on_signin() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::token_for(Role::StoreOwner, "own-2");

    let res = common::client()
        .get(server.url("/auth/mechanic/signin"))
        .header(header::COOKIE, common::cookie(&token))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn signed_in_admin_is_sent_from_signin_to_dashboard() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::token_for(Role::Admin, "adm-1");

    let res = common::client()
        .get(server.url("/auth/admin/signin"))
        .header(header::COOKIE, common::cookie(&token))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/screens/admin/dashboard");
    Ok(())
}

#[tokio::test]
async fn token_signed_with_another_secret_is_treated_as_absent() -> Result<()> {
    let server = common::ensure_server().await?;
    let forged = TokenAuthority::new(
        "not-the-server-secret",
        common::JWT_ISSUER,
        common::JWT_AUDIENCE,
        chrono::Duration::hours(1),
    )?
    .issue(&TokenSubject::new("adm-x", Role::Admin))?;

    let res = common::client()
        .get(server.url("/screens/admin/dashboard"))
        .header(header::COOKIE, common::cookie(&forged))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/auth/admin/signin");
    Ok(())
}

#[tokio::test]
async fn expired_token_on_signin_page_renders_signin() -> Result<()> {
    let server = common::ensure_server().await?;
    let expired = common::authority().issue_at(
        &TokenSubject::new("cust-9", Role::Customer),
        chrono::Utc::now() - chrono::Duration::hours(3),
    )?;

    let res = common::client()
        .get(server.url("/auth/client/signin"))
        .header(header::COOKIE, common::cookie(&expired))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn spoofed_identity_header_does_not_authorize() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client()
        .get(server.url("/screens/admin/dashboard"))
        .header("x-decoded-token", r#"{"id":"evil","role":"admin","iat":0,"exp":9999999999}"#)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/auth/admin/signin");
    Ok(())
}

#[tokio::test]
async fn public_paths_pass_without_credential() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::client();

    let root = client.get(server.url("/")).send().await?;
    assert_eq!(root.status(), StatusCode::OK);

    let missing = client.get(server.url("/not-a-page")).send().await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    Ok(())
}
