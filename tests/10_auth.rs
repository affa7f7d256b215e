mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{offline_app, request, send, token};

#[tokio::test]
async fn root_is_public() -> Result<()> {
    let app = offline_app()?;
    let (status, body) = send(&app, request(Method::GET, "/", None, None)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    Ok(())
}

#[tokio::test]
async fn writes_require_a_token() -> Result<()> {
    let app = offline_app()?;
    let cases = [
        (Method::POST, "/companies"),
        (Method::PATCH, "/companies/c1"),
        (Method::DELETE, "/companies/c1"),
        (Method::POST, "/jobs"),
        (Method::PATCH, "/jobs/1"),
        (Method::DELETE, "/jobs/1"),
    ];

    for (method, uri) in cases {
        let (status, body) =
            send(&app, request(method.clone(), uri, None, Some(json!({ "title": "x" })))).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
    Ok(())
}

#[tokio::test]
async fn writes_require_an_admin() -> Result<()> {
    let app = offline_app()?;
    let user = token("u1", false);

    let (status, _) = send(
        &app,
        request(Method::PATCH, "/jobs/1", Some(&user), Some(json!({ "salary": 1 }))),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn invalid_tokens_are_treated_as_anonymous() -> Result<()> {
    let app = offline_app()?;

    // Public routes still work with a garbage token
    let (status, _) = send(&app, request(Method::GET, "/", Some("garbage"), None)).await?;
    assert_eq!(status, StatusCode::OK);

    // Protected ones see no identity
    let (status, _) = send(&app, request(Method::GET, "/users/u1", Some("garbage"), None)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn user_route_allows_owner() -> Result<()> {
    let app = offline_app()?;
    let (status, body) =
        send(&app, request(Method::GET, "/users/u1", Some(&token("u1", false)), None)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "u1");
    assert_eq!(body["data"]["firstName"], "u1F");
    assert_eq!(body["data"]["isAdmin"], false);
    Ok(())
}

#[tokio::test]
async fn user_route_rejects_other_users() -> Result<()> {
    let app = offline_app()?;
    let (status, _) =
        send(&app, request(Method::GET, "/users/u2", Some(&token("u1", false)), None)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn user_route_allows_admins() -> Result<()> {
    let app = offline_app()?;
    let (status, body) =
        send(&app, request(Method::GET, "/users/u2", Some(&token("admin", true)), None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "u2");
    Ok(())
}

#[tokio::test]
async fn user_route_unknown_user_is_not_found() -> Result<()> {
    let app = offline_app()?;
    for bearer in [token("u1", false), token("admin", true), token("ghost", false)] {
        let (status, body) =
            send(&app, request(Method::GET, "/users/ghost", Some(&bearer), None)).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
    Ok(())
}

#[tokio::test]
async fn admin_update_with_empty_payload_is_bad_request() -> Result<()> {
    let app = offline_app()?;
    let (status, body) = send(
        &app,
        request(Method::PATCH, "/jobs/1", Some(&token("admin", true)), Some(json!({}))),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No data");
    Ok(())
}

#[tokio::test]
async fn admin_update_with_unknown_field_is_bad_request() -> Result<()> {
    let app = offline_app()?;
    let (status, body) = send(
        &app,
        request(
            Method::PATCH,
            "/jobs/1",
            Some(&token("admin", true)),
            Some(json!({ "company_handle": "c2" })),
        ),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Field not allowed: company_handle");
    Ok(())
}

#[tokio::test]
async fn malformed_input_is_bad_request() -> Result<()> {
    let app = offline_app()?;
    let admin = token("admin", true);

    let (status, _) = send(&app, request(Method::GET, "/jobs?colour=red", None, None)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        send(&app, request(Method::DELETE, "/jobs/not-a-number", Some(&admin), None)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        request(Method::PATCH, "/companies/c1", Some(&admin), Some(json!(["name"]))),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
