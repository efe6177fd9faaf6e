//! Session gate: supplier endpoints other than the listing need a login.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use fornecedores_integration_tests::{CNPJ, TestApp, supplier_body};

#[tokio::test]
async fn test_protected_routes_reject_anonymous_requests() {
    let mut app = TestApp::new();
    let id = Uuid::new_v4();

    let response = app.get(&format!("/api/fornecedores/{id}")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.text.is_empty());

    let response = app
        .post_json("/api/fornecedores", &supplier_body(CNPJ, 2))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(app.get("/api/fornecedores").await.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_supplier_listing_is_public() {
    let mut app = TestApp::new();

    let response = app.get("/api/fornecedores").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_register_opens_a_session() {
    let mut app = TestApp::new();
    app.login().await;

    let response = app
        .get(&format!("/api/fornecedores/{}", Uuid::new_v4()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.text.is_empty());
}

#[tokio::test]
async fn test_logout_closes_the_session() {
    let mut app = TestApp::new();
    app.login().await;

    let response = app.logout().await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .get(&format!("/api/fornecedores/{}", Uuid::new_v4()))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_registered_credentials() {
    let mut app = TestApp::new();
    app.login().await;
    app.logout().await;

    let response = app
        .post_json(
            "/api/auth/login",
            &json!({"email": "TESTER@example.com", "password": "correct horse"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);
    assert_eq!(response.data()["email"], "tester@example.com");

    let response = app
        .get(&format!("/api/fornecedores/{}", Uuid::new_v4()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let mut app = TestApp::new();
    app.login().await;
    app.logout().await;

    let response = app
        .post_json(
            "/api/auth/login",
            &json!({"email": "tester@example.com", "password": "wrong horse"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_mismatched_passwords() {
    let mut app = TestApp::new();

    let response = app
        .post_json(
            "/api/auth/register",
            &json!({
                "email": "tester@example.com",
                "password": "correct horse",
                "confirmPassword": "battery staple"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert_eq!(
        response.errors(),
        ["confirmPassword: passwords do not match"]
    );
}

#[tokio::test]
async fn test_register_twice_is_a_notification() {
    let mut app = TestApp::new();
    app.login().await;

    let response = app
        .post_json(
            "/api/auth/register",
            &json!({
                "email": "tester@example.com",
                "password": "another password",
                "confirmPassword": "another password"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.errors(), ["An account with this email already exists!"]);
}
