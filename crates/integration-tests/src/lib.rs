//! Integration tests for the supplier catalog API.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (in-memory repositories, temporary image directory)
//! cargo test -p fornecedores-integration-tests
//!
//! # Include the PostgreSQL tests (needs a migrated database)
//! cargo test -p fornecedores-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `auth` - Session login gate
//! - `suppliers` - Supplier and address endpoints
//! - `products` - Product endpoints and image storage
//! - `postgres` - Repository behavior against a real database

#![allow(clippy::missing_panics_doc)]

use std::path::{Path, PathBuf};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use fornecedores_api::config::ApiConfig;
use fornecedores_api::db::{InMemoryStore, Repositories};
use fornecedores_api::routes;
use fornecedores_api::state::AppState;

/// Valid CNPJ used by the supplier fixtures.
pub const CNPJ: &str = "11.222.333/0001-81";

/// Valid CPF used by the supplier fixtures.
pub const CPF: &str = "529.982.247-25";

/// Base64 of `hello`.
pub const IMAGE_BASE64: &str = "aGVsbG8=";

/// The full router over in-memory repositories, with a cookie jar of one.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
    images: TempDir,
    /// Backing store, for asserting on persisted state directly.
    pub store: InMemoryStore,
}

/// Status and decoded body of one response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// Parsed JSON, or `Value::Null` for an empty or non-JSON body.
    pub body: Value,
    pub text: String,
}

impl TestResponse {
    /// The `errors` array of a failure envelope.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.body["errors"]
            .as_array()
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The `data` of a success envelope.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let images = tempfile::tempdir().expect("Failed to create image directory");
        let store = InMemoryStore::new();
        let state = AppState::new(
            ApiConfig::local(images.path()),
            Repositories::in_memory(&store),
        );

        Self {
            router: routes::app(state, MemoryStore::default()),
            cookie: None,
            images,
            store,
        }
    }

    /// Directory product images are written to.
    #[must_use]
    pub fn image_dir(&self) -> &Path {
        self.images.path()
    }

    /// Names of the files currently in the image directory.
    #[must_use]
    pub fn stored_images(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.image_dir())
            .map(|entries| entries.filter_map(|e| e.ok().map(|e| e.path())).collect())
            .unwrap_or_default()
    }

    /// Send a request, attaching and then updating the session cookie.
    pub async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request.headers_mut().insert(
                header::COOKIE,
                cookie.parse().expect("Invalid cookie header"),
            );
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            let expired = set_cookie.contains("Max-Age=0");
            self.cookie = (!expired)
                .then(|| set_cookie.split(';').next().unwrap_or_default().to_owned());
        }

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        TestResponse { status, body, text }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(empty_request(Method::GET, uri)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send(empty_request(Method::DELETE, uri)).await
    }

    pub async fn post_json(&mut self, uri: &str, body: &Value) -> TestResponse {
        self.send(json_request(Method::POST, uri, body)).await
    }

    pub async fn put_json(&mut self, uri: &str, body: &Value) -> TestResponse {
        self.send(json_request(Method::PUT, uri, body)).await
    }

    /// Post a `multipart/form-data` body built from text fields and one file.
    pub async fn post_multipart(
        &mut self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> TestResponse {
        const BOUNDARY: &str = "fornecedores-test-boundary";

        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((name, file_name, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Register a fresh user and keep its session cookie.
    pub async fn login(&mut self) {
        let response = self
            .post_json(
                "/api/auth/register",
                &json!({
                    "email": "tester@example.com",
                    "password": "correct horse",
                    "confirmPassword": "correct horse"
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        assert!(self.cookie.is_some(), "register did not set a session cookie");
    }

    pub async fn logout(&mut self) -> TestResponse {
        self.send(empty_request(Method::POST, "/api/auth/logout"))
            .await
    }

    /// Create a supplier through the API and return its id.
    pub async fn create_supplier(&mut self, document: &str, kind: i32) -> String {
        let response = self
            .post_json("/api/fornecedores", &supplier_body(document, kind))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        response.data()["id"]
            .as_str()
            .expect("supplier id")
            .to_owned()
    }

    /// Create a product through the base64 endpoint and return its id.
    pub async fn create_product(&mut self, supplier_id: &str, name: &str) -> String {
        let response = self
            .post_json("/api/produtos", &product_body(supplier_id, name))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        response.data()["id"]
            .as_str()
            .expect("product id")
            .to_owned()
    }
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

/// A valid supplier create body with an address.
#[must_use]
pub fn supplier_body(document: &str, kind: i32) -> Value {
    json!({
        "nome": "Distribuidora Norte",
        "documento": document,
        "tipoFornecedor": kind,
        "ativo": true,
        "endereco": address_body(),
    })
}

/// A valid address body without ids.
#[must_use]
pub fn address_body() -> Value {
    json!({
        "logradouro": "Av. Paulista",
        "numero": "1000",
        "complemento": "Sala 12",
        "cep": "01310100",
        "bairro": "Bela Vista",
        "cidade": "São Paulo",
        "estado": "SP",
    })
}

/// A valid product create body with a base64 image.
#[must_use]
pub fn product_body(supplier_id: &str, name: &str) -> Value {
    json!({
        "fornecedorId": supplier_id,
        "nome": name,
        "descricao": "Caneta esferográfica azul",
        "imagemUpload": IMAGE_BASE64,
        "imagem": "caneta.png",
        "valor": 3.5,
        "ativo": true,
    })
}
