//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                   - Liveness
//! GET  /health/ready                             - Readiness (repository ping)
//!
//! # Suppliers (all but the listing require a session)
//! GET    /api/fornecedores                       - List suppliers
//! GET    /api/fornecedores/{id}                  - Supplier with address and products
//! POST   /api/fornecedores                       - Create supplier and address
//! PUT    /api/fornecedores/{id}                  - Update supplier
//! DELETE /api/fornecedores/{id}                  - Remove supplier and address
//! GET    /api/fornecedores/obter-endereco/{id}   - Address by id
//! PUT    /api/fornecedores/atualizar-endereco/{id} - Update address
//!
//! # Products
//! GET    /api/produtos                           - List products with supplier names
//! GET    /api/produtos/{id}                      - Product with supplier name
//! POST   /api/produtos                           - Create product (base64 image)
//! POST   /api/produtos/Adicionar                 - Create product (multipart image)
//! PUT    /api/produtos/{id}                      - Update product
//! DELETE /api/produtos/{id}                      - Remove product
//!
//! # Stored images
//! GET    /imagens/{file}                         - Served from the image directory
//!
//! # Auth
//! POST /api/auth/register                        - Register and log in
//! POST /api/auth/login                           - Log in
//! POST /api/auth/logout                          - Log out
//! ```

pub mod auth;
pub mod health;
pub mod products;
pub mod suppliers;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    middleware::from_fn,
};
use serde::de::DeserializeOwned;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionStore;
use tracing::Span;

use crate::middleware::{
    create_cors_layer, create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::error::AppError;
use crate::notification::ApiResponse;
use crate::state::AppState;

/// All API routes, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .nest("/api/fornecedores", suppliers::routes())
        .nest("/api/produtos", products::routes())
        .nest("/api/auth", auth::routes())
}

/// The full application: routes, middleware stack and state.
///
/// Sentry layers are added by the binary so tests run without them.
pub fn app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let config = state.config();
    let session_layer = create_session_layer(session_store, config);
    let cors_layer = create_cors_layer(config.cors_origins.as_deref());
    let body_limit = DefaultBodyLimit::max(config.max_upload_bytes);

    routes()
        .nest_service("/imagens", ServeDir::new(&config.image_dir))
        .layer(session_layer)
        .layer(body_limit)
        .layer(cors_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// JSON body extractor that rejects malformed bodies with the failure envelope.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiResponse<()>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| ApiResponse::Failure(vec![rejection.body_text()]))
    }
}

/// Route id extractor. A segment that is not a valid id names no resource,
/// so it is answered like an unknown id: `404` with an empty body.
pub struct PathId<T>(pub T);

impl<S, T> FromRequestParts<S> for PathId<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| Self(id))
            .map_err(|rejection| {
                tracing::debug!(%rejection, "path id did not parse");
                AppError::NotFound
            })
    }
}
