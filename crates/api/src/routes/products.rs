//! Product route handlers.
//!
//! Images arrive either as a base64 string in the JSON body or as a file
//! part of a multipart form. The image is written before the product row,
//! and removed again if the row is not persisted.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::{get, post},
};
use tracing::instrument;
use validator::Validate;

use fornecedores_core::{Price, ProductId};

use super::{PathId, Payload};
use crate::conversions::{ConversionError, convert_listing, convert_product, product_from_dto};
use crate::dto::{ProductDto, ProductImageForm, validation_messages};
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::notification::{ApiResponse, Notifications};
use crate::services::messages;
use crate::state::AppState;
use crate::storage::decode_image;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/Adicionar", post(create_alternative))
        .route("/{id}", get(get_by_id).put(update).delete(delete))
}

/// List every product with its supplier's name.
#[instrument(skip_all)]
async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProductDto>>> {
    let listings = state.repositories().products.list_with_suppliers().await?;
    Ok(Json(listings.iter().map(convert_listing).collect()))
}

#[instrument(skip_all, fields(product_id = %id))]
async fn get_by_id(
    State(state): State<AppState>,
    PathId(id): PathId<ProductId>,
) -> Result<Json<ProductDto>> {
    let listing = state
        .repositories()
        .products
        .get_with_supplier(id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(convert_listing(&listing)))
}

/// Create a product from JSON with a base64 `imagemUpload`.
#[instrument(skip_all)]
async fn create(
    State(state): State<AppState>,
    Payload(dto): Payload<ProductDto>,
) -> Result<ApiResponse<ProductDto>> {
    if let Err(errors) = dto.validate() {
        return Ok(ApiResponse::Failure(validation_messages(&errors)));
    }

    let mut notifications = Notifications::new();
    let Some(product) = checked_product(&state, &dto, &mut notifications).await? else {
        return Ok(ApiResponse::failure(notifications));
    };

    let Some(bytes) = decode_image(dto.imagem_upload.as_deref(), &mut notifications) else {
        return Ok(ApiResponse::failure(notifications));
    };

    let declared_name = dto.imagem.as_deref().unwrap_or_default();
    add_with_image(&state, product, declared_name, &bytes, notifications).await
}

/// Create a product from a multipart form with an `imagemUpload` file part.
#[instrument(skip_all)]
async fn create_alternative(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<ApiResponse<ProductDto>> {
    let mut notifications = Notifications::new();
    let form = ProductImageForm::read(&mut multipart, &mut notifications).await?;
    if notifications.has_any() {
        return Ok(ApiResponse::failure(notifications));
    }

    let dto = form.product;
    if let Err(errors) = dto.validate() {
        return Ok(ApiResponse::Failure(validation_messages(&errors)));
    }

    let Some(product) = checked_product(&state, &dto, &mut notifications).await? else {
        return Ok(ApiResponse::failure(notifications));
    };

    let Some(upload) = form.upload.filter(|upload| !upload.bytes.is_empty()) else {
        notifications.notify(messages::IMAGE_REQUIRED);
        return Ok(ApiResponse::failure(notifications));
    };

    add_with_image(
        &state,
        product,
        &upload.file_name,
        &upload.bytes,
        notifications,
    )
    .await
}

/// Update name, description, price and active flag, and the image when a
/// new one is sent. Owner and registration date never change.
#[instrument(skip_all, fields(product_id = %id))]
async fn update(
    State(state): State<AppState>,
    PathId(id): PathId<ProductId>,
    Payload(dto): Payload<ProductDto>,
) -> Result<ApiResponse<ProductDto>> {
    let mut notifications = Notifications::new();
    if id != dto.id {
        notifications.notify(messages::ID_MISMATCH);
        return Ok(ApiResponse::failure(notifications));
    }

    let mut product = state
        .repositories()
        .products
        .get(id)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Err(errors) = dto.validate() {
        return Ok(ApiResponse::Failure(validation_messages(&errors)));
    }

    let price = match Price::new(dto.valor) {
        Ok(price) => price,
        Err(e) => {
            notifications.notify(ConversionError::from(e).to_string());
            return Ok(ApiResponse::failure(notifications));
        }
    };

    let mut stored_image = None;
    if dto.imagem_upload.as_deref().is_some_and(|p| !p.trim().is_empty()) {
        let Some(bytes) = decode_image(dto.imagem_upload.as_deref(), &mut notifications) else {
            return Ok(ApiResponse::failure(notifications));
        };
        let declared_name = dto
            .imagem
            .as_deref()
            .or(product.image.as_deref())
            .unwrap_or_default();
        let Some(file_name) = state
            .images()
            .store(declared_name, &bytes, &mut notifications)
            .await?
        else {
            return Ok(ApiResponse::failure(notifications));
        };
        product.image = Some(file_name.clone());
        stored_image = Some(file_name);
    }

    dto.nome.trim().clone_into(&mut product.name);
    dto.descricao.trim().clone_into(&mut product.description);
    product.price = price;
    product.active = dto.ativo;

    let result = state
        .product_service()
        .update(&product, &mut notifications)
        .await;
    if let Some(file_name) = stored_image
        && (result.is_err() || notifications.has_any())
    {
        state.images().discard(&file_name).await;
    }
    result?;

    Ok(ApiResponse::from_outcome(
        convert_product(&product),
        notifications,
    ))
}

/// Remove a product. The stored image file is kept.
#[instrument(skip_all, fields(product_id = %id))]
async fn delete(
    State(state): State<AppState>,
    PathId(id): PathId<ProductId>,
) -> Result<ApiResponse<ProductDto>> {
    let listing = state
        .repositories()
        .products
        .get_with_supplier(id)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut notifications = Notifications::new();
    state
        .product_service()
        .remove(id, &mut notifications)
        .await?;

    Ok(ApiResponse::from_outcome(
        convert_listing(&listing),
        notifications,
    ))
}

/// Convert a validated DTO and check its supplier exists, before any image
/// is written.
async fn checked_product(
    state: &AppState,
    dto: &ProductDto,
    notifications: &mut Notifications,
) -> Result<Option<Product>> {
    let product = match product_from_dto(dto) {
        Ok(product) => product,
        Err(e) => {
            notifications.notify(e.to_string());
            return Ok(None);
        }
    };

    let exists = state
        .product_service()
        .ensure_supplier(product.supplier_id, notifications)
        .await?;

    Ok(exists.then_some(product))
}

/// Store the image, then persist the product pointing at it.
///
/// The image is removed again if the product is rejected or the insert fails.
async fn add_with_image(
    state: &AppState,
    mut product: Product,
    declared_name: &str,
    bytes: &[u8],
    mut notifications: Notifications,
) -> Result<ApiResponse<ProductDto>> {
    let Some(file_name) = state
        .images()
        .store(declared_name, bytes, &mut notifications)
        .await?
    else {
        return Ok(ApiResponse::failure(notifications));
    };
    product.image = Some(file_name.clone());

    let result = state
        .product_service()
        .add(&product, &mut notifications)
        .await;
    if result.is_err() || notifications.has_any() {
        state.images().discard(&file_name).await;
    }
    result?;

    Ok(ApiResponse::from_outcome(
        convert_product(&product),
        notifications,
    ))
}
