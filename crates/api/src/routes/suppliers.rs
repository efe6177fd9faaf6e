//! Supplier and address route handlers.
//!
//! Everything except the listing requires a logged-in user.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};
use tracing::instrument;
use validator::Validate;

use fornecedores_core::{AddressId, SupplierId};

use super::{PathId, Payload};
use crate::conversions::{address_from_dto, convert_address, convert_supplier, supplier_from_dto};
use crate::dto::{AddressDto, SupplierDto, validation_messages};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::notification::{ApiResponse, Notifications};
use crate::services::messages;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id).put(update).delete(delete))
        .route("/obter-endereco/{id}", get(get_address))
        .route("/atualizar-endereco/{id}", put(update_address))
}

/// List all suppliers, without address or products.
#[instrument(skip_all)]
async fn list(State(state): State<AppState>) -> Result<Json<Vec<SupplierDto>>> {
    let suppliers = state.repositories().suppliers.list().await?;
    Ok(Json(suppliers.iter().map(convert_supplier).collect()))
}

/// A supplier with its address and products.
#[instrument(skip_all, fields(supplier_id = %id))]
async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<SupplierId>,
) -> Result<Json<SupplierDto>> {
    let supplier = state
        .repositories()
        .suppliers
        .get_with_products_and_address(id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(convert_supplier(&supplier)))
}

/// Create a supplier together with its address.
#[instrument(skip_all, fields(user_id = %user.id))]
async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Payload(dto): Payload<SupplierDto>,
) -> Result<ApiResponse<SupplierDto>> {
    if let Err(errors) = dto.validate() {
        return Ok(ApiResponse::Failure(validation_messages(&errors)));
    }

    let mut notifications = Notifications::new();
    let supplier = match supplier_from_dto(&dto) {
        Ok(supplier) => supplier,
        Err(e) => {
            notifications.notify(e.to_string());
            return Ok(ApiResponse::failure(notifications));
        }
    };

    state
        .supplier_service()
        .add(&supplier, &mut notifications)
        .await?;

    Ok(ApiResponse::from_outcome(
        convert_supplier(&supplier),
        notifications,
    ))
}

/// Update a supplier's own fields. The address is updated separately.
#[instrument(skip_all, fields(supplier_id = %id, user_id = %user.id))]
async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<SupplierId>,
    Payload(dto): Payload<SupplierDto>,
) -> Result<ApiResponse<SupplierDto>> {
    let mut notifications = Notifications::new();
    if id != dto.id {
        notifications.notify(messages::ID_MISMATCH);
        return Ok(ApiResponse::failure(notifications));
    }

    if let Err(errors) = dto.validate() {
        return Ok(ApiResponse::Failure(validation_messages(&errors)));
    }

    let supplier = match supplier_from_dto(&dto) {
        Ok(supplier) => supplier,
        Err(e) => {
            notifications.notify(e.to_string());
            return Ok(ApiResponse::failure(notifications));
        }
    };

    let suppliers = state.supplier_service();
    suppliers.update(&supplier, &mut notifications).await?;
    if notifications.has_any() {
        return Ok(ApiResponse::failure(notifications));
    }

    let updated = state
        .repositories()
        .suppliers
        .get_with_address(id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::Success(convert_supplier(&updated)))
}

/// Remove a supplier and its address. Refused while it still has products.
#[instrument(skip_all, fields(supplier_id = %id, user_id = %user.id))]
async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<SupplierId>,
) -> Result<ApiResponse<SupplierDto>> {
    let supplier = state
        .repositories()
        .suppliers
        .get_with_address(id)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut notifications = Notifications::new();
    state
        .supplier_service()
        .remove(id, &mut notifications)
        .await?;

    Ok(ApiResponse::from_outcome(
        convert_supplier(&supplier),
        notifications,
    ))
}

#[instrument(skip_all, fields(address_id = %id))]
async fn get_address(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<AddressId>,
) -> Result<Json<AddressDto>> {
    let address = state
        .repositories()
        .addresses
        .get(id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(convert_address(&address)))
}

/// Update an address. The owning supplier cannot change.
#[instrument(skip_all, fields(address_id = %id, user_id = %user.id))]
async fn update_address(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<AddressId>,
    Payload(dto): Payload<AddressDto>,
) -> Result<ApiResponse<AddressDto>> {
    let mut notifications = Notifications::new();
    if id != dto.id {
        notifications.notify(messages::ID_MISMATCH);
        return Ok(ApiResponse::failure(notifications));
    }

    if let Err(errors) = dto.validate_standalone() {
        return Ok(ApiResponse::Failure(validation_messages(&errors)));
    }

    let address = address_from_dto(&dto, dto.fornecedor_id);
    state
        .supplier_service()
        .update_address(&address, &mut notifications)
        .await?;

    Ok(ApiResponse::from_outcome(
        convert_address(&address),
        notifications,
    ))
}
