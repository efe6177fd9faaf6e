use fornecedores_core::{AddressId, Document, SupplierId, SupplierKind};

use super::ConversionError;
use super::product::convert_product;
use crate::dto::{AddressDto, SupplierDto};
use crate::models::{Address, Supplier};

/// Convert a supplier (and whatever joins it carries) into its DTO.
#[must_use]
pub fn convert_supplier(supplier: &Supplier) -> SupplierDto {
    SupplierDto {
        id: supplier.id,
        nome: supplier.name.clone(),
        documento: supplier.document.as_str().to_owned(),
        tipo_fornecedor: supplier.kind.code(),
        ativo: supplier.active,
        endereco: supplier.address.as_ref().map(convert_address),
        produtos: supplier.products.iter().map(convert_product).collect(),
    }
}

#[must_use]
pub fn convert_address(address: &Address) -> AddressDto {
    AddressDto {
        id: address.id,
        logradouro: address.street.clone(),
        numero: address.number.clone(),
        complemento: address.complement.clone(),
        cep: address.zip_code.clone(),
        bairro: address.district.clone(),
        cidade: address.city.clone(),
        estado: address.state.clone(),
        fornecedor_id: address.supplier_id,
    }
}

/// Build a supplier from a validated DTO.
///
/// A nil id becomes a fresh one. The address, when present, is owned by the
/// resulting supplier and gets its own id if it has none. Products in the
/// DTO are ignored.
///
/// # Errors
///
/// Returns `ConversionError` for an unknown kind or an invalid document.
pub fn supplier_from_dto(dto: &SupplierDto) -> Result<Supplier, ConversionError> {
    let kind = SupplierKind::try_from(dto.tipo_fornecedor)?;
    let document = Document::parse(&dto.documento, kind)?;
    let id = if dto.id.is_nil() {
        SupplierId::new()
    } else {
        dto.id
    };

    Ok(Supplier {
        id,
        name: dto.nome.trim().to_owned(),
        document,
        kind,
        active: dto.ativo,
        address: dto.endereco.as_ref().map(|a| address_from_dto(a, id)),
        products: Vec::new(),
    })
}

/// Build an address owned by `supplier_id` from a validated DTO.
#[must_use]
pub fn address_from_dto(dto: &AddressDto, supplier_id: SupplierId) -> Address {
    Address {
        id: if dto.id.is_nil() {
            AddressId::new()
        } else {
            dto.id
        },
        supplier_id,
        street: dto.logradouro.trim().to_owned(),
        number: dto.numero.trim().to_owned(),
        complement: dto
            .complemento
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned),
        zip_code: dto.cep.clone(),
        district: dto.bairro.trim().to_owned(),
        city: dto.cidade.trim().to_owned(),
        state: dto.estado.trim().to_owned(),
    }
}
