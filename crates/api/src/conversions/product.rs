use chrono::Utc;

use fornecedores_core::{Price, ProductId};

use super::ConversionError;
use crate::dto::ProductDto;
use crate::models::{Product, ProductListing};

#[must_use]
pub fn convert_product(product: &Product) -> ProductDto {
    ProductDto {
        id: product.id,
        fornecedor_id: product.supplier_id,
        nome: product.name.clone(),
        descricao: product.description.clone(),
        imagem_upload: None,
        imagem: product.image.clone(),
        valor: product.price.amount(),
        data_cadastro: Some(product.created_at),
        ativo: product.active,
        nome_fornecedor: None,
    }
}

/// Convert a product joined with its supplier, filling `nomeFornecedor`.
#[must_use]
pub fn convert_listing(listing: &ProductListing) -> ProductDto {
    ProductDto {
        nome_fornecedor: Some(listing.supplier_name.clone()),
        ..convert_product(&listing.product)
    }
}

/// Build a new product from a validated DTO.
///
/// A nil id becomes a fresh one and the registration time is now; any
/// `dataCadastro` or `nomeFornecedor` sent by the client is ignored. The
/// image is taken from `imagem`, which callers set to the stored filename.
///
/// # Errors
///
/// Returns `ConversionError::Price` for a negative price.
pub fn product_from_dto(dto: &ProductDto) -> Result<Product, ConversionError> {
    Ok(Product {
        id: if dto.id.is_nil() {
            ProductId::new()
        } else {
            dto.id
        },
        supplier_id: dto.fornecedor_id,
        name: dto.nome.trim().to_owned(),
        description: dto.descricao.trim().to_owned(),
        image: dto.imagem.clone(),
        price: Price::new(dto.valor)?,
        created_at: Utc::now(),
        active: dto.ativo,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use fornecedores_core::SupplierId;

    use super::*;

    fn product() -> Product {
        Product {
            id: ProductId::new(),
            supplier_id: SupplierId::new(),
            name: "Caneta".to_owned(),
            description: "Caneta azul".to_owned(),
            image: Some("abc_caneta.png".to_owned()),
            price: Price::new(Decimal::new(350, 2)).unwrap(),
            created_at: Utc::now() - Duration::days(3),
            active: true,
        }
    }

    #[test]
    fn supplier_name_comes_only_from_listing() {
        let product = product();
        assert_eq!(convert_product(&product).nome_fornecedor, None);

        let dto = convert_listing(&ProductListing {
            product: product.clone(),
            supplier_name: "Distribuidora Norte".to_owned(),
        });
        assert_eq!(dto.nome_fornecedor.as_deref(), Some("Distribuidora Norte"));
        assert_eq!(dto.imagem.as_deref(), Some("abc_caneta.png"));
    }

    #[test]
    fn round_trip_keeps_scalars_but_not_timestamp() {
        let product = product();
        let back = product_from_dto(&convert_product(&product)).unwrap();

        assert_eq!(back.id, product.id);
        assert_eq!(back.supplier_id, product.supplier_id);
        assert_eq!(back.name, product.name);
        assert_eq!(back.price, product.price);
        assert_eq!(back.image, product.image);
        assert!(back.created_at > product.created_at);
    }

    #[test]
    fn negative_price_is_rejected() {
        let dto = ProductDto {
            valor: Decimal::new(-1, 0),
            ..convert_product(&product())
        };
        assert!(matches!(
            product_from_dto(&dto),
            Err(ConversionError::Price(_))
        ));
    }
}
