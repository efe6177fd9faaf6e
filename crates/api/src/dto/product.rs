//! Product bodies: JSON with a base64 image, or a multipart form with a file part.

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use fornecedores_core::{ProductId, SupplierId};

use super::{positive_amount, required_supplier};
use crate::notification::Notifications;
use crate::storage::MAX_IMAGE_NAME;

/// Name of the multipart part carrying the image file.
pub const IMAGE_PART: &str = "imagemUpload";

/// Product as sent and received over HTTP.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductDto {
    pub id: ProductId,

    #[validate(custom(function = "required_supplier"))]
    pub fornecedor_id: SupplierId,

    #[validate(length(min = 2, max = 200, message = "must be between 2 and 200 characters"))]
    pub nome: String,

    #[validate(length(min = 2, max = 1000, message = "must be between 2 and 1000 characters"))]
    pub descricao: String,

    /// Base64 image payload. Accepted on input, never echoed back.
    #[serde(skip_serializing)]
    pub imagem_upload: Option<String>,

    /// Image filename: the declared name on input, the stored name on output.
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub imagem: Option<String>,

    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "positive_amount"))]
    pub valor: Decimal,

    /// Set by the server on create.
    pub data_cadastro: Option<DateTime<Utc>>,

    pub ativo: bool,

    /// Supplier display name; derived on reads, ignored on writes.
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub nome_fornecedor: Option<String>,
}

/// A file part received in a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Client-supplied file name.
    pub file_name: String,
    pub bytes: Bytes,
}

/// Multipart variant of the product create body.
///
/// Scalar fields use the same names as [`ProductDto`]; the image arrives as a
/// file part named `imagemUpload`.
#[derive(Debug, Clone, Default)]
pub struct ProductImageForm {
    pub product: ProductDto,
    pub upload: Option<UploadedFile>,
}

impl ProductImageForm {
    /// Read every part of the form.
    ///
    /// Unparseable scalar values are recorded on `notifications` and leave
    /// the field at its default; unknown parts are skipped.
    ///
    /// # Errors
    ///
    /// Returns `MultipartError` if the body is not a well-formed multipart stream.
    pub async fn read(
        multipart: &mut Multipart,
        notifications: &mut Notifications,
    ) -> Result<Self, MultipartError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == IMAGE_PART {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                if file_name.chars().count() > MAX_IMAGE_NAME {
                    notifications.notify(format!(
                        "{IMAGE_PART}: file name must be at most {MAX_IMAGE_NAME} characters"
                    ));
                }
                let bytes = field.bytes().await?;
                form.upload = Some(UploadedFile { file_name, bytes });
                continue;
            }

            let value = field.text().await?;
            let value = value.trim();
            let product = &mut form.product;
            match name.as_str() {
                "id" => parse_into(&name, value, &mut product.id, notifications),
                "fornecedorId" => {
                    parse_into(&name, value, &mut product.fornecedor_id, notifications);
                }
                "nome" => value.clone_into(&mut product.nome),
                "descricao" => value.clone_into(&mut product.descricao),
                "imagem" => product.imagem = Some(value.to_owned()),
                "valor" => parse_into(&name, value, &mut product.valor, notifications),
                "ativo" => {
                    let lowered = value.to_ascii_lowercase();
                    parse_into(&name, &lowered, &mut product.ativo, notifications);
                }
                other => tracing::debug!(field = other, "ignoring unknown form field"),
            }
        }

        Ok(form)
    }
}

fn parse_into<T: std::str::FromStr>(
    name: &str,
    value: &str,
    target: &mut T,
    notifications: &mut Notifications,
) {
    if value.is_empty() {
        return;
    }
    match value.parse() {
        Ok(parsed) => *target = parsed,
        Err(_) => notifications.notify(format!("{name}: has an invalid value")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dto::validation_messages;

    #[test]
    fn upload_is_read_but_never_written() {
        let dto: ProductDto = serde_json::from_value(json!({
            "fornecedorId": "6f1c2a4e-8f3b-4c1d-9a7e-2b5d8c0e1f23",
            "nome": "Caneta",
            "descricao": "Caneta azul",
            "imagemUpload": "aGVsbG8=",
            "imagem": "caneta.png",
            "valor": 3.5,
            "ativo": true,
            "nomeFornecedor": "ignored"
        }))
        .unwrap();

        assert_eq!(dto.imagem_upload.as_deref(), Some("aGVsbG8="));
        assert_eq!(dto.nome_fornecedor, None);
        assert_eq!(dto.valor, Decimal::new(35, 1));
        assert!(dto.validate().is_ok());

        let out = serde_json::to_value(&dto).unwrap();
        assert!(out.get("imagemUpload").is_none());
        assert_eq!(out["valor"], json!(3.5));
    }

    #[test]
    fn missing_supplier_and_price_fail_validation() {
        let dto = ProductDto {
            nome: "Caneta".to_owned(),
            descricao: "Caneta azul".to_owned(),
            ..ProductDto::default()
        };

        assert_eq!(
            validation_messages(&dto.validate().unwrap_err()),
            vec!["fornecedorId: is required", "valor: must be greater than zero"]
        );
    }

    #[test]
    fn declared_image_name_is_bounded() {
        let dto = ProductDto {
            fornecedor_id: SupplierId::new(),
            nome: "Caneta".to_owned(),
            descricao: "Caneta azul".to_owned(),
            imagem: Some(format!("{}.png", "a".repeat(230))),
            valor: Decimal::ONE,
            ..ProductDto::default()
        };

        assert_eq!(
            validation_messages(&dto.validate().unwrap_err()),
            vec!["imagem: must be at most 200 characters"]
        );
    }

    #[test]
    fn parse_into_records_bad_values() {
        let mut notifications = Notifications::new();
        let mut price = Decimal::ZERO;

        parse_into("valor", "12.40", &mut price, &mut notifications);
        assert_eq!(price, Decimal::new(1240, 2));

        parse_into("valor", "doze", &mut price, &mut notifications);
        assert_eq!(price, Decimal::new(1240, 2));
        assert_eq!(notifications.messages(), ["valor: has an invalid value"]);
    }
}
