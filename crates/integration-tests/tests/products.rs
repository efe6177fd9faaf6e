//! Product endpoints and image storage.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use fornecedores_integration_tests::{CNPJ, TestApp, product_body};

async fn app_with_supplier() -> (TestApp, String) {
    let mut app = TestApp::new();
    app.login().await;
    let supplier_id = app.create_supplier(CNPJ, 2).await;
    (app, supplier_id)
}

#[tokio::test]
async fn test_create_stores_image_and_product() {
    let (mut app, supplier_id) = app_with_supplier().await;

    let response = app
        .post_json("/api/produtos", &product_body(&supplier_id, "Caneta"))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);
    assert_eq!(response.body["success"], true);

    let data = response.data();
    let image = data["imagem"].as_str().unwrap();
    assert!(image.ends_with("_caneta.png"));
    assert!(data.get("imagemUpload").is_none());
    assert_eq!(data["valor"], 3.5);
    assert!(data["dataCadastro"].is_string());

    let on_disk = std::fs::read(app.image_dir().join(image)).unwrap();
    assert_eq!(on_disk, b"hello");
}

#[tokio::test]
async fn test_get_and_list_include_supplier_name() {
    let (mut app, supplier_id) = app_with_supplier().await;
    let id = app.create_product(&supplier_id, "Caneta").await;

    let response = app.get(&format!("/api/produtos/{id}")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["nomeFornecedor"], "Distribuidora Norte");
    assert_eq!(response.body["fornecedorId"], supplier_id.as_str());

    let response = app.get("/api/produtos").await;
    let products = response.body.as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["nomeFornecedor"], "Distribuidora Norte");
}

#[tokio::test]
async fn test_get_unknown_product_is_not_found() {
    let mut app = TestApp::new();

    let response = app.get(&format!("/api/produtos/{}", Uuid::new_v4())).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.text.is_empty());
}

#[tokio::test]
async fn test_create_without_image_is_rejected() {
    let (mut app, supplier_id) = app_with_supplier().await;

    let mut body = product_body(&supplier_id, "Caneta");
    body["imagemUpload"] = json!("");

    let response = app.post_json("/api/produtos", &body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.errors(), ["Provide an image for this product!"]);
    assert!(app.stored_images().is_empty());
    assert!(app.get("/api/produtos").await.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_with_invalid_base64_is_rejected() {
    let (mut app, supplier_id) = app_with_supplier().await;

    let mut body = product_body(&supplier_id, "Caneta");
    body["imagemUpload"] = json!("not base64!");

    let response = app.post_json("/api/produtos", &body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.errors(), ["The image is not valid base64!"]);
    assert!(app.stored_images().is_empty());
}

#[tokio::test]
async fn test_create_for_unknown_supplier_writes_no_image() {
    let mut app = TestApp::new();

    let response = app
        .post_json(
            "/api/produtos",
            &product_body(&Uuid::new_v4().to_string(), "Caneta"),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.errors(), ["Supplier not found!"]);
    assert!(app.stored_images().is_empty());
}

#[tokio::test]
async fn test_create_reports_field_errors() {
    let (mut app, supplier_id) = app_with_supplier().await;

    let mut body = product_body(&supplier_id, "C");
    body["valor"] = json!(0);

    let response = app.post_json("/api/produtos", &body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.errors(),
        [
            "nome: must be between 2 and 200 characters",
            "valor: must be greater than zero",
        ]
    );
}

#[tokio::test]
async fn test_create_rejects_overlong_image_name() {
    let (mut app, supplier_id) = app_with_supplier().await;

    let mut body = product_body(&supplier_id, "Caneta");
    body["imagem"] = json!(format!("{}.png", "a".repeat(230)));

    let response = app.post_json("/api/produtos", &body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.errors(),
        ["imagem: must be at most 200 characters"]
    );
    assert!(app.stored_images().is_empty());
}

#[tokio::test]
async fn test_create_rejects_prices_the_column_cannot_hold() {
    let (mut app, supplier_id) = app_with_supplier().await;

    let mut body = product_body(&supplier_id, "Caneta");
    body["valor"] = json!(0.001);
    let response = app.post_json("/api/produtos", &body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.errors(),
        ["valor: price cannot have more than two decimal places (got 0.001)"]
    );

    body["valor"] = json!(1e16);
    let response = app.post_json("/api/produtos", &body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.errors()[0].starts_with("valor: price must be less than 10^16"));

    assert!(app.stored_images().is_empty());
    assert!(app.get("/api/produtos").await.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_with_taken_id_keeps_the_first_product() {
    let (mut app, supplier_id) = app_with_supplier().await;
    let id = app.create_product(&supplier_id, "Caneta").await;

    let mut body = product_body(&supplier_id, "Lapis");
    body["id"] = json!(id);
    let response = app.post_json("/api/produtos", &body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.errors(), ["A record with this id already exists!"]);

    assert_eq!(app.stored_images().len(), 1);
    let stored = app.get(&format!("/api/produtos/{id}")).await;
    assert_eq!(stored.body["nome"], "Caneta");
}

#[tokio::test]
async fn test_non_uuid_id_is_not_found() {
    let mut app = TestApp::new();

    let response = app.get("/api/produtos/caneta").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.text.is_empty());

    let response = app.delete("/api/produtos/123").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_multipart_create_stores_uploaded_file() {
    let (mut app, supplier_id) = app_with_supplier().await;

    let response = app
        .post_multipart(
            "/api/produtos/Adicionar",
            &[
                ("fornecedorId", supplier_id.as_str()),
                ("nome", "Lapis"),
                ("descricao", "Lapis grafite"),
                ("valor", "1.25"),
                ("ativo", "true"),
            ],
            Some(("imagemUpload", "lapis.jpg", b"jpeg bytes")),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);

    let image = response.data()["imagem"].as_str().unwrap().to_owned();
    assert!(image.ends_with("_lapis.jpg"));
    assert_eq!(
        std::fs::read(app.image_dir().join(&image)).unwrap(),
        b"jpeg bytes"
    );

    let response = app.get("/api/produtos").await;
    assert_eq!(response.body[0]["nome"], "Lapis");
    assert_eq!(response.body[0]["valor"], 1.25);
}

#[tokio::test]
async fn test_multipart_create_requires_a_file() {
    let (mut app, supplier_id) = app_with_supplier().await;

    let response = app
        .post_multipart(
            "/api/produtos/Adicionar",
            &[
                ("fornecedorId", supplier_id.as_str()),
                ("nome", "Lapis"),
                ("descricao", "Lapis grafite"),
                ("valor", "1.25"),
                ("ativo", "true"),
            ],
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.errors(), ["Provide an image for this product!"]);
}

#[tokio::test]
async fn test_multipart_create_rejects_bad_scalars() {
    let (mut app, supplier_id) = app_with_supplier().await;

    let response = app
        .post_multipart(
            "/api/produtos/Adicionar",
            &[
                ("fornecedorId", supplier_id.as_str()),
                ("nome", "Lapis"),
                ("descricao", "Lapis grafite"),
                ("valor", "cheap"),
            ],
            Some(("imagemUpload", "lapis.jpg", b"jpeg bytes")),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.errors(), ["valor: has an invalid value"]);
    assert!(app.stored_images().is_empty());
}

#[tokio::test]
async fn test_multipart_create_rejects_overlong_file_name() {
    let (mut app, supplier_id) = app_with_supplier().await;
    let file_name = format!("{}.jpg", "l".repeat(230));

    let response = app
        .post_multipart(
            "/api/produtos/Adicionar",
            &[
                ("fornecedorId", supplier_id.as_str()),
                ("nome", "Lapis"),
                ("descricao", "Lapis grafite"),
                ("valor", "1.25"),
                ("ativo", "true"),
            ],
            Some(("imagemUpload", file_name.as_str(), b"jpeg bytes")),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.errors(),
        ["imagemUpload: file name must be at most 200 characters"]
    );
    assert!(app.stored_images().is_empty());
}

#[tokio::test]
async fn test_update_with_mismatched_id_changes_nothing() {
    let (mut app, supplier_id) = app_with_supplier().await;
    let id = app.create_product(&supplier_id, "Caneta").await;

    let mut body = product_body(&supplier_id, "Caneta Vermelha");
    body["id"] = json!(Uuid::new_v4());

    let response = app.put_json(&format!("/api/produtos/{id}"), &body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.errors(),
        ["The id provided is not the same as the one in the route!"]
    );

    let stored = app.get(&format!("/api/produtos/{id}")).await;
    assert_eq!(stored.body["nome"], "Caneta");
}

#[tokio::test]
async fn test_update_unknown_product_is_not_found() {
    let (mut app, supplier_id) = app_with_supplier().await;
    let id = Uuid::new_v4();

    let mut body = product_body(&supplier_id, "Caneta");
    body["id"] = json!(id);

    let response = app.put_json(&format!("/api/produtos/{id}"), &body).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_keeps_image_owner_and_date() {
    let (mut app, supplier_id) = app_with_supplier().await;
    let id = app.create_product(&supplier_id, "Caneta").await;
    let before = app.get(&format!("/api/produtos/{id}")).await;

    let mut body = product_body(&Uuid::new_v4().to_string(), "Caneta Vermelha");
    body["id"] = json!(id);
    body["imagemUpload"] = serde_json::Value::Null;
    body["valor"] = json!(4.75);
    body["ativo"] = json!(false);
    body["dataCadastro"] = json!("2001-01-01T00:00:00Z");

    let response = app.put_json(&format!("/api/produtos/{id}"), &body).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);

    let after = app.get(&format!("/api/produtos/{id}")).await;
    assert_eq!(after.body["nome"], "Caneta Vermelha");
    assert_eq!(after.body["valor"], 4.75);
    assert_eq!(after.body["ativo"], false);
    assert_eq!(after.body["imagem"], before.body["imagem"]);
    assert_eq!(after.body["fornecedorId"], supplier_id.as_str());
    assert_eq!(after.body["dataCadastro"], before.body["dataCadastro"]);
    assert_eq!(app.stored_images().len(), 1);
}

#[tokio::test]
async fn test_update_with_new_image_stores_it() {
    let (mut app, supplier_id) = app_with_supplier().await;
    let id = app.create_product(&supplier_id, "Caneta").await;

    let mut body = product_body(&supplier_id, "Caneta");
    body["id"] = json!(id);
    body["imagem"] = json!("nova.png");
    body["imagemUpload"] = json!("bm92YQ==");

    let response = app.put_json(&format!("/api/produtos/{id}"), &body).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);

    let image = response.data()["imagem"].as_str().unwrap().to_owned();
    assert!(image.ends_with("_nova.png"));
    assert_eq!(std::fs::read(app.image_dir().join(&image)).unwrap(), b"nova");
}

#[tokio::test]
async fn test_delete_returns_removed_product() {
    let (mut app, supplier_id) = app_with_supplier().await;
    let id = app.create_product(&supplier_id, "Caneta").await;

    let response = app.delete(&format!("/api/produtos/{id}")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["nome"], "Caneta");

    let response = app.get(&format!("/api/produtos/{id}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.delete(&format!("/api/produtos/{id}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
