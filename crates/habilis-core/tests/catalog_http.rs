//! HttpCatalog tests against a mocked backend.

use habilis_core::{Catalog, CatalogError, HttpCatalog, ProductRef};

#[tokio::test]
async fn fetches_product_by_id() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/productos/4")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"id":4,"nombre":"Inventor Kit: Solar Robot","descripcion":"Month one","precio":29.9,"stock":12}"#,
        )
        .create_async()
        .await;

    let catalog = HttpCatalog::new(&server.url()).unwrap();
    let product = catalog.product(ProductRef(4)).await.unwrap();

    assert_eq!(product.id, 4);
    assert_eq!(product.name, "Inventor Kit: Solar Robot");
    assert_eq!(product.price, 29.9);
    mock.assert_async().await;
}

#[tokio::test]
async fn missing_product_is_reported() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/productos/99")
        .with_status(404)
        .create_async()
        .await;

    let catalog = HttpCatalog::new(&server.url()).unwrap();
    let err = catalog.product(ProductRef(99)).await.unwrap_err();
    assert!(matches!(err, CatalogError::ProductNotFound(99)));
}

#[tokio::test]
async fn server_error_carries_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/productos/1")
        .with_status(500)
        .create_async()
        .await;

    let catalog = HttpCatalog::new(&server.url()).unwrap();
    let err = catalog.product(ProductRef(1)).await.unwrap_err();
    assert!(matches!(err, CatalogError::Status { status: 500, .. }));
}

#[tokio::test]
async fn unauthorized_means_anonymous() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/auth/me")
        .with_status(401)
        .create_async()
        .await;

    let catalog = HttpCatalog::new(&server.url()).unwrap();
    assert!(catalog.current_account().await.unwrap().is_none());
}

#[tokio::test]
async fn logged_in_account_sends_session_cookie() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/auth/me")
        .match_header("cookie", "JSESSIONID=abc")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":12,"correoElectronico":"mum@example.com","nombre":"Ana"}"#)
        .create_async()
        .await;

    let catalog = HttpCatalog::new(&server.url())
        .unwrap()
        .with_session_cookie("JSESSIONID=abc");
    let account = catalog.current_account().await.unwrap().unwrap();

    assert_eq!(account.id, 12);
    assert_eq!(account.email, "mum@example.com");
    mock.assert_async().await;
}

#[tokio::test]
async fn email_check_encodes_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/auth/check-email")
        .match_query(mockito::Matcher::UrlEncoded(
            "email".into(),
            "dad+kits@example.com".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"exists":true,"email":"dad+kits@example.com"}"#)
        .create_async()
        .await;

    let catalog = HttpCatalog::new(&server.url()).unwrap();
    assert!(catalog.email_exists("dad+kits@example.com").await.unwrap());
    mock.assert_async().await;
}
