//! Backend collaborators: product lookup and account checks.
//!
//! The wizard never talks to the network itself. Once a profile is resolved
//! the caller uses a [`Catalog`] to fetch the recommended product and, at
//! checkout, to find out who is logged in and whether an email is registered.
//! No retries happen here; errors go back to the caller.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::CatalogError;
use crate::profile::ProductRef;

/// A subscription kit as served by `GET /api/productos/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "descripcion", default)]
    pub description: Option<String>,
    /// Monthly price in euros.
    #[serde(alias = "precio")]
    pub price: f64,
}

/// The logged-in user, from `GET /api/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    #[serde(alias = "correoElectronico")]
    pub email: String,
}

#[derive(Debug, Deserialize)]
struct EmailCheck {
    exists: bool,
}

/// Source of product and account data.
pub trait Catalog {
    fn product(&self, id: ProductRef) -> impl Future<Output = Result<Product, CatalogError>> + Send;

    /// `Ok(None)` when nobody is logged in.
    fn current_account(&self) -> impl Future<Output = Result<Option<Account>, CatalogError>> + Send;

    fn email_exists(&self, email: &str) -> impl Future<Output = Result<bool, CatalogError>> + Send;
}

/// REST client for the shop backend.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    api: Url,
    session_cookie: Option<String>,
}

impl HttpCatalog {
    /// `base_url` is the site root; endpoints are resolved under `<base>/api/`.
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        let mut root = base_url.trim().to_string();
        if !root.ends_with('/') {
            root.push('/');
        }
        let api = Url::parse(&root)?.join("api/")?;

        Ok(Self {
            client: Client::new(),
            api,
            session_cookie: None,
        })
    }

    /// Send `cookie` (e.g. `JSESSIONID=...`) with every request.
    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    pub fn api_url(&self) -> &Url {
        &self.api
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.session_cookie {
            Some(cookie) => request.header(reqwest::header::COOKIE, cookie),
            None => request,
        }
    }
}

impl Catalog for HttpCatalog {
    async fn product(&self, id: ProductRef) -> Result<Product, CatalogError> {
        let url = self.api.join(&format!("productos/{}", id.0))?;
        tracing::debug!(%url, "fetching product");

        let resp = self.get(url).send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Err(CatalogError::ProductNotFound(id.0)),
            status if status.is_success() => Ok(resp.json::<Product>().await?),
            status => Err(CatalogError::Status {
                endpoint: "productos".to_string(),
                status: status.as_u16(),
            }),
        }
    }

    async fn current_account(&self) -> Result<Option<Account>, CatalogError> {
        let url = self.api.join("auth/me")?;
        let resp = self.get(url).send().await?;
        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => Ok(Some(resp.json::<Account>().await?)),
            status => Err(CatalogError::Status {
                endpoint: "auth/me".to_string(),
                status: status.as_u16(),
            }),
        }
    }

    async fn email_exists(&self, email: &str) -> Result<bool, CatalogError> {
        let mut url = self.api.join("auth/check-email")?;
        url.query_pairs_mut().append_pair("email", email);

        let resp = self.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                endpoint: "auth/check-email".to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.json::<EmailCheck>().await?.exists)
    }
}

/// In-memory catalog for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: BTreeMap<ProductRef, Product>,
    account: Option<Account>,
    registered: BTreeSet<String>,
}

impl StaticCatalog {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products
                .into_iter()
                .map(|p| (ProductRef(p.id), p))
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_account(mut self, account: Account) -> Self {
        self.account = Some(account);
        self
    }

    pub fn with_registered_email(mut self, email: impl Into<String>) -> Self {
        self.registered.insert(email.into().to_lowercase());
        self
    }
}

impl Catalog for StaticCatalog {
    async fn product(&self, id: ProductRef) -> Result<Product, CatalogError> {
        self.products
            .get(&id)
            .cloned()
            .ok_or(CatalogError::ProductNotFound(id.0))
    }

    async fn current_account(&self) -> Result<Option<Account>, CatalogError> {
        Ok(self.account.clone())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, CatalogError> {
        Ok(self.registered.contains(&email.to_lowercase()))
    }
}
