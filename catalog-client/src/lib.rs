//! Typed client for the storefront REST API.
//!
//! Reads go through a [`DeduplicatedFetcher`], so concurrent page loads share one call
//! and repeated reads within the cache TTL never leave the process. Writes go straight
//! to the API and, once they succeed, invalidate every cached read of the collections
//! they touch.

pub mod config;
mod error;
pub mod models;


pub use config::Config;
pub use error::Error;
pub use fetch_cache::cache::CacheConfig;
pub use fetch_cache::{DeduplicatedFetcher, SurfTransport, Transport};

use fetch_cache::{Method, RequestOptions, Response};
use models::auth::{Credentials, Session};
use models::category::{Category, CategoryDraft};
use models::contact::ContactRequest;
use models::health::HealthStatus;
use models::product::{Product, ProductDraft, ProductQuery, RelatedProducts};
use models::ApiMessage;
use serde::de::DeserializeOwned;

/// Resource collections exposed by the API; their paths double as invalidation patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::AsRefStr, strum_macros::Display)]
pub enum Collection {
    #[strum(serialize = "/api/products")]
    Products,
    #[strum(serialize = "/api/categories")]
    Categories,
}

impl Collection {
    pub fn path(&self) -> &str {
        self.as_ref()
    }

    pub fn item_path(&self, id: &str) -> Result<String, Error> {
        Ok(format!("{}/{}", self.path(), path_segment(id)?))
    }
}

const LOGIN_PATH: &str = "/api/auth/login";
const CONTACT_PATH: &str = "/api/contact-request";
const HEALTH_PATH: &str = "/api/health";

fn path_segment(id: &str) -> Result<&str, Error> {
    let id = id.trim();
    if id.is_empty() || id.contains(['/', '?', '#']) {
        return Err(Error::Validation(format!("Invalid resource id: {:?}", id)));
    }
    Ok(id)
}

fn json_options() -> RequestOptions {
    RequestOptions::new().with_header("accept", "application/json")
}

fn admin_options(token: &str) -> RequestOptions {
    json_options().with_bearer_token(token)
}

fn form_options(method: Method, token: &str, fields: &[(&'static str, String)]) -> RequestOptions {
    admin_options(token)
        .with_method(method)
        .with_form(fields.iter().map(|(name, value)| (*name, value.as_str())))
}

pub struct CatalogClient<T: Transport = SurfTransport> {
    fetcher: DeduplicatedFetcher<T>,
}

impl<T: Transport> Clone for CatalogClient<T> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
        }
    }
}

impl CatalogClient<SurfTransport> {
    /// Build a surf-backed client from configuration.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let transport = SurfTransport::new(config.base_url()?, Some(config.timeout()))?;
        log::info!(
            "Initialized catalog client for {} (cache TTL: {}s, enabled: {})",
            config.api_url(),
            config.cache().ttl_secs(),
            config.cache().enabled()
        );
        Ok(Self::new(transport, config.cache_config()))
    }
}

impl<T: Transport> CatalogClient<T> {
    pub fn new(transport: T, cache_config: CacheConfig) -> Self {
        Self::with_fetcher(DeduplicatedFetcher::new(transport, cache_config))
    }

    /// Share an existing fetcher, and with it its cache.
    pub fn with_fetcher(fetcher: DeduplicatedFetcher<T>) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &DeduplicatedFetcher<T> {
        &self.fetcher
    }

    /// Active products, optionally filtered by category, featured flag or search term.
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, Error> {
        self.read(&query.to_path(Collection::Products.path()), json_options())
            .await
    }

    /// Every product including inactive ones. Admin only.
    pub async fn all_products(&self, token: &str) -> Result<Vec<Product>, Error> {
        let path = format!("{}/all", Collection::Products);
        self.read(&path, admin_options(token)).await
    }

    pub async fn product(&self, id: &str) -> Result<Product, Error> {
        let path = Collection::Products.item_path(id)?;
        self.read(&path, json_options()).await
    }

    pub async fn related_products(&self, id: &str) -> Result<RelatedProducts, Error> {
        let path = format!("{}/related", Collection::Products.item_path(id)?);
        self.read(&path, json_options()).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, Error> {
        self.read(Collection::Categories.path(), json_options()).await
    }

    /// Every category including inactive ones. Admin only.
    pub async fn all_categories(&self, token: &str) -> Result<Vec<Category>, Error> {
        let path = format!("{}/all", Collection::Categories);
        self.read(&path, admin_options(token)).await
    }

    /// Look a category up by id or slug.
    pub async fn category(&self, id_or_slug: &str) -> Result<Category, Error> {
        let path = Collection::Categories.item_path(id_or_slug)?;
        self.read(&path, json_options()).await
    }

    /// API and database status. A failing database still yields a status, not an error.
    pub async fn health(&self) -> Result<HealthStatus, Error> {
        let mut response = self.fetcher.fetch(HEALTH_PATH, json_options()).await?;
        if response.ok() || response.status() == 500 {
            if let Ok(status) = response.json::<HealthStatus>() {
                return Ok(status);
            }
        }
        Err(Error::Api {
            status: response.status(),
            message: "Health check failed".to_string(),
        })
    }

    pub async fn create_product(&self, token: &str, draft: &ProductDraft) -> Result<Product, Error> {
        draft.validate().map_err(Error::Validation)?;
        let fields = draft.form_fields().map_err(|err| Error::Validation(err.to_string()))?;
        let options = form_options(Method::Post, token, &fields);

        self.write(Collection::Products.path(), options, &[Collection::Products.path()])
            .await
    }

    pub async fn update_product(
        &self,
        token: &str,
        id: &str,
        draft: &ProductDraft,
    ) -> Result<Product, Error> {
        draft.validate().map_err(Error::Validation)?;
        let path = Collection::Products.item_path(id)?;
        let fields = draft.form_fields().map_err(|err| Error::Validation(err.to_string()))?;
        let options = form_options(Method::Put, token, &fields);

        self.write(&path, options, &[path.as_str(), Collection::Products.path()])
            .await
    }

    pub async fn delete_product(&self, token: &str, id: &str) -> Result<ApiMessage, Error> {
        let path = Collection::Products.item_path(id)?;
        let options = admin_options(token).with_method(Method::Delete);

        self.write(&path, options, &[path.as_str(), Collection::Products.path()])
            .await
    }

    pub async fn create_category(
        &self,
        token: &str,
        draft: &CategoryDraft,
    ) -> Result<Category, Error> {
        draft.validate().map_err(Error::Validation)?;
        let options = form_options(Method::Post, token, &draft.form_fields());

        self.write(
            Collection::Categories.path(),
            options,
            &[Collection::Categories.path()],
        )
        .await
    }

    pub async fn update_category(
        &self,
        token: &str,
        id: &str,
        draft: &CategoryDraft,
    ) -> Result<Category, Error> {
        draft.validate().map_err(Error::Validation)?;
        let path = Collection::Categories.item_path(id)?;
        let options = form_options(Method::Put, token, &draft.form_fields());

        self.write(&path, options, &[path.as_str(), Collection::Categories.path()])
            .await
    }

    /// Deleting a category also deletes its products, so both collections are invalidated.
    pub async fn delete_category(&self, token: &str, id: &str) -> Result<ApiMessage, Error> {
        let path = Collection::Categories.item_path(id)?;
        let options = admin_options(token).with_method(Method::Delete);

        self.write(
            &path,
            options,
            &[
                path.as_str(),
                Collection::Categories.path(),
                Collection::Products.path(),
            ],
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, Error> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let credentials = Credentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let options = json_options()
            .with_method(Method::Post)
            .with_json(&credentials)
            .map_err(|err| Error::Validation(err.to_string()))?;

        self.write(LOGIN_PATH, options, &[]).await
    }

    pub async fn submit_contact_request(&self, request: &ContactRequest) -> Result<ApiMessage, Error> {
        request.validate().map_err(Error::Validation)?;
        let options = json_options()
            .with_method(Method::Post)
            .with_json(request)
            .map_err(|err| Error::Validation(err.to_string()))?;

        self.write(CONTACT_PATH, options, &[]).await
    }

    async fn read<D: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<D, Error> {
        let response = self.fetcher.fetch(path, options).await?;
        decode(response)
    }

    /// Send a write and invalidate `patterns` once the API accepted it.
    async fn write<D: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
        patterns: &[&str],
    ) -> Result<D, Error> {
        let response = self.fetcher.fetch(path, options).await?;
        if response.ok() {
            for pattern in patterns {
                self.fetcher.clear_cache_for_pattern(pattern);
            }
        }
        decode(response)
    }
}

fn decode<D: DeserializeOwned>(mut response: Response) -> Result<D, Error> {
    if !response.ok() {
        let status = response.status();
        let message = response
            .json::<ApiMessage>()
            .map(|body| body.message)
            .unwrap_or_else(|_| format!("Request failed with status {}", status));
        return Err(Error::Api { status, message });
    }
    Ok(response.json()?)
}
