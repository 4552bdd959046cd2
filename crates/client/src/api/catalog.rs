//! Catalog read endpoints.
//!
//! Product lookups are cached (the cart refresh re-hydrates every line from
//! the catalog, so repeated lookups are the common case).

use reqwest::Method;
use tracing::{debug, instrument};

use kirana_core::ProductId;

use super::types::{Page, Product};
use super::{ApiClient, ApiError, Auth};

impl ApiClient {
    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        if let Some(product) = self.cached_product(id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: Product = self
            .request(
                Method::GET,
                &format!("/catalog/products/{id}/"),
                None,
                Auth::Bearer,
            )
            .await?;

        self.cache_product(product.clone()).await;
        Ok(product)
    }

    /// List products, paginated.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Product>, ApiError> {
        self.request(
            Method::GET,
            &format!("/catalog/products/?page={page}&page_size={page_size}"),
            None,
            Auth::Public,
        )
        .await
    }

    /// Search products by free-text query.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str, limit: u32) -> Result<Page<Product>, ApiError> {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.request(
            Method::GET,
            &format!("/catalog/products/?search={encoded}&limit={limit}"),
            None,
            Auth::Public,
        )
        .await
    }
}
