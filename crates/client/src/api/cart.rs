//! Cart endpoints.
//!
//! The add endpoint accepts a signed quantity: positive adds units, negative
//! decrements them. The server owns line aggregation (merging duplicate
//! product lines), which is why the cart state machine never mirrors that
//! logic locally.

use reqwest::Method;
use tracing::instrument;

use kirana_core::{CartItemId, ProductId};

use super::types::RemoteCart;
use super::{ApiClient, ApiError, Auth};

impl ApiClient {
    /// Fetch the remote cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<RemoteCart, ApiError> {
        self.request(Method::GET, "/user/cart/", None, Auth::Bearer)
            .await
    }

    /// Add `quantity` units of a product to the cart (negative decrements).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, product: ProductId, quantity: i64) -> Result<(), ApiError> {
        self.request_unit(
            Method::POST,
            "/user/cart/add/",
            Some(serde_json::json!({ "product": product, "quantity": quantity })),
            Auth::Bearer,
        )
        .await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn remove_cart_item(&self, item: CartItemId) -> Result<(), ApiError> {
        self.request_unit(
            Method::DELETE,
            &format!("/user/cart/remove/{item}/"),
            None,
            Auth::Bearer,
        )
        .await
    }
}
