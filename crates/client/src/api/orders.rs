//! Order endpoints.
//!
//! Order creation returns the raw JSON body: the backend has shipped several
//! response shapes for it, so the checkout flow runs the body through a
//! single shape-tolerant id extractor instead of a fixed struct.

use reqwest::Method;
use serde_json::Value;
use tracing::instrument;

use kirana_core::{AddressId, OrderId};

use super::types::{OrderSummary, Page};
use super::{ApiClient, ApiError, Auth};

impl ApiClient {
    /// Create a cash-on-delivery order, seeded `confirmed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn create_cod_order(
        &self,
        billing: AddressId,
        shipping: AddressId,
    ) -> Result<Value, ApiError> {
        self.request_value(
            Method::POST,
            "/user/orders/create/",
            Some(serde_json::json!({
                "billing_address": billing,
                "shipping_address": shipping,
                "payment_method": "cod",
                "status": "confirmed",
            })),
            Auth::Bearer,
        )
        .await
    }

    /// List the user's orders.
    ///
    /// Tolerates both a plain array and a paginated envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<OrderSummary>, ApiError> {
        let value = self
            .request_value(Method::GET, "/user/orders/", None, Auth::Bearer)
            .await?;

        if value.is_array() {
            return serde_json::from_value(value).map_err(ApiError::Parse);
        }
        let page: Page<OrderSummary> = serde_json::from_value(value).map_err(ApiError::Parse)?;
        Ok(page.results)
    }

    /// Fetch one order by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the request fails.
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: &OrderId) -> Result<OrderSummary, ApiError> {
        self.request(
            Method::GET,
            &format!("/user/orders/{id}/"),
            None,
            Auth::Bearer,
        )
        .await
    }
}
