//! Payment gateway endpoints.
//!
//! The gateway path never creates a local order up front: the server issues
//! a payment session, the hosted widget collects a signed completion, and
//! only the verification endpoint turns that into an order.

use reqwest::Method;
use serde_json::Value;
use tracing::instrument;

use kirana_core::AddressId;

use super::types::{PaymentCompletion, PaymentSession};
use super::{ApiClient, ApiError, Auth};

impl ApiClient {
    /// Request a server-issued payment session for the current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn create_payment_session(&self) -> Result<PaymentSession, ApiError> {
        self.request(
            Method::POST,
            "/payments/create-razorpay-order/",
            Some(serde_json::json!({})),
            Auth::Bearer,
        )
        .await
    }

    /// Verify a signed payment completion server-side.
    ///
    /// Returns the raw JSON body for shape-tolerant order-id extraction.
    ///
    /// # Errors
    ///
    /// Returns an error if verification is rejected or the request fails.
    #[instrument(skip(self, completion))]
    pub async fn verify_payment(
        &self,
        completion: &PaymentCompletion,
        billing: AddressId,
        shipping: AddressId,
    ) -> Result<Value, ApiError> {
        self.request_value(
            Method::POST,
            "/users/verify/",
            Some(serde_json::json!({
                "razorpay_order_id": completion.razorpay_order_id,
                "razorpay_payment_id": completion.razorpay_payment_id,
                "razorpay_signature": completion.razorpay_signature,
                "billing_address": billing,
                "shipping_address": shipping,
            })),
            Auth::Bearer,
        )
        .await
    }
}
