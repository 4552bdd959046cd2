//! The request interface the cart and checkout consume.
//!
//! [`StoreBackend`] covers exactly the backend operations the state machine
//! and orchestrator need. [`crate::api::ApiClient`] is the production
//! implementation; tests drive the same code against an in-process fake.

use serde_json::Value;

use kirana_core::{AddressId, CartItemId, ProductId};

use crate::api::ApiError;
use crate::api::types::{
    Address, AddressInput, PaymentCompletion, PaymentSession, Product, RemoteCart,
};

/// Remote store operations, as seen by the cart and checkout.
#[allow(async_fn_in_trait)]
pub trait StoreBackend: Send + Sync {
    /// Fetch the remote cart.
    async fn get_cart(&self) -> Result<RemoteCart, ApiError>;

    /// Fetch a product by id (used to hydrate cart lines).
    async fn get_product(&self, id: ProductId) -> Result<Product, ApiError>;

    /// Add `quantity` units of a product (negative decrements).
    async fn add_to_cart(&self, product: ProductId, quantity: i64) -> Result<(), ApiError>;

    /// Remove a cart line.
    async fn remove_cart_item(&self, item: CartItemId) -> Result<(), ApiError>;

    /// List saved addresses.
    async fn list_addresses(&self) -> Result<Vec<Address>, ApiError>;

    /// Create an address, returning the server's canonical record.
    async fn create_address(&self, input: &AddressInput) -> Result<Address, ApiError>;

    /// Replace an address.
    async fn update_address(&self, id: AddressId, input: &AddressInput)
    -> Result<Address, ApiError>;

    /// Delete an address.
    async fn delete_address(&self, id: AddressId) -> Result<(), ApiError>;

    /// Create a cash-on-delivery order; raw body for id extraction.
    async fn create_cod_order(&self, billing: AddressId, shipping: AddressId)
    -> Result<Value, ApiError>;

    /// Request a server-issued payment session.
    async fn create_payment_session(&self) -> Result<PaymentSession, ApiError>;

    /// Verify a signed payment completion; raw body for id extraction.
    async fn verify_payment(
        &self,
        completion: &PaymentCompletion,
        billing: AddressId,
        shipping: AddressId,
    ) -> Result<Value, ApiError>;
}

impl StoreBackend for crate::api::ApiClient {
    async fn get_cart(&self) -> Result<RemoteCart, ApiError> {
        Self::get_cart(self).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        Self::get_product(self, id).await
    }

    async fn add_to_cart(&self, product: ProductId, quantity: i64) -> Result<(), ApiError> {
        Self::add_to_cart(self, product, quantity).await
    }

    async fn remove_cart_item(&self, item: CartItemId) -> Result<(), ApiError> {
        Self::remove_cart_item(self, item).await
    }

    async fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
        Self::list_addresses(self).await
    }

    async fn create_address(&self, input: &AddressInput) -> Result<Address, ApiError> {
        Self::create_address(self, input).await
    }

    async fn update_address(
        &self,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<Address, ApiError> {
        Self::update_address(self, id, input).await
    }

    async fn delete_address(&self, id: AddressId) -> Result<(), ApiError> {
        Self::delete_address(self, id).await
    }

    async fn create_cod_order(
        &self,
        billing: AddressId,
        shipping: AddressId,
    ) -> Result<Value, ApiError> {
        Self::create_cod_order(self, billing, shipping).await
    }

    async fn create_payment_session(&self) -> Result<PaymentSession, ApiError> {
        Self::create_payment_session(self).await
    }

    async fn verify_payment(
        &self,
        completion: &PaymentCompletion,
        billing: AddressId,
        shipping: AddressId,
    ) -> Result<Value, ApiError> {
        Self::verify_payment(self, completion, billing, shipping).await
    }
}
