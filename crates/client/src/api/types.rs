//! Wire types for the storefront REST API.
//!
//! Response shapes are normalized on deserialization: the backend omits or
//! nulls optional textual fields freely, so everything downstream sees
//! empty-string defaults and a fixed default country instead of `Option`s.

use chrono::{DateTime, Utc};
use kirana_core::{AddressId, CartItemId, OrderId, Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Cart
// =============================================================================

/// Remote cart envelope returned by `GET /user/cart/`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCart {
    #[serde(default)]
    pub items: Vec<RemoteCartLine>,
}

/// One line of the remote cart.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCartLine {
    pub id: CartItemId,
    pub product: ProductRef,
    pub quantity: i64,
}

/// Product reference inside a cart line.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRef {
    pub id: ProductId,
}

// =============================================================================
// Catalog
// =============================================================================

/// Product detail returned by `GET /catalog/products/{id}/`.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Serialized as a decimal string by the backend.
    pub price: Decimal,
    /// Image list, passed through untyped for display layers.
    #[serde(default)]
    pub images: serde_json::Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stock: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

/// Paginated list envelope (`{count, next, previous, results}`).
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub results: Vec<T>,
}

// =============================================================================
// Addresses
// =============================================================================

/// Billing or shipping flavor of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    #[default]
    Billing,
    Shipping,
}

/// A saved postal/contact record, normalized from the wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gst_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub street_address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub postal_code: String,
    #[serde(default = "default_country", deserialize_with = "country_or_default")]
    pub country: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address_type: AddressKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_default: bool,
}

/// Outgoing address payload for create/update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressInput {
    pub full_name: String,
    pub phone_number: String,
    pub company_name: String,
    pub gst_number: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub address_type: AddressKind,
    pub is_default: bool,
}

impl Default for AddressInput {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            phone_number: String::new(),
            company_name: String::new(),
            gst_number: String::new(),
            street_address: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            country: default_country(),
            address_type: AddressKind::Billing,
            is_default: false,
        }
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Token pair returned by login.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Response of the token-refresh endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshedAccess {
    pub access: String,
}

/// Outgoing signup payload.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

// =============================================================================
// Orders & Payments
// =============================================================================

/// Order record for history views. Field-tolerant: everything beyond the id
/// is optional because the backend's order serializer has drifted before.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSummary {
    #[serde(deserialize_with = "lenient_order_id")]
    pub id: OrderId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_method: String,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Server-issued payment session for the gateway path.
///
/// Amount and currency are server-authoritative; the client never recomputes
/// them from the cart.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSession {
    /// Public key for the hosted widget.
    pub key: String,
    /// Amount in paise (minor units).
    pub amount: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub razorpay_order_id: String,
}

impl PaymentSession {
    /// The charge as a rupee price.
    #[must_use]
    pub fn total(&self) -> Price {
        Price::from_paise(self.amount)
    }
}

/// Provider-signed completion handed back by the payment widget.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentCompletion {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

// =============================================================================
// Deserialization helpers
// =============================================================================

pub(crate) fn default_country() -> String {
    "India".to_string()
}

fn default_currency() -> String {
    "INR".to_string()
}

/// Treat an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `country` falls back to the store default when null or empty.
fn country_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|c| !c.is_empty())
        .unwrap_or_else(default_country))
}

/// Accept a numeric or string order id.
fn lenient_order_id<'de, D>(deserializer: D) -> Result<OrderId, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(OrderId::new(s)),
        serde_json::Value::Number(n) => Ok(OrderId::new(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number order id, got {other}"
        ))),
    }
}
