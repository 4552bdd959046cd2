//! The cart state machine.
//!
//! [`CartState`] is the single source of truth for "what is in the user's
//! cart", eventually consistent with the remote store:
//!
//! - `refresh` replaces the whole projection from the server and hydrates
//!   each line with its product snapshot; any failure degrades to an empty
//!   projection, never a stale or crashed one
//! - `add_item`/`remove_item` are server-first: mutate remotely, then resync
//!   (the server owns line aggregation, so there is no local insert to guess)
//! - `update_quantity` is optimistic: the local line changes immediately and
//!   the signed difference is sent to the server; on failure the projection
//!   is rolled back by resyncing, not by applying an inverse delta
//! - `clear` is purely local, used after order placement when the server has
//!   already drained the cart as a side effect
//!
//! Rapid overlapping mutations are not coalesced; `refresh` is the global
//! reconciliation point that makes any settled sequence consistent again.

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;

use kirana_core::{CartItemId, Price, ProductId};

use crate::api::ApiError;
use crate::api::types::Product;
use crate::notify::{Notifier, ToastKind};
use crate::store::StoreBackend;

/// One line of the cart projection: a product snapshot plus quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// Line id issued by the remote store, stable across quantity changes.
    pub cart_item_id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    /// Per unit, tax-exclusive.
    pub price: Decimal,
    /// Always >= 1; a line at zero does not exist.
    pub quantity: u32,
    pub images: serde_json::Value,
    pub brand: String,
    pub stock: i64,
    pub description: String,
}

#[derive(Default)]
struct CartInner {
    lines: Vec<CartLine>,
    loading: bool,
}

/// The cart state machine.
pub struct CartState<B> {
    backend: Arc<B>,
    notifier: Notifier,
    inner: Mutex<CartInner>,
}

impl<B: StoreBackend> CartState<B> {
    /// Create an empty, not-yet-fetched cart over a backend.
    #[must_use]
    pub fn new(backend: Arc<B>, notifier: Notifier) -> Self {
        Self {
            backend,
            notifier,
            inner: Mutex::new(CartInner::default()),
        }
    }

    /// The notifier cart mutations report through.
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Snapshot of the current projection.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.inner.lock().map(|i| i.lines.clone()).unwrap_or_default()
    }

    /// Whether the projection holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().map(|i| i.lines.is_empty()).unwrap_or(true)
    }

    /// Whether a refresh is in flight (distinguishes "not yet fetched" from
    /// "empty").
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.lock().map(|i| i.loading).unwrap_or(false)
    }

    /// Sum of `price * quantity` over all lines, exact.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.inner
            .lock()
            .map(|i| {
                Price::new(
                    i.lines
                        .iter()
                        .map(|l| l.price * Decimal::from(l.quantity))
                        .sum(),
                )
            })
            .unwrap_or_default()
    }

    /// Sum of quantities, for badges.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.inner
            .lock()
            .map(|i| i.lines.iter().map(|l| l.quantity).sum())
            .unwrap_or(0)
    }

    /// Replace the projection from the remote store.
    ///
    /// Never fails: any error leaves an empty projection and a log line.
    pub async fn refresh(&self) {
        self.set_loading(true);

        let lines = match self.fetch_lines().await {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch cart, projection emptied");
                Vec::new()
            }
        };

        if let Ok(mut inner) = self.inner.lock() {
            inner.lines = lines;
            inner.loading = false;
        }
    }

    async fn fetch_lines(&self) -> Result<Vec<CartLine>, ApiError> {
        let cart = self.backend.get_cart().await?;

        let mut lines = Vec::with_capacity(cart.items.len());
        for item in cart.items {
            // A zero-quantity line must not exist locally.
            if item.quantity < 1 {
                continue;
            }
            let product = self.backend.get_product(item.product.id).await?;
            lines.push(CartLine {
                cart_item_id: item.id,
                product_id: product.id,
                name: product.name,
                price: product.price,
                quantity: u32::try_from(item.quantity).unwrap_or(u32::MAX),
                images: product.images,
                brand: product.brand,
                stock: product.stock,
                description: product.description,
            });
        }
        Ok(lines)
    }

    /// Add `quantity` units of a product, then resync.
    ///
    /// No optimistic insert: the server may merge into an existing line.
    /// Returns whether the mutation succeeded.
    pub async fn add_item(&self, product: &Product, quantity: u32) -> bool {
        match self
            .backend
            .add_to_cart(product.id, i64::from(quantity))
            .await
        {
            Ok(()) => {
                self.notifier
                    .show(format!("Added \"{}\" to cart", product.name), ToastKind::Success);
                self.refresh().await;
                true
            }
            Err(e) => {
                tracing::error!(error = %e, product = %product.id, "Failed to add to cart");
                self.notifier.show("Failed to add to cart", ToastKind::Error);
                false
            }
        }
    }

    /// Remove a line, then resync. Returns whether the mutation succeeded.
    pub async fn remove_item(&self, cart_item_id: CartItemId) -> bool {
        match self.backend.remove_cart_item(cart_item_id).await {
            Ok(()) => {
                self.notifier.show("Removed from cart", ToastKind::Info);
                self.refresh().await;
                true
            }
            Err(e) => {
                tracing::error!(error = %e, item = %cart_item_id, "Failed to remove from cart");
                self.notifier
                    .show("Failed to remove from cart", ToastKind::Error);
                false
            }
        }
    }

    /// Set a line's quantity optimistically.
    ///
    /// Silently rejects quantities below 1 and unknown lines. The local line
    /// is rewritten first; the signed difference is then sent to the server.
    /// A zero difference makes no network call. On failure the projection is
    /// resynced to ground truth, discarding the optimistic write.
    pub async fn update_quantity(&self, cart_item_id: CartItemId, new_quantity: u32) {
        if new_quantity < 1 {
            return;
        }

        let Some((product_id, diff)) = self.apply_optimistic(cart_item_id, new_quantity) else {
            return;
        };
        if diff == 0 {
            return;
        }

        if let Err(e) = self.backend.add_to_cart(product_id, diff).await {
            tracing::error!(error = %e, item = %cart_item_id, "Failed to update quantity");
            self.notifier
                .show("Quantity update failed", ToastKind::Error);
            // Rollback by resync: the server owns aggregation, so the
            // inverse delta is not safely computable here.
            self.refresh().await;
        }
    }

    /// Rewrite the line locally; returns the product id and signed diff.
    fn apply_optimistic(&self, cart_item_id: CartItemId, new_quantity: u32) -> Option<(ProductId, i64)> {
        let mut inner = self.inner.lock().ok()?;
        let line = inner
            .lines
            .iter_mut()
            .find(|l| l.cart_item_id == cart_item_id)?;

        let old_quantity = line.quantity;
        line.quantity = new_quantity;
        Some((
            line.product_id,
            i64::from(new_quantity) - i64::from(old_quantity),
        ))
    }

    /// Empty the projection locally. No remote call: after order placement
    /// the server has already drained the cart.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.lines.clear();
        }
        self.notifier.show("Cart cleared", ToastKind::Info);
    }

    fn set_loading(&self, loading: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.loading = loading;
        }
    }
}
