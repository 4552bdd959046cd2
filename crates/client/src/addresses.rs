//! Saved-address resolver.
//!
//! [`AddressBook`] keeps a local cache of the account's saved addresses and
//! the currently selected billing/shipping choices. Selections point at
//! address ids, so a refresh that drops an address also invalidates any
//! selection that referenced it.

use std::sync::{Arc, Mutex};

use kirana_core::AddressId;

use crate::api::ApiError;
use crate::api::types::{Address, AddressInput};
use crate::store::StoreBackend;

#[derive(Default)]
struct BookInner {
    saved: Vec<Address>,
    selected_billing: Option<AddressId>,
    selected_shipping: Option<AddressId>,
}

/// Cached view of the account's saved addresses plus checkout selections.
pub struct AddressBook<B> {
    backend: Arc<B>,
    inner: Mutex<BookInner>,
}

impl<B: StoreBackend> AddressBook<B> {
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            inner: Mutex::new(BookInner::default()),
        }
    }

    /// Replace the cache from the remote store.
    ///
    /// Selections pointing at an address that no longer exists are cleared.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let saved = self.backend.list_addresses().await?;
        if let Ok(mut inner) = self.inner.lock() {
            if inner
                .selected_billing
                .is_some_and(|id| !saved.iter().any(|a| a.id == id))
            {
                inner.selected_billing = None;
            }
            if inner
                .selected_shipping
                .is_some_and(|id| !saved.iter().any(|a| a.id == id))
            {
                inner.selected_shipping = None;
            }
            inner.saved = saved;
        }
        Ok(())
    }

    /// Snapshot of the cached list.
    #[must_use]
    pub fn saved(&self) -> Vec<Address> {
        self.inner.lock().map(|i| i.saved.clone()).unwrap_or_default()
    }

    /// Look up a cached address by id.
    #[must_use]
    pub fn get(&self, id: AddressId) -> Option<Address> {
        self.inner
            .lock()
            .ok()
            .and_then(|i| i.saved.iter().find(|a| a.id == id).cloned())
    }

    /// Select the billing address; ignored if the id is not cached.
    pub fn select_billing(&self, id: AddressId) {
        if let Ok(mut inner) = self.inner.lock()
            && inner.saved.iter().any(|a| a.id == id)
        {
            inner.selected_billing = Some(id);
        }
    }

    /// Select the shipping address; ignored if the id is not cached.
    pub fn select_shipping(&self, id: AddressId) {
        if let Ok(mut inner) = self.inner.lock()
            && inner.saved.iter().any(|a| a.id == id)
        {
            inner.selected_shipping = Some(id);
        }
    }

    #[must_use]
    pub fn selected_billing(&self) -> Option<AddressId> {
        self.inner.lock().ok().and_then(|i| i.selected_billing)
    }

    #[must_use]
    pub fn selected_shipping(&self) -> Option<AddressId> {
        self.inner.lock().ok().and_then(|i| i.selected_shipping)
    }

    /// Save a new address remotely and append it to the cache.
    pub async fn create(&self, input: &AddressInput) -> Result<Address, ApiError> {
        let address = self.backend.create_address(input).await?;
        if let Ok(mut inner) = self.inner.lock() {
            inner.saved.push(address.clone());
        }
        Ok(address)
    }

    /// Update an address remotely and in the cache.
    pub async fn update(&self, id: AddressId, input: &AddressInput) -> Result<Address, ApiError> {
        let updated = self.backend.update_address(id, input).await?;
        if let Ok(mut inner) = self.inner.lock()
            && let Some(slot) = inner.saved.iter_mut().find(|a| a.id == id)
        {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Delete an address remotely, drop it from the cache, and clear any
    /// selection that pointed at it.
    pub async fn delete(&self, id: AddressId) -> Result<(), ApiError> {
        self.backend.delete_address(id).await?;
        if let Ok(mut inner) = self.inner.lock() {
            inner.saved.retain(|a| a.id != id);
            if inner.selected_billing == Some(id) {
                inner.selected_billing = None;
            }
            if inner.selected_shipping == Some(id) {
                inner.selected_shipping = None;
            }
        }
        Ok(())
    }
}
