//! Saved-address endpoints.
//!
//! Reads come back normalized (see [`super::types::Address`]); writes send
//! the full payload with empty-string defaults so the backend never sees
//! missing keys.

use reqwest::Method;
use tracing::instrument;

use kirana_core::AddressId;

use super::types::{Address, AddressInput, Page};
use super::{ApiClient, ApiError, Auth};

impl ApiClient {
    /// List the user's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
        let page: Page<Address> = self
            .request(Method::GET, "/user/addresses/", None, Auth::Bearer)
            .await?;
        Ok(page.results)
    }

    /// Create a new address and return the server's canonical record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, input))]
    pub async fn create_address(&self, input: &AddressInput) -> Result<Address, ApiError> {
        self.request(
            Method::POST,
            "/user/addresses/",
            Some(serde_json::to_value(input)?),
            Auth::Bearer,
        )
        .await
    }

    /// Replace an existing address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, input))]
    pub async fn update_address(
        &self,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<Address, ApiError> {
        self.request(
            Method::PUT,
            &format!("/user/addresses/{id}/"),
            Some(serde_json::to_value(input)?),
            Auth::Bearer,
        )
        .await
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_address(&self, id: AddressId) -> Result<(), ApiError> {
        self.request_unit(
            Method::DELETE,
            &format!("/user/addresses/{id}/"),
            None,
            Auth::Bearer,
        )
        .await
    }
}
