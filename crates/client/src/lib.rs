//! Kirana storefront client library.
//!
//! This crate is the client-side half of the Kirana storefront: it keeps an
//! authoritative local projection of the user's cart, drives the two-path
//! checkout flow (cash-on-delivery and the hosted payment gateway), and
//! manages saved addresses - all against the REST backend.
//!
//! # Architecture
//!
//! - [`api::ApiClient`] - HTTP client with bearer attachment and one-shot
//!   token refresh-and-retry, wrapping every backend endpoint
//! - [`store::StoreBackend`] - the trait seam the cart and checkout consume,
//!   implemented by `ApiClient` and by in-process fakes in tests
//! - [`cart::CartState`] - the cart state machine (optimistic quantity
//!   updates, rollback by resync, fail-safe-empty refresh)
//! - [`checkout::CheckoutFlow`] - address resolution, order creation, and
//!   gateway payment verification
//! - [`addresses::AddressBook`] - saved-address cache with selection pointers
//! - [`notify::Notifier`] - single-slot auto-expiring toast channel
//! - [`session::SessionStore`] - durable tokens and last-order-id
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kirana_client::{api::ApiClient, cart::CartState, config::ClientConfig,
//!                     notify::Notifier, session::FileSession};
//!
//! let config = ClientConfig::from_env()?;
//! let session = Arc::new(FileSession::open(&config.session_file));
//! let client = Arc::new(ApiClient::new(&config, session.clone())?);
//!
//! let cart = CartState::new(client.clone(), Notifier::default());
//! cart.refresh().await;
//! println!("{} items in cart", cart.count());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod addresses;
pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod notify;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
