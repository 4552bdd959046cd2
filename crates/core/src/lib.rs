//! Kirana Core - Shared types library.
//!
//! This crate provides common types used across all Kirana components:
//! - `client` - Storefront client library (cart, checkout, addresses)
//! - `cli` - Terminal shell over the client library
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
