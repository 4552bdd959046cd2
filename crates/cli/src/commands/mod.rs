//! Command implementations.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

use std::sync::Arc;

use kirana_client::api::ApiClient;
use kirana_client::config::ClientConfig;
use kirana_client::notify::Notifier;
use kirana_client::session::{FileSession, SessionStore};

/// Errors that can occur while wiring up a command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] kirana_client::config::ConfigError),

    #[error("API error: {0}")]
    Api(#[from] kirana_client::api::ApiError),

    #[error("Checkout error: {0}")]
    Checkout(#[from] kirana_client::checkout::CheckoutError),

    #[error("Cart operation failed")]
    Cart,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared wiring for every command: config, session file, API client.
pub struct Context {
    pub client: Arc<ApiClient>,
    pub session: Arc<dyn SessionStore>,
    pub notifier: Notifier,
}

impl Context {
    pub fn from_env() -> Result<Self, CommandError> {
        let config = ClientConfig::from_env()?;
        let session: Arc<dyn SessionStore> = Arc::new(FileSession::open(config.session_file.clone()));
        let client = Arc::new(ApiClient::new(&config, session.clone())?);
        Ok(Self {
            client,
            session,
            notifier: Notifier::default(),
        })
    }

    /// Print and clear whatever toast the last operation raised.
    pub fn flush_toast(&self) {
        if let Some(toast) = self.notifier.current() {
            println!("{}", toast.text);
            self.notifier.close();
        }
    }
}
