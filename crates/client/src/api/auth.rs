//! Login, signup, and logout endpoints.
//!
//! Token-refresh plumbing lives in the request core (`super`); these are the
//! thin calls around it. Login stores the returned token pair in the session
//! store so subsequent authenticated calls pick it up automatically.

use reqwest::Method;
use tracing::instrument;

use super::types::{SignupInput, TokenPair};
use super::{ApiClient, ApiError, Auth};

impl ApiClient {
    /// Log in with an email/username identifier and password.
    ///
    /// On success the token pair is persisted to the session store.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, identifier: &str, password: &str) -> Result<TokenPair, ApiError> {
        let tokens: TokenPair = self
            .request(
                Method::POST,
                "/user/login/",
                Some(serde_json::json!({
                    "identifier": identifier,
                    "password": password,
                })),
                Auth::Public,
            )
            .await?;

        self.session().set_tokens(&tokens.access, &tokens.refresh);
        Ok(tokens)
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, input))]
    pub async fn register(&self, input: &SignupInput) -> Result<(), ApiError> {
        self.request_unit(
            Method::POST,
            "/user/register/",
            Some(serde_json::to_value(input)?),
            Auth::Public,
        )
        .await
    }

    /// Log out: revoke the refresh token server-side and purge stored tokens.
    ///
    /// Stored tokens are cleared even if the revocation request fails; a
    /// client with no tokens is logged out regardless of what the server
    /// thinks.
    ///
    /// # Errors
    ///
    /// Returns an error if the revocation request fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let Some(refresh) = self.session().refresh_token() else {
            self.session().clear_tokens();
            return Ok(());
        };

        let result = self
            .request_unit(
                Method::POST,
                "/user/logout/",
                Some(serde_json::json!({ "refresh": refresh })),
                Auth::Bearer,
            )
            .await;

        self.session().clear_tokens();
        result
    }
}
