//! Token port — the external auth service holding vendor access tokens.

use std::future::Future;

use huexim_domain::error::XimError;

/// Stores, refreshes and revokes vendor access tokens per channel set.
///
/// Every call authenticates with the hub account token.
pub trait TokenService: Send + Sync {
    /// The stored vendor token, or `None` when the service holds none.
    fn fetch_token(
        &self,
        account_token: &str,
        channel_set: &str,
    ) -> impl Future<Output = Result<Option<String>, XimError>> + Send;

    /// Refresh the stored vendor token and return the new one.
    fn refresh_token(
        &self,
        account_token: &str,
        channel_set: &str,
    ) -> impl Future<Output = Result<Option<String>, XimError>> + Send;

    /// Forget the vendor token for this account.
    fn revoke_token(&self, account_token: &str) -> impl Future<Output = Result<(), XimError>> + Send;
}

impl<T: TokenService> TokenService for std::sync::Arc<T> {
    fn fetch_token(
        &self,
        account_token: &str,
        channel_set: &str,
    ) -> impl Future<Output = Result<Option<String>, XimError>> + Send {
        (**self).fetch_token(account_token, channel_set)
    }

    fn refresh_token(
        &self,
        account_token: &str,
        channel_set: &str,
    ) -> impl Future<Output = Result<Option<String>, XimError>> + Send {
        (**self).refresh_token(account_token, channel_set)
    }

    fn revoke_token(&self, account_token: &str) -> impl Future<Output = Result<(), XimError>> + Send {
        (**self).revoke_token(account_token)
    }
}
