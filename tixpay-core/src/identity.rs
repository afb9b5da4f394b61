use async_trait::async_trait;
use std::time::Duration;
use tixpay_shared::UserProfile;

/// Resolves the caller's profile from their bearer credential.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// `Ok(None)` means the credential is not recognised.
    async fn fetch_profile(
        &self,
        authorization: &str,
    ) -> Result<Option<UserProfile>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Key-value cache of profiles keyed by caller email.
#[async_trait]
pub trait ProfileCache: Send + Sync {
    async fn get_profile(
        &self,
        email: &str,
    ) -> Result<Option<UserProfile>, Box<dyn std::error::Error + Send + Sync>>;

    async fn put_profile(
        &self,
        email: &str,
        profile: &UserProfile,
        ttl: Duration,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
