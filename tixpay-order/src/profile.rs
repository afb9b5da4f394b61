use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use tixpay_core::identity::{IdentityClient, ProfileCache};
use tixpay_shared::pii::Masked;
use tixpay_shared::UserProfile;

use crate::OrderError;

/// Read-through profile lookup for the purchase path.
///
/// The cache is best-effort: read or write failures are logged and treated
/// as a miss.
pub struct ProfileResolver {
    identity: Arc<dyn IdentityClient>,
    cache: Arc<dyn ProfileCache>,
    ttl: Duration,
}

impl ProfileResolver {
    pub fn new(identity: Arc<dyn IdentityClient>, cache: Arc<dyn ProfileCache>, ttl: Duration) -> Self {
        Self { identity, cache, ttl }
    }

    pub async fn resolve(&self, email: &str, authorization: &str) -> Result<UserProfile, OrderError> {
        match self.cache.get_profile(email).await {
            Ok(Some(profile)) if !profile.is_empty() => return Ok(profile),
            Ok(_) => {}
            Err(e) => warn!("Profile cache read failed for {}: {}", Masked(email), e),
        }

        let profile = self
            .identity
            .fetch_profile(authorization)
            .await
            .map_err(|e| OrderError::collaborator("user service", e))?
            .filter(|p| !p.is_empty())
            .ok_or(OrderError::Unauthorized)?;

        if let Err(e) = self.cache.put_profile(email, &profile, self.ttl).await {
            warn!("Profile cache write failed for {}: {}", Masked(email), e);
        } else {
            info!("Cached profile for {}", Masked(email));
        }

        Ok(profile)
    }
}
