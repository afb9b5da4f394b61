use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::debug;

use tixpay_core::identity::ProfileCache;
use tixpay_shared::UserProfile;

/// Caller profiles cached as JSON under `profile:{email}`.
#[derive(Clone)]
pub struct RedisProfileCache {
    client: redis::Client,
}

impl RedisProfileCache {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }
}

fn profile_key(email: &str) -> String {
    format!("profile:{}", email)
}

#[async_trait]
impl ProfileCache for RedisProfileCache {
    async fn get_profile(
        &self,
        email: &str,
    ) -> Result<Option<UserProfile>, Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(profile_key(email)).await?;
        match cached {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put_profile(
        &self,
        email: &str,
        profile: &UserProfile,
        ttl: Duration,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let json = serde_json::to_string(profile)?;
        conn.set_ex::<_, _, ()>(profile_key(email), json, ttl.as_secs()).await?;
        debug!("Profile cached for {}s", ttl.as_secs());
        Ok(())
    }
}
