use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::warn;

use tixpay_core::identity::IdentityClient;
use tixpay_shared::UserProfile;

use super::{endpoint, read_json, Envelope};

#[derive(Debug, Deserialize)]
struct ProfileData {
    #[serde(default)]
    user: UserProfile,
}

#[derive(Clone)]
pub struct UserServiceClient {
    http: Client,
    base_url: String,
}

impl UserServiceClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl IdentityClient for UserServiceClient {
    async fn fetch_profile(
        &self,
        authorization: &str,
    ) -> Result<Option<UserProfile>, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .http
            .get(endpoint(&self.base_url, &["users", "profile"])?)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .send()
            .await?;

        if matches!(response.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND) {
            warn!("User service refused profile lookup: {}", response.status());
            return Ok(None);
        }

        let envelope: Envelope<ProfileData> = read_json("user service", response).await?;
        let profile = envelope.data.user;
        Ok((!profile.is_empty()).then_some(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_envelope() {
        let json = r#"
            {
                "meta": {"code": 200},
                "data": {"user": {"user_id": 7, "email": "a@example.com", "full_name": "A", "phone_number": "1", "nik": "x"}}
            }
        "#;
        let envelope: Envelope<ProfileData> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.user.user_id, 7);
        assert_eq!(envelope.data.user.phone_number, "1");
    }
}
