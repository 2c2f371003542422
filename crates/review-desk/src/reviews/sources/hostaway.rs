use async_trait::async_trait;

use super::{RawReviewBatch, RawReviewSource, SourceError};

pub const HOSTAWAY_BASE_URL: &str = "https://api.hostaway.com";

/// Live Hostaway reviews client. The sandbox account returns no reviews, so
/// in practice this sits behind a `FallbackSource` pointing at the mock file.
pub struct HostawaySource {
    client: reqwest::Client,
    base_url: String,
    account_id: String,
    api_key: String,
}

impl HostawaySource {
    pub fn new(
        base_url: impl Into<String>,
        account_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            account_id: account_id.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl RawReviewSource for HostawaySource {
    async fn fetch(&self) -> Result<RawReviewBatch, SourceError> {
        let url = format!("{}/v1/reviews", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(&[("accountId", self.account_id.as_str())])
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
