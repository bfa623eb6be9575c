use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;

/// Claims reported by Google's tokeninfo endpoint for an ID token.
/// Only the fields the backend consumes are deserialized.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleClaims {
    pub email: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    pub aud: String,
}

#[derive(Debug, Clone)]
pub struct GoogleAuthService {
    client: Client,
    client_id: String,
    tokeninfo_url: String,
}

impl GoogleAuthService {
    pub fn new(client_id: String, tokeninfo_url: String) -> Self {
        let builder = Client::builder()
            .user_agent("apuntes-rs/0.1")
            .timeout(std::time::Duration::from_secs(10));

        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            client_id,
            tokeninfo_url,
        }
    }

    /// Verifies a Google ID token with the tokeninfo endpoint.
    ///
    /// A token passes only when the endpoint accepts it, the response
    /// parses and the `aud` claim matches our configured client id.
    pub async fn verify_id_token(&self, id_token: &str) -> Result<GoogleClaims> {
        let url = format!(
            "{}?id_token={}",
            self.tokeninfo_url,
            urlencoding::encode(id_token)
        );

        tracing::debug!("Verifying Google ID token against {}", self.tokeninfo_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to reach Google tokeninfo endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(
                "Google tokeninfo rejected token - Status: {}, Body: {}",
                status,
                error_body
            );
            return Err(anyhow!("Google rejected the ID token"));
        }

        let claims: GoogleClaims = response
            .json()
            .await
            .context("Failed to parse Google tokeninfo response")?;

        if claims.aud != self.client_id {
            return Err(anyhow!("ID token was issued for a different client"));
        }

        Ok(claims)
    }
}
