//! Hashdash HTTP client implementation.

use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;

use hashdash_core::AccountId;

use crate::error::ClientError;
use crate::types::{
    AccrueMiningRequest, ApiErrorResponse, ReferralLinkResponse, ReferralStatsResponse,
    StatsResponse,
};

/// Hashdash API client.
///
/// Service calls authenticate with the configured API key; dashboard calls
/// take the user's bearer token per request.
#[derive(Debug, Clone)]
pub struct HashdashClient {
    client: Client,
    base_url: String,
    api_key: String,
    service_name: String,
}

impl HashdashClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, api_key, ClientOptions::default())
    }

    /// Create a new client with custom options.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            service_name: options.service_name,
        })
    }

    /// Credit mining proceeds to an account (service API key).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn accrue_mining(
        &self,
        account_id: &AccountId,
        amount_cents: i64,
        points: i64,
    ) -> Result<StatsResponse, ClientError> {
        let request = AccrueMiningRequest {
            account_id: account_id.to_string(),
            amount_cents,
            points,
        };

        tracing::debug!(account_id = %account_id, amount_cents, points, "Reporting mining accrual");

        let builder = self
            .service(self.client.post(self.url("/v1/mining/accrue")))
            .json(&request);
        self.send(builder).await
    }

    /// Referral summary of the token's owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn referral_stats(&self, user_jwt: &str) -> Result<ReferralStatsResponse, ClientError> {
        let builder = self
            .client
            .get(self.url("/v1/referrals/stats"))
            .bearer_auth(user_jwt);
        self.send(builder).await
    }

    /// Issue a referral link for the token's owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn create_referral_link(
        &self,
        user_jwt: &str,
    ) -> Result<ReferralLinkResponse, ClientError> {
        let builder = self
            .client
            .post(self.url("/v1/referrals/link"))
            .bearer_auth(user_jwt);
        self.send(builder).await
    }

    /// Stats of the token's owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn stats(&self, user_jwt: &str) -> Result<StatsResponse, ClientError> {
        let builder = self.client.get(self.url("/v1/stats/me")).bearer_auth(user_jwt);
        self.send(builder).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn service(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::Unauthorized {
                status: status.as_u16(),
            });
        }

        match response.json::<ApiErrorResponse>().await {
            Ok(body) => {
                let code = body.error.code;
                let message = body.error.message;
                if code == "not_found" && message.contains("Account") {
                    Err(ClientError::AccountNotFound { message })
                } else {
                    Err(ClientError::Api {
                        code,
                        message,
                        status: status.as_u16(),
                    })
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
    /// Service name sent as `X-Service-Name`.
    pub service_name: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            service_name: "unknown".to_string(),
        }
    }
}

impl ClientOptions {
    /// Create options with a service name.
    #[must_use]
    pub fn with_service_name(name: impl Into<String>) -> Self {
        Self {
            service_name: name.into(),
            ..Self::default()
        }
    }
}
