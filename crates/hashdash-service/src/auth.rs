//! Authentication extractors.
//!
//! - `AuthUser` - dashboard user via identity provider JWT
//! - `AdminAuth` - a user whose token carries the `admin` role claim
//! - `ServiceAuth` - service-to-service requests via API key

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use hashdash_core::{AccountId, Role};

use crate::error::ApiError;
use crate::state::AppState;

/// How long to cache JWKS keys before refreshing.
const JWKS_CACHE_DURATION: Duration = Duration::from_secs(3600); // 1 hour

/// Timeout for JWKS fetch requests.
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Prefix of bearer tokens accepted when test tokens are enabled.
const TEST_TOKEN_PREFIX: &str = "test-token:";

/// An authenticated dashboard user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The account ID (token subject).
    pub account_id: AccountId,
    /// Email claim, if the token carries one.
    pub email: Option<String>,
    /// Name claim, if the token carries one.
    pub name: Option<String>,
    /// Role claim.
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        if state.config.allow_test_tokens {
            if let Some(rest) = token.strip_prefix(TEST_TOKEN_PREFIX) {
                return parse_test_token(rest);
            }
        }

        let claims = validate_jwt(token, state).await?;

        let account_id = claims
            .sub
            .parse::<AccountId>()
            .map_err(|_| ApiError::Unauthorized)?;

        Ok(AuthUser {
            account_id,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        })
    }
}

/// Parse `<uuid>` or `<uuid>:admin`.
fn parse_test_token(rest: &str) -> Result<AuthUser, ApiError> {
    let (id, role) = match rest.split_once(':') {
        Some((id, "admin")) => (id, Role::Admin),
        Some(_) => return Err(ApiError::Unauthorized),
        None => (rest, Role::User),
    };

    let account_id = id.parse::<AccountId>().map_err(|_| ApiError::Unauthorized)?;

    Ok(AuthUser {
        account_id,
        email: None,
        name: None,
        role,
    })
}

/// A user holding the `admin` role.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub AuthUser);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if !user.role.is_admin() {
            tracing::warn!(account_id = %user.account_id, "Admin endpoint denied");
            return Err(ApiError::Forbidden);
        }

        tracing::info!(account_id = %user.account_id, "Admin authenticated");
        Ok(AdminAuth(user))
    }
}

/// Service authentication via API key.
#[derive(Debug, Clone)]
pub struct ServiceAuth {
    /// The calling service, from `X-Service-Name`.
    pub service_name: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for ServiceAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let api_key = parts
            .headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let expected_key = state
            .config
            .service_api_key
            .as_ref()
            .ok_or(ApiError::Unauthorized)?;

        if api_key != expected_key {
            return Err(ApiError::Unauthorized);
        }

        let service_name = parts
            .headers
            .get("x-service-name")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        Ok(ServiceAuth { service_name })
    }
}

/// Identity token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (account ID).
    pub sub: String,
    /// Audience (string or array).
    #[serde(default)]
    pub aud: Option<serde_json::Value>,
    /// Issuer.
    pub iss: String,
    /// Expiration time.
    pub exp: i64,
    /// Issued at.
    pub iat: i64,
    /// Email.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Role; absent means `user`.
    #[serde(default)]
    pub role: Role,
}

// ============================================================================
// JWKS Client and JWT Validation
// ============================================================================

/// JWKS (JSON Web Key Set) response structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwks {
    /// List of JWK keys.
    pub keys: Vec<Jwk>,
}

/// Single JSON Web Key.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type (e.g., "RSA").
    pub kty: String,
    /// Key ID.
    pub kid: Option<String>,
    /// Algorithm (e.g., "RS256").
    pub alg: Option<String>,
    /// RSA public key modulus (base64url encoded).
    pub n: Option<String>,
    /// RSA public key exponent (base64url encoded).
    pub e: Option<String>,
    /// Key use (e.g., "sig" for signature).
    #[serde(rename = "use")]
    pub key_use: Option<String>,
}

struct CachedKeys {
    by_kid: HashMap<String, DecodingKey>,
    default_key: Option<DecodingKey>,
    fetched_at: Option<Instant>,
}

impl CachedKeys {
    fn is_fresh(&self) -> bool {
        self.fetched_at
            .is_some_and(|at| at.elapsed() < JWKS_CACHE_DURATION)
    }

    fn lookup(&self, kid: Option<&str>) -> Option<DecodingKey> {
        match kid {
            Some(kid) => self.by_kid.get(kid).cloned(),
            None => self.default_key.clone(),
        }
    }
}

/// Decoding keys fetched from the identity provider, refreshed hourly.
pub struct JwksCache {
    client: reqwest::Client,
    keys: RwLock<CachedKeys>,
}

impl JwksCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            keys: RwLock::new(CachedKeys {
                by_kid: HashMap::new(),
                default_key: None,
                fetched_at: None,
            }),
        }
    }

    /// Get the key for `kid`, fetching the key set on a miss or expiry.
    async fn decoding_key(&self, kid: Option<&str>, auth_base_url: &str) -> Result<DecodingKey, ApiError> {
        {
            let keys = self.keys.read().await;
            if keys.is_fresh() {
                if let Some(key) = keys.lookup(kid) {
                    return Ok(key);
                }
            }
        }

        let jwks = self.fetch(auth_base_url).await?;

        let mut keys = self.keys.write().await;
        keys.by_kid.clear();
        keys.default_key = None;
        keys.fetched_at = Some(Instant::now());

        for jwk in &jwks.keys {
            if let Some(decoding_key) = jwk_to_decoding_key(jwk) {
                if let Some(ref key_kid) = jwk.kid {
                    keys.by_kid.insert(key_kid.clone(), decoding_key.clone());
                }
                if keys.default_key.is_none() {
                    keys.default_key = Some(decoding_key);
                }
            }
        }

        keys.lookup(kid).ok_or(ApiError::Unauthorized)
    }

    async fn fetch(&self, auth_base_url: &str) -> Result<Jwks, ApiError> {
        let jwks_url = format!(
            "{}/.well-known/jwks.json",
            auth_base_url.trim_end_matches('/')
        );

        tracing::debug!(url = %jwks_url, "Fetching JWKS");

        let response = self.client.get(&jwks_url).send().await.map_err(|e| {
            tracing::error!(error = %e, url = %jwks_url, "Failed to fetch JWKS");
            ApiError::ExternalService("Failed to fetch authentication keys".into())
        })?;

        if !response.status().is_success() {
            tracing::error!(
                status = %response.status(),
                url = %jwks_url,
                "JWKS fetch returned non-success status"
            );
            return Err(ApiError::ExternalService(
                "Failed to fetch authentication keys".into(),
            ));
        }

        let jwks: Jwks = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse JWKS response");
            ApiError::ExternalService("Failed to parse authentication keys".into())
        })?;

        tracing::info!(keys_count = jwks.keys.len(), "JWKS fetched");
        Ok(jwks)
    }
}

impl Default for JwksCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a JWT against the provider's key set.
async fn validate_jwt(token: &str, state: &AppState) -> Result<JwtClaims, ApiError> {
    let header = decode_header(token).map_err(|e| {
        tracing::debug!(error = %e, "Failed to decode JWT header");
        ApiError::Unauthorized
    })?;

    let decoding_key = state
        .jwks()
        .decoding_key(header.kid.as_deref(), &state.config.auth_base_url)
        .await?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[&state.config.auth_audience]);
    validation.set_issuer(&[&state.config.auth_base_url]);

    let token_data = decode::<JwtClaims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        ApiError::Unauthorized
    })?;

    Ok(token_data.claims)
}

/// Convert a JWK to a `DecodingKey`. Only RSA keys are supported.
fn jwk_to_decoding_key(jwk: &Jwk) -> Option<DecodingKey> {
    if jwk.kty != "RSA" {
        tracing::debug!(kty = %jwk.kty, "Skipping non-RSA JWK");
        return None;
    }

    let n = jwk.n.as_ref()?;
    let e = jwk.e.as_ref()?;

    DecodingKey::from_rsa_components(n, e).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roles() {
        let id = AccountId::generate();

        let user = parse_test_token(&id.to_string()).unwrap();
        assert_eq!(user.account_id, id);
        assert_eq!(user.role, Role::User);

        let admin = parse_test_token(&format!("{id}:admin")).unwrap();
        assert!(admin.role.is_admin());

        assert!(parse_test_token(&format!("{id}:root")).is_err());
        assert!(parse_test_token("not-a-uuid").is_err());
    }

    #[test]
    fn non_rsa_keys_are_skipped() {
        let jwk = Jwk {
            kty: "EC".into(),
            kid: Some("k1".into()),
            alg: None,
            n: None,
            e: None,
            key_use: None,
        };
        assert!(jwk_to_decoding_key(&jwk).is_none());
    }

    #[test]
    fn claims_default_to_user_role() {
        let claims: JwtClaims = serde_json::from_value(serde_json::json!({
            "sub": "0b6f7c2e-4c1c-4f6e-9d8e-1c2b3a4d5e6f",
            "iss": "https://auth.example",
            "exp": 0,
            "iat": 0
        }))
        .unwrap();
        assert_eq!(claims.role, Role::User);
    }
}
