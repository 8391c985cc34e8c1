//! Service configuration.

use serde::Deserialize;
use std::path::Path;

use hashdash_ledger::ReferralConfig;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to the `RocksDB` data directory (default: "/data/hashdash").
    pub data_dir: String,

    /// Identity provider base URL; also the expected token issuer.
    pub auth_base_url: String,

    /// Expected JWT audience (default: "hashdash").
    pub auth_audience: String,

    /// API key for service-to-service requests (mining accruals).
    pub service_api_key: Option<String>,

    /// Public dashboard origin used in referral links.
    pub public_base_url: String,

    /// Persist referral codes when links are issued.
    pub register_issued_codes: bool,

    /// Accept `test-token:<uuid>[:admin]` bearer tokens.
    ///
    /// Never read from the environment; integration tests set it directly.
    pub allow_test_tokens: bool,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Secrets file structure.
#[derive(Debug, Deserialize)]
struct ServiceSecrets {
    #[serde(default)]
    service_api_key: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and the secrets file.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            data_dir: std::env::var("DATA_DIR").unwrap_or(defaults.data_dir),
            auth_base_url: std::env::var("AUTH_BASE_URL").unwrap_or(defaults.auth_base_url),
            auth_audience: std::env::var("AUTH_AUDIENCE").unwrap_or(defaults.auth_audience),
            service_api_key: load_service_api_key(),
            public_base_url: std::env::var("PUBLIC_BASE_URL").unwrap_or(defaults.public_base_url),
            register_issued_codes: std::env::var("REGISTER_ISSUED_CODES")
                .ok()
                .is_some_and(|v| parse_flag(&v)),
            allow_test_tokens: false,
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| parse_origins(&s))
                .unwrap_or(defaults.cors_origins),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_seconds),
        }
    }

    /// Settings for the referral ledger.
    #[must_use]
    pub fn referral_config(&self) -> ReferralConfig {
        ReferralConfig {
            public_base_url: self.public_base_url.clone(),
            register_issued_codes: self.register_issued_codes,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/hashdash".into(),
            auth_base_url: "https://auth.hashdash.io".into(),
            auth_audience: "hashdash".into(),
            service_api_key: None,
            public_base_url: "http://localhost:3000".into(),
            register_issued_codes: false,
            allow_test_tokens: false,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024, // 1MB
            request_timeout_seconds: 30,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Load the service API key from the secrets file, falling back to the
/// environment.
fn load_service_api_key() -> Option<String> {
    let secret_paths = [
        ".secrets/service.json",
        "hashdash/.secrets/service.json",
        "../.secrets/service.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<ServiceSecrets>(path) {
            if let Some(key) = secrets.service_api_key {
                tracing::info!(path = %path, "Loaded service secrets from file");
                return Some(key);
            }
        }
    }

    tracing::debug!("Service secrets file not found, using environment variables");
    std::env::var("SERVICE_API_KEY").ok()
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("ON"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn origins_are_trimmed() {
        assert_eq!(
            parse_origins("https://a.io, https://b.io,,"),
            vec!["https://a.io".to_string(), "https://b.io".to_string()]
        );
    }

    #[test]
    fn secrets_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.json");
        std::fs::write(&path, r#"{"service_api_key":"sk-test"}"#).unwrap();

        let secrets: ServiceSecrets = load_secrets_file(path.to_str().unwrap()).unwrap();
        assert_eq!(secrets.service_api_key.as_deref(), Some("sk-test"));
        assert!(load_secrets_file::<ServiceSecrets>("/nonexistent/service.json").is_err());
    }

    #[test]
    fn referral_config_mirrors_service_config() {
        let config = ServiceConfig {
            public_base_url: "https://dash.example".into(),
            register_issued_codes: true,
            ..ServiceConfig::default()
        };
        let referral = config.referral_config();
        assert_eq!(referral.public_base_url, "https://dash.example");
        assert!(referral.register_issued_codes);
    }
}
