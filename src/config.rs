use std::env;
use std::time::Duration;

/// Complete application configuration, loaded from environment variables or
/// default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub service: ServiceConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment
    /// variables.
    pub fn from_env() -> Self {
        Self {
            service: ServiceConfig::from_env(),
        }
    }
}

/// Configuration for reaching the optimization service.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    base_url: String,
    timeout: Duration,
}

impl ServiceConfig {
    const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:8000";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    const BASE_URL_VAR: &'static str = "FLOORPLAN_SERVICE_URL";
    const TIMEOUT_VAR: &'static str = "FLOORPLAN_HTTP_TIMEOUT_SECS";

    fn from_env() -> Self {
        let base_url = env_string(Self::BASE_URL_VAR)
            .map(|raw| normalize_base_url(&raw))
            .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());

        let timeout_secs = match env_string(Self::TIMEOUT_VAR) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(value) if value != 0 => value,
                Ok(_) => {
                    eprintln!(
                        "⚠️ {} must not be 0. Using {}s.",
                        Self::TIMEOUT_VAR,
                        Self::DEFAULT_TIMEOUT_SECS
                    );
                    Self::DEFAULT_TIMEOUT_SECS
                }
                Err(err) => {
                    eprintln!(
                        "⚠️ Could not parse {} ('{}'): {}. Using {}s.",
                        Self::TIMEOUT_VAR,
                        raw,
                        err,
                        Self::DEFAULT_TIMEOUT_SECS
                    );
                    Self::DEFAULT_TIMEOUT_SECS
                }
            },
            None => Self::DEFAULT_TIMEOUT_SECS,
        };

        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Builds a configuration from explicit values, bypassing the
    /// environment. Used by tests and by callers that already resolved
    /// their settings.
    #[allow(dead_code)]
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            timeout,
        }
    }

    /// Configured service base address, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Timeout applied to every HTTP exchange.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the URL of the container catalog endpoint.
    pub fn containers_endpoint(&self) -> String {
        format!("{}/containers", self.base_url)
    }

    /// Returns the URL of the optimize endpoint.
    pub fn optimize_endpoint(&self) -> String {
        format!("{}/optimize_csv", self.base_url)
    }
}

/// User agent sent with every request to the service.
pub fn user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    format!("floorplan-client/{version} ({os}; {arch})")
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            eprintln!(
                "⚠️ Access to {} failed: {}. Using default value.",
                name, err
            );
            None
        }
    }
}
