use seqbridge_core::auth::{RuleSecrets, Secret};
use seqbridge_core::sweep::SweepConfig;
use thiserror::Error;
use url::Url;

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.getsequence.io";
pub const DEFAULT_APP_URL: &str = "https://app.getsequence.io";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";

/// Deployment configuration, read once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Upstream access token; empty disables search/fetch (500 on use)
    pub access_token: Secret,
    /// Gate for the rule trigger endpoint
    pub admin_token: Secret,
    /// Trigger allow-list with per-rule signing secrets
    pub rule_secrets: RuleSecrets,
    pub sweep: SweepConfig,
    pub upstream_base_url: String,
    /// Base for links handed back to callers
    pub app_base_url: String,
    pub port: u16,
    pub require_https: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset and blank values fall
    /// back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let rule_secrets = RuleSecrets::from_json(
            &get("SEQUENCE_RULE_SECRETS_JSON").unwrap_or_default(),
        )
        .map_err(|e| invalid("SEQUENCE_RULE_SECRETS_JSON", e.to_string()))?;

        let buffer = parse_or("SWEEP_CHECKING_BUFFER", get("SWEEP_CHECKING_BUFFER"), 1000_i64)?;
        let percent = parse_or("SWEEP_PERCENT", get("SWEEP_PERCENT"), 0.30_f64)?;
        if !(0.0..=1.0).contains(&percent) {
            return Err(invalid("SWEEP_PERCENT", format!("{percent} is outside 0..=1")));
        }
        let daily_cap_cents =
            parse_or("SWEEP_DAILY_CAP_CENTS", get("SWEEP_DAILY_CAP_CENTS"), 30_000_i64)?;
        if daily_cap_cents < 0 {
            return Err(invalid("SWEEP_DAILY_CAP_CENTS", "must not be negative".to_string()));
        }

        let cors_origins: Vec<String> = get("SEQBRIDGE_CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        // Credentialed admin calls need explicit origins; a wildcard cannot be listed.
        if cors_origins.iter().any(|origin| origin == "*") {
            return Err(invalid(
                "SEQBRIDGE_CORS_ORIGINS",
                "'*' is not allowed; list explicit origins".to_string(),
            ));
        }

        Ok(Self {
            access_token: Secret::new(get("SEQUENCE_ACCESS_TOKEN").unwrap_or_default()),
            admin_token: Secret::new(get("MCP_ADMIN_TOKEN").unwrap_or_default()),
            rule_secrets,
            sweep: SweepConfig {
                buffer,
                percent,
                daily_cap_cents,
            },
            upstream_base_url: base_url("SEQUENCE_API_URL", get("SEQUENCE_API_URL"), DEFAULT_UPSTREAM_URL)?,
            app_base_url: base_url("SEQUENCE_APP_URL", get("SEQUENCE_APP_URL"), DEFAULT_APP_URL)?,
            port: parse_or("PORT", get("PORT"), 3000_u16)?,
            require_https: get("SEQBRIDGE_REQUIRE_HTTPS").is_some_and(|v| v == "true"),
            cors_origins,
        })
    }
}

fn invalid(var: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { var, reason }
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .parse()
            .map_err(|e: T::Err| invalid(var, format!("'{value}': {e}"))),
        None => Ok(default),
    }
}

fn base_url(var: &'static str, raw: Option<String>, default: &str) -> Result<String, ConfigError> {
    let value = raw.unwrap_or_else(|| default.to_string());
    let parsed = Url::parse(&value).map_err(|e| invalid(var, format!("'{value}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(var, format!("'{value}' must be http or https")));
    }
    Ok(value.trim_end_matches('/').to_string())
}
