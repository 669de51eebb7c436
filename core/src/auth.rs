use std::collections::HashMap;
use std::fmt;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Scheme prefix required on the `x-admin` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// A credential that must never end up in logs. `Debug` is redacted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Secret(<empty>)")
        } else {
            f.write_str("Secret(***)")
        }
    }
}

/// SHA-256 hex digest of a token string.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare two tokens through their digests so timing does not leak the
/// length of the matching prefix.
pub fn tokens_match(presented: &str, expected: &str) -> bool {
    hash_token(presented) == hash_token(expected)
}

/// Rule id → per-rule signing secret. Doubles as the trigger allow-list.
#[derive(Debug, Clone, Default)]
pub struct RuleSecrets {
    secrets: HashMap<String, Secret>,
}

#[derive(Debug, Error)]
pub enum RuleSecretsError {
    #[error("rule secrets must be a JSON object of strings: {0}")]
    Invalid(#[from] serde_json::Error),
}

impl RuleSecrets {
    /// Parse `{"ru_123": "secret", ...}`. Blank input means no rules.
    pub fn from_json(raw: &str) -> Result<Self, RuleSecretsError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let parsed: HashMap<String, String> = serde_json::from_str(raw)?;
        Ok(Self::from_pairs(parsed))
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            secrets: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Secret::new(v)))
                .collect(),
        }
    }

    /// Secret for `rule_id`; empty secrets count as absent.
    pub fn secret_for(&self, rule_id: &str) -> Option<&Secret> {
        self.secrets.get(rule_id).filter(|secret| !secret.is_empty())
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

/// Why a trigger request was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TriggerAuthError {
    /// No `x-admin` header, or it lacks the `Bearer ` prefix
    #[error("Unauthorized")]
    MissingBearer,
    /// Bearer token does not match the admin secret
    #[error("Forbidden")]
    BadAdminToken,
    /// Admin is fine but the rule has no secret configured
    #[error("Rule not whitelisted")]
    NotWhitelisted,
}

/// Run the trigger gate: bearer header, admin token, then allow-list.
///
/// On success returns the per-rule secret to sign the upstream call with.
/// The admin secret only decides who may ask; it is never forwarded.
pub fn authorize_trigger<'a>(
    admin_header: Option<&str>,
    admin_secret: &Secret,
    rules: &'a RuleSecrets,
    rule_id: &str,
) -> Result<&'a Secret, TriggerAuthError> {
    let token = admin_header
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or(TriggerAuthError::MissingBearer)?;

    // An unset admin secret disables triggering instead of accepting "Bearer ".
    if admin_secret.is_empty() || !tokens_match(token, admin_secret.expose()) {
        return Err(TriggerAuthError::BadAdminToken);
    }

    rules
        .secret_for(rule_id)
        .ok_or(TriggerAuthError::NotWhitelisted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RuleSecrets {
        RuleSecrets::from_pairs([("ru_1", "rule-one-secret"), ("ru_blank", "")])
    }

    fn admin() -> Secret {
        Secret::new("admin-token")
    }

    #[test]
    fn hash_token_is_stable_hex() {
        assert_eq!(hash_token("abc").len(), 64);
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
    }

    #[test]
    fn missing_or_malformed_header_is_unauthorized() {
        let rules = rules();
        for header in [None, Some("admin-token"), Some("bearer admin-token"), Some("Bearer")] {
            assert_eq!(
                authorize_trigger(header, &admin(), &rules, "ru_1"),
                Err(TriggerAuthError::MissingBearer),
                "header {header:?}"
            );
        }
    }

    #[test]
    fn wrong_token_is_forbidden() {
        assert_eq!(
            authorize_trigger(Some("Bearer nope"), &admin(), &rules(), "ru_1"),
            Err(TriggerAuthError::BadAdminToken)
        );
    }

    #[test]
    fn empty_admin_secret_rejects_empty_token() {
        assert_eq!(
            authorize_trigger(Some("Bearer "), &Secret::default(), &rules(), "ru_1"),
            Err(TriggerAuthError::BadAdminToken)
        );
    }

    #[test]
    fn unlisted_or_blank_rule_is_not_whitelisted() {
        let rules = rules();
        for rule_id in ["ru_2", "ru_blank"] {
            assert_eq!(
                authorize_trigger(Some("Bearer admin-token"), &admin(), &rules, rule_id),
                Err(TriggerAuthError::NotWhitelisted)
            );
        }
    }

    #[test]
    fn success_returns_rule_secret_not_admin_secret() {
        let rules = rules();
        let secret = authorize_trigger(Some("Bearer admin-token"), &admin(), &rules, "ru_1")
            .expect("should authorize");
        assert_eq!(secret.expose(), "rule-one-secret");
    }

    #[test]
    fn rule_secrets_parse_from_json() {
        let rules = RuleSecrets::from_json(r#"{"ru_9": "s9"}"#).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.secret_for("ru_9").map(Secret::expose), Some("s9"));
        assert!(RuleSecrets::from_json("").unwrap().is_empty());
        assert!(RuleSecrets::from_json(r#"{"ru_9": 5}"#).is_err());
        assert!(RuleSecrets::from_json("[]").is_err());
    }

    #[test]
    fn secret_debug_is_redacted() {
        assert_eq!(format!("{:?}", Secret::new("hunter2")), "Secret(***)");
        assert_eq!(format!("{:?}", Secret::default()), "Secret(<empty>)");
    }
}
