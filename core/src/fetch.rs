use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::accounts::{Account, account_url, rule_url};

/// Prefix that marks an id as an upstream rule.
pub const RULE_ID_PREFIX: &str = "ru_";

/// A single fetched record: an account, or a synthesized rule descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Document {
    pub id: String,
    pub title: String,
    /// Full account JSON, or usage text for rules
    pub text: String,
    pub url: String,
}

/// Resolve `id` against the account list, falling back to a rule descriptor.
///
/// Accounts win over the `ru_` heuristic. Returns `None` when neither applies.
pub fn resolve(accounts: &[Account], id: &str, app_base: &str) -> Option<Document> {
    let id = id.trim();
    if let Some(account) = accounts.iter().find(|account| account.id == id) {
        return Some(account_document(account, app_base));
    }
    if id.starts_with(RULE_ID_PREFIX) {
        return Some(rule_descriptor(id, app_base));
    }
    None
}

fn account_document(account: &Account, app_base: &str) -> Document {
    Document {
        id: account.id.clone(),
        title: account.name.clone(),
        text: account.raw().to_string(),
        url: account_url(app_base, &account.id),
    }
}

/// Static descriptor for a rule id. No upstream lookup is involved.
pub fn rule_descriptor(rule_id: &str, app_base: &str) -> Document {
    Document {
        id: rule_id.to_string(),
        title: format!("Sequence Rule {rule_id}"),
        text: format!(
            "Rule descriptor. Use POST /rules/{rule_id}/trigger with the x-admin header to invoke."
        ),
        url: rule_url(app_base, rule_id),
    }
}
