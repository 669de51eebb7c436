use serde_json::Value;

/// One upstream account, read-only.
///
/// Keeps the verbatim upstream object next to the few fields the gateway
/// actually looks at, so fetch can hand the record back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Upstream id in string form (numeric ids are stringified)
    pub id: String,
    pub name: String,
    /// `balance.amountInDollars` rendered for display; `None` when the
    /// provider did not report a balance
    pub balance_display: Option<String>,
    raw: Value,
}

impl Account {
    /// Build an account view from one entry of the upstream `accounts` array.
    /// Returns `None` for entries that are not JSON objects.
    pub fn from_value(raw: Value) -> Option<Self> {
        let obj = raw.as_object()?;
        let id = obj.get("id").map(scalar_to_string).unwrap_or_default();
        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        // Some accounts have no balance when the provider errors.
        let balance_display = obj
            .get("balance")
            .and_then(|balance| balance.get("amountInDollars"))
            .and_then(|amount| match amount {
                Value::Number(n) => Some(n.to_string()),
                Value::String(s) => Some(s.clone()),
                _ => None,
            });

        Some(Self {
            id,
            name,
            balance_display,
            raw,
        })
    }

    /// The account exactly as upstream returned it.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Display title: `"{name} — ${amount}"` when a balance is known.
    pub fn title(&self) -> String {
        match &self.balance_display {
            Some(amount) => format!("{} — ${}", self.name, amount),
            None => self.name.clone(),
        }
    }
}

/// Extract accounts from an upstream `/accounts` response body.
///
/// A body without a `data.accounts` array yields no accounts instead of an
/// error; upstream reports some failures under `data.errors` with a 200.
pub fn accounts_from_body(body: Value) -> Vec<Account> {
    let Value::Object(mut root) = body else {
        return Vec::new();
    };
    let accounts = match root.remove("data") {
        Some(Value::Object(mut data)) => data.remove("accounts"),
        _ => None,
    };
    match accounts {
        Some(Value::Array(items)) => items.into_iter().filter_map(Account::from_value).collect(),
        _ => Vec::new(),
    }
}

/// Link to an account in the Sequence web app.
pub fn account_url(app_base: &str, id: &str) -> String {
    format!("{}/accounts/{}", app_base.trim_end_matches('/'), id)
}

/// Link to a rule in the Sequence web app.
pub fn rule_url(app_base: &str, id: &str) -> String {
    format!("{}/rules/{}", app_base.trim_end_matches('/'), id)
}

/// String form of a JSON scalar: strings unquoted, everything else as JSON text.
pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
