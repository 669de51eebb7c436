use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::accounts::{Account, account_url};

/// Upper bound on search results.
pub const MAX_RESULTS: usize = 10;

/// Queries that list every account regardless of name or id.
const LIST_ALL_KEYWORDS: [&str; 2] = ["balances", "accounts"];

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResultItem {
    pub id: String,
    /// Account name, with the dollar balance appended when known
    pub title: String,
    pub url: String,
}

/// Payload carried inside the search envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchResults {
    pub results: Vec<ResultItem>,
}

/// Case-insensitive match of `query` against an account.
pub fn matches(account: &Account, query: &str) -> bool {
    let query = query.to_lowercase();
    query.is_empty()
        || LIST_ALL_KEYWORDS.contains(&query.as_str())
        || account.name.to_lowercase().contains(&query)
        || account.id.to_lowercase().contains(&query)
}

/// First [`MAX_RESULTS`] matching accounts, in upstream order.
pub fn search(accounts: &[Account], query: &str, app_base: &str) -> SearchResults {
    let results = accounts
        .iter()
        .filter(|account| matches(account, query))
        .take(MAX_RESULTS)
        .map(|account| ResultItem {
            id: account.id.clone(),
            title: account.title(),
            url: account_url(app_base, &account.id),
        })
        .collect();
    SearchResults { results }
}
