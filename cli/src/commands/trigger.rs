use seqbridge_core::auth::BEARER_PREFIX;

use crate::util::{api_request, exit_error};

/// Rule ids are interpolated into the path, so keep them to one segment.
pub fn valid_rule_id(rule_id: &str) -> bool {
    !rule_id.is_empty()
        && rule_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

pub async fn run(api_url: &str, rule_id: &str, admin_token: Option<&str>) -> i32 {
    if !valid_rule_id(rule_id) {
        exit_error(
            &format!("Invalid rule id: '{rule_id}'"),
            Some("Rule ids look like ru_123 (letters, digits, '_' and '-')"),
        );
    }
    let token = match admin_token.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => t,
        None => exit_error(
            "Admin token is required to trigger rules",
            Some("Pass --admin-token or set MCP_ADMIN_TOKEN"),
        ),
    };

    let headers = vec![("x-admin".to_string(), format!("{BEARER_PREFIX}{token}"))];
    api_request(
        api_url,
        reqwest::Method::POST,
        &format!("/rules/{rule_id}/trigger"),
        &headers,
        None,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::valid_rule_id;

    #[test]
    fn rule_ids_are_single_path_segments() {
        assert!(valid_rule_id("ru_123"));
        assert!(valid_rule_id("ru-abc_9"));
        assert!(!valid_rule_id(""));
        assert!(!valid_rule_id("ru_1/../../accounts"));
        assert!(!valid_rule_id("ru 1"));
    }
}
