use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

/// Sweep parameters, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepConfig {
    /// Dollars left untouched in checking
    pub buffer: i64,
    /// Fraction of the excess to move, 0..=1
    pub percent: f64,
    /// Upper bound on a single transfer, in cents
    pub daily_cap_cents: i64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            buffer: 1000,
            percent: 0.30,
            daily_cap_cents: 30_000,
        }
    }
}

/// Response body for the remote amount query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AmountResponse {
    #[serde(rename = "amountInCents")]
    pub amount_in_cents: i64,
}

#[derive(Debug, Error, PartialEq)]
pub enum BalanceError {
    #[error("checkingBalance must be a number, got {0}")]
    NotNumeric(Value),
}

impl SweepConfig {
    /// `floor(min(max(0, balance - buffer) * percent * 100, cap))`
    pub fn compute_amount(&self, checking_balance: f64) -> AmountResponse {
        let excess = (checking_balance - self.buffer as f64).max(0.0);
        let cents = (excess * self.percent * 100.0).min(self.daily_cap_cents as f64);
        AmountResponse {
            amount_in_cents: cents.floor() as i64,
        }
    }
}

/// Read a checking balance from a request field.
///
/// Absent or null counts as zero; numeric strings are accepted because some
/// automation platforms template numbers into strings.
pub fn parse_checking_balance(value: Option<&Value>) -> Result<f64, BalanceError> {
    let parsed = match value {
        None | Some(Value::Null) => Some(0.0),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match parsed {
        Some(balance) if balance.is_finite() => Ok(balance),
        _ => Err(BalanceError::NotNumeric(
            value.cloned().unwrap_or(Value::Null),
        )),
    }
}
