//! Shared data types for the finance dashboard.
//!
//! Every wire-visible record lives here so the backend service and any
//! future consumer agree on one serialized shape. Account and transaction
//! records come in two flavors: the internal snapshot shape as supplied by
//! the upstream data feed, and the response shape with renamed fields that
//! the API exposes.

use serde::{Deserialize, Serialize};

/// Bank account balance snapshot as supplied by the data feed.
///
/// Identity is (iban, date); several snapshots of the same IBAN over time
/// form a balance timeline. Snapshots are never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_description: String,
    /// International Bank Account Number
    pub iban: String,
    pub holder_company_name: String,
    /// Date of the balance (YYYY-MM-DD)
    pub date: String,
    pub value_balance: f64,
    /// Currency code (e.g., EUR, USD)
    pub currency: String,
    /// Allowed overdraft amount (>= 0)
    #[serde(default)]
    pub allowed_overdraft: f64,
}

/// Account balance as exposed by the API, with renamed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountResponse {
    pub account: String,
    pub iban: String,
    pub company: String,
    pub date: String,
    pub balance: f64,
    pub currency: String,
    #[serde(default)]
    pub allowed_overdraft: f64,
}

/// Bank transaction as supplied by the data feed.
///
/// A value object: there is no transaction id, and duplicate records are
/// legal independent ledger entries. The amount is a non-negative magnitude;
/// the direction lives in `is_debit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub account_description: String,
    pub iban: String,
    pub holder_company_name: String,
    /// Operation date (YYYY-MM-DD)
    pub operation_date: String,
    /// Value date (YYYY-MM-DD)
    pub value_date: String,
    pub amount: f64,
    pub currency: String,
    /// True if the transaction decreases the balance (an expense)
    pub is_debit: bool,
}

/// Transaction as exposed by the API, with renamed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub account: String,
    pub iban: String,
    pub company: String,
    pub operation_date: String,
    pub value_date: String,
    pub amount: f64,
    pub currency: String,
    pub is_debit: bool,
}

/// One entry of the fixed transaction category catalog.
///
/// Categories are assigned by the enrichment rules, never created per
/// transaction, and referenced by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionCategory {
    pub id: String,
    /// Display name
    pub name: String,
    /// Icon identifier for UI
    pub icon: Option<String>,
    /// Color code for UI (e.g., #FF5733)
    pub color: Option<String>,
    pub description: Option<String>,
}

/// A transaction plus derived classification metadata.
///
/// Recomputed on every enrichment call; never cached or persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTransaction {
    pub account: String,
    pub iban: String,
    pub company: String,
    pub operation_date: String,
    pub value_date: String,
    pub amount: f64,
    pub currency: String,
    pub is_debit: bool,
    pub category: Option<TransactionCategory>,
    /// Detected merchant name
    pub merchant: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Point-in-time aggregate over a set of account balance snapshots.
///
/// The currency label is taken from the first account of the input set;
/// balances are summed as raw numbers regardless of currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub total_balance: f64,
    pub currency: String,
    pub account_count: usize,
    pub highest_balance: f64,
    pub lowest_balance: f64,
    pub average_balance: f64,
    pub total_overdraft_allowed: f64,
    /// Reporting date (YYYY-MM-DD)
    pub date: String,
    /// The underlying account list, attached for drill-down display
    pub accounts: Vec<AccountResponse>,
}

/// Severity of a low-balance alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    High,
    Medium,
}

/// Low-balance alert for a single account snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub account: String,
    pub iban: String,
    pub balance: f64,
    pub allowed_overdraft: f64,
    pub severity: AlertSeverity,
    pub message: String,
}

/// Alerts endpoint payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
    pub count: usize,
}

/// Income/expense statistics over a set of enriched transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendStatistics {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_flow: f64,
    pub transaction_count: usize,
    /// Mean absolute amount over all transactions, debits and credits alike
    pub avg_transaction: f64,
    pub largest_income: f64,
    pub largest_expense: f64,
}

impl TrendStatistics {
    /// The all-zero statistics returned for an empty transaction set.
    pub fn empty() -> Self {
        Self {
            total_income: 0.0,
            total_expenses: 0.0,
            net_flow: 0.0,
            transaction_count: 0,
            avg_transaction: 0.0,
            largest_income: 0.0,
            largest_expense: 0.0,
        }
    }
}

/// Sender role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

/// Individual message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    /// Session identifier for conversation grouping
    pub session_id: String,
    pub role: ChatRole,
    pub content: String,
    /// Message timestamp (ISO 8601)
    pub timestamp: String,
}

/// Chat conversation session with its ordered message history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub session_id: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub is_active: bool,
}

/// Request to send a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Existing session id; a new session is created when absent
    pub session_id: Option<String>,
}

/// Assistant reply plus suggested follow-up questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub message: ChatMessage,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_severity_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AlertSeverity::Critical).unwrap(),
            "\"critical\""
        );
        assert_eq!(
            serde_json::to_string(&AlertSeverity::Medium).unwrap(),
            "\"medium\""
        );
    }

    #[test]
    fn chat_role_round_trips() {
        let role: ChatRole = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(role, ChatRole::Assistant);
    }

    #[test]
    fn account_overdraft_defaults_to_zero() {
        let json = r#"{
            "account_description": "Main Business Account",
            "iban": "FR7612345678901234567890123",
            "holder_company_name": "ACME Corporation",
            "date": "2026-01-15",
            "value_balance": 150000.5,
            "currency": "EUR"
        }"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.allowed_overdraft, 0.0);
    }

    #[test]
    fn enriched_transaction_tags_default_empty() {
        let json = r#"{
            "account": "Main Business Account",
            "iban": "FR7612345678901234567890123",
            "company": "ACME Corporation",
            "operation_date": "2026-01-15",
            "value_date": "2026-01-15",
            "amount": 1500.75,
            "currency": "EUR",
            "is_debit": true,
            "category": null,
            "merchant": null
        }"#;
        let enriched: EnrichedTransaction = serde_json::from_str(json).unwrap();
        assert!(enriched.tags.is_empty());
    }
}
