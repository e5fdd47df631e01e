//! Balance summaries, low-balance alerts and transaction trend statistics.
//!
//! Every function here is a total reduction over caller-supplied records.
//! Empty inputs produce zeroed results, never errors.

use chrono::Local;
use shared::{
    AccountResponse, Alert, AlertSeverity, BalanceSummary, EnrichedTransaction, TrendStatistics,
};

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Aggregate a list of account balance snapshots into a summary.
///
/// The currency label is adopted from the first account without checking
/// that the set is single-currency; balances are summed as raw numbers
/// either way. Empty input yields a zeroed summary labeled EUR.
pub fn calculate_balance_summary(
    accounts: Vec<AccountResponse>,
    date: Option<String>,
) -> BalanceSummary {
    let date = date.unwrap_or_else(today);

    if accounts.is_empty() {
        return BalanceSummary {
            total_balance: 0.0,
            currency: "EUR".to_string(),
            account_count: 0,
            highest_balance: 0.0,
            lowest_balance: 0.0,
            average_balance: 0.0,
            total_overdraft_allowed: 0.0,
            date,
            accounts: Vec::new(),
        };
    }

    let currency = accounts[0].currency.clone();
    let total_balance: f64 = accounts.iter().map(|a| a.balance).sum();
    let highest_balance = accounts.iter().map(|a| a.balance).fold(f64::MIN, f64::max);
    let lowest_balance = accounts.iter().map(|a| a.balance).fold(f64::MAX, f64::min);
    let total_overdraft_allowed: f64 = accounts.iter().map(|a| a.allowed_overdraft).sum();
    let account_count = accounts.len();

    BalanceSummary {
        total_balance,
        currency,
        account_count,
        highest_balance,
        lowest_balance,
        average_balance: total_balance / account_count as f64,
        total_overdraft_allowed,
        date,
        accounts,
    }
}

/// Detect accounts whose balance is low relative to their overdraft.
///
/// For accounts with an overdraft allowance, an alert fires when the
/// balance drops strictly below `allowed_overdraft * threshold_percentage`
/// (severity `high` once negative, `medium` otherwise). Accounts without an
/// allowance alert as `critical` on any negative balance. Output follows
/// input order.
pub fn detect_low_balance_alerts(
    accounts: &[AccountResponse],
    threshold_percentage: f64,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for account in accounts {
        if account.allowed_overdraft > 0.0 {
            let threshold = account.allowed_overdraft * threshold_percentage;
            if account.balance < threshold {
                let severity = if account.balance < 0.0 {
                    AlertSeverity::High
                } else {
                    AlertSeverity::Medium
                };
                alerts.push(Alert {
                    account: account.account.clone(),
                    iban: account.iban.clone(),
                    balance: account.balance,
                    allowed_overdraft: account.allowed_overdraft,
                    severity,
                    message: format!(
                        "Balance faible sur {}: {} {}",
                        account.account, account.balance, account.currency
                    ),
                });
            }
        } else if account.balance < 0.0 {
            alerts.push(Alert {
                account: account.account.clone(),
                iban: account.iban.clone(),
                balance: account.balance,
                allowed_overdraft: 0.0,
                severity: AlertSeverity::Critical,
                message: format!("Découvert non autorisé sur {}", account.account),
            });
        }
    }

    alerts
}

/// Reduce enriched transactions to income/expense trend statistics.
pub fn calculate_transaction_trends(transactions: &[EnrichedTransaction]) -> TrendStatistics {
    if transactions.is_empty() {
        return TrendStatistics::empty();
    }

    let income: Vec<f64> = transactions
        .iter()
        .filter(|t| !t.is_debit)
        .map(|t| t.amount)
        .collect();
    let expenses: Vec<f64> = transactions
        .iter()
        .filter(|t| t.is_debit)
        .map(|t| t.amount.abs())
        .collect();

    let total_income: f64 = income.iter().sum();
    let total_expenses: f64 = expenses.iter().sum();
    let absolute_total: f64 = transactions.iter().map(|t| t.amount.abs()).sum();

    TrendStatistics {
        total_income,
        total_expenses,
        net_flow: total_income - total_expenses,
        transaction_count: transactions.len(),
        avg_transaction: absolute_total / transactions.len() as f64,
        largest_income: income.iter().fold(0.0, |acc, &v| acc.max(v)),
        largest_expense: expenses.iter().fold(0.0, |acc, &v| acc.max(v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enrichment::enrich_transaction;
    use shared::TransactionResponse;

    fn account(
        description: &str,
        balance: f64,
        currency: &str,
        allowed_overdraft: f64,
    ) -> AccountResponse {
        AccountResponse {
            account: description.to_string(),
            iban: format!("FR76{:023}", description.len()),
            company: "ACME Corporation".to_string(),
            date: "2026-01-15".to_string(),
            balance,
            currency: currency.to_string(),
            allowed_overdraft,
        }
    }

    fn enriched(amount: f64, is_debit: bool) -> EnrichedTransaction {
        enrich_transaction(&TransactionResponse {
            account: "Main Business Account".to_string(),
            iban: "FR7612345678901234567890123".to_string(),
            company: "ACME Corporation".to_string(),
            operation_date: "2026-01-15".to_string(),
            value_date: "2026-01-15".to_string(),
            amount,
            currency: "EUR".to_string(),
            is_debit,
        })
    }

    #[test]
    fn summary_of_empty_input_is_zeroed_eur() {
        let summary = calculate_balance_summary(Vec::new(), None);
        assert_eq!(summary.total_balance, 0.0);
        assert_eq!(summary.account_count, 0);
        assert_eq!(summary.currency, "EUR");
        assert_eq!(summary.average_balance, 0.0);
        assert!(summary.accounts.is_empty());
    }

    #[test]
    fn summary_aggregates_balances() {
        let accounts = vec![
            account("Main Business Account", 150_000.50, "EUR", 10_000.0),
            account("Savings Account", 500_000.00, "EUR", 0.0),
            account("USD Operating Account", 75_000.00, "USD", 5_000.0),
        ];
        let summary =
            calculate_balance_summary(accounts, Some("2026-01-15".to_string()));

        assert_eq!(summary.total_balance, 725_000.50);
        assert_eq!(summary.account_count, 3);
        assert_eq!(summary.highest_balance, 500_000.00);
        assert_eq!(summary.lowest_balance, 75_000.00);
        assert!((summary.average_balance - 241_666.8333).abs() < 0.001);
        assert_eq!(summary.total_overdraft_allowed, 15_000.0);
        assert_eq!(summary.date, "2026-01-15");
        assert_eq!(summary.accounts.len(), 3);
    }

    #[test]
    fn summary_adopts_first_currency() {
        // Mixed-currency sets are summed raw and labeled with the first
        // account's currency.
        let accounts = vec![
            account("USD Operating Account", 75_000.00, "USD", 5_000.0),
            account("Main Business Account", 150_000.50, "EUR", 10_000.0),
        ];
        let summary = calculate_balance_summary(accounts, Some("2026-01-15".to_string()));
        assert_eq!(summary.currency, "USD");
        assert_eq!(summary.total_balance, 225_000.50);
    }

    #[test]
    fn summary_defaults_date_to_today() {
        let summary = calculate_balance_summary(Vec::new(), None);
        assert_eq!(summary.date, Local::now().format("%Y-%m-%d").to_string());
    }

    #[test]
    fn unauthorized_overdraft_is_critical() {
        let accounts = vec![account("Negative Account", -5_000.0, "EUR", 0.0)];
        let alerts = detect_low_balance_alerts(&accounts, 0.1);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert!(alerts[0].message.contains("Découvert non autorisé"));
    }

    #[test]
    fn alert_threshold_boundary_is_strict() {
        let below = vec![account("Main Business Account", 999.99, "EUR", 10_000.0)];
        assert_eq!(detect_low_balance_alerts(&below, 0.1).len(), 1);

        let at_threshold = vec![account("Main Business Account", 1_000.00, "EUR", 10_000.0)];
        assert!(detect_low_balance_alerts(&at_threshold, 0.1).is_empty());
    }

    #[test]
    fn negative_balance_with_overdraft_is_high() {
        let accounts = vec![account("Main Business Account", -2_500.0, "EUR", 10_000.0)];
        let alerts = detect_low_balance_alerts(&accounts, 0.1);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::High);
        assert!(alerts[0].message.contains("Balance faible"));
    }

    #[test]
    fn healthy_accounts_raise_no_alert() {
        let accounts = vec![
            account("Main Business Account", 150_000.50, "EUR", 10_000.0),
            account("Zero Balance Account", 0.0, "EUR", 0.0),
        ];
        assert!(detect_low_balance_alerts(&accounts, 0.1).is_empty());
    }

    #[test]
    fn alerts_preserve_input_order() {
        let accounts = vec![
            account("B Account", 500.0, "EUR", 10_000.0),
            account("A Account", -5_000.0, "EUR", 0.0),
        ];
        let alerts = detect_low_balance_alerts(&accounts, 0.1);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].account, "B Account");
        assert_eq!(alerts[1].account, "A Account");
    }

    #[test]
    fn trends_of_empty_input_are_zero() {
        assert_eq!(calculate_transaction_trends(&[]), TrendStatistics::empty());
    }

    #[test]
    fn trends_over_one_credit_and_one_debit() {
        let transactions = vec![enriched(6_500.0, false), enriched(2_500.0, true)];
        let trends = calculate_transaction_trends(&transactions);

        assert_eq!(trends.total_income, 6_500.0);
        assert_eq!(trends.total_expenses, 2_500.0);
        assert_eq!(trends.net_flow, 4_000.0);
        assert_eq!(trends.transaction_count, 2);
        assert_eq!(trends.avg_transaction, 4_500.0);
        assert_eq!(trends.largest_income, 6_500.0);
        assert_eq!(trends.largest_expense, 2_500.0);
    }

    #[test]
    fn trends_with_only_expenses_report_zero_income() {
        let transactions = vec![enriched(1_200.0, true), enriched(300.0, true)];
        let trends = calculate_transaction_trends(&transactions);

        assert_eq!(trends.total_income, 0.0);
        assert_eq!(trends.largest_income, 0.0);
        assert_eq!(trends.total_expenses, 1_500.0);
        assert_eq!(trends.net_flow, -1_500.0);
    }
}
