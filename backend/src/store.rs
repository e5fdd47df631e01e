//! In-memory mock data store for account balances and transactions.
//!
//! The store is an immutable snapshot built once at startup (or injected by
//! tests) and shared behind an `Arc`; request handlers only ever read from
//! it. In a real deployment this is where a core-banking feed would land.

use chrono::{Days, NaiveDate};
use shared::{Account, AccountResponse, Transaction, TransactionResponse};

const SEED_START: &str = "2026-01-01";
const SEED_DAYS: u64 = 30;
const SEED_TRANSACTION_COUNT: usize = 50;

/// Transaction shapes used by the seed generator: description, amount
/// bounds and direction.
const TRANSACTION_PROFILES: &[(&str, f64, f64, bool)] = &[
    ("Salary Payment", 3000.0, 8000.0, false),
    ("Customer Payment", 1000.0, 10000.0, false),
    ("Investment Return", 500.0, 2000.0, false),
    ("Interest Income", 50.0, 300.0, false),
    ("Refund", 100.0, 800.0, false),
    ("Commission", 200.0, 1500.0, false),
    ("Rent Payment", 1500.0, 3000.0, true),
    ("Supplier Payment", 500.0, 5000.0, true),
    ("Utility Bill", 100.0, 500.0, true),
    ("Bank Fees", 10.0, 50.0, true),
    ("Tax Payment", 1000.0, 5000.0, true),
    ("Insurance Premium", 200.0, 800.0, true),
    ("Subscription Service", 20.0, 200.0, true),
    ("ATM Withdrawal", 50.0, 500.0, true),
    ("Card Payment", 15.0, 300.0, true),
    ("Direct Debit", 30.0, 400.0, true),
    ("Wire Transfer", 1000.0, 15000.0, true),
    ("Check Payment", 200.0, 3000.0, true),
    ("Equipment Purchase", 500.0, 20000.0, true),
    ("Travel Expense", 100.0, 2000.0, true),
    ("Office Supplies", 50.0, 800.0, true),
    ("Marketing Expense", 300.0, 5000.0, true),
    ("Legal Fees", 500.0, 3000.0, true),
    ("Accounting Services", 300.0, 1500.0, true),
];

struct AccountProfile {
    description: &'static str,
    iban: &'static str,
    company: &'static str,
    currency: &'static str,
    initial_balance: f64,
    allowed_overdraft: f64,
}

const ACCOUNT_PROFILES: &[AccountProfile] = &[
    AccountProfile {
        description: "Main Business Account",
        iban: "FR7612345678901234567890123",
        company: "ACME Corporation",
        currency: "EUR",
        initial_balance: 150_000.00,
        allowed_overdraft: 10_000.0,
    },
    AccountProfile {
        description: "Savings Account",
        iban: "FR7698765432109876543210987",
        company: "ACME Corporation",
        currency: "EUR",
        initial_balance: 500_000.00,
        allowed_overdraft: 0.0,
    },
    AccountProfile {
        description: "USD Operating Account",
        iban: "US1234567890123456789012345",
        company: "ACME USA Inc",
        currency: "USD",
        initial_balance: 75_000.00,
        allowed_overdraft: 5_000.0,
    },
];

// Per-account daily balance movement, varied by position in the cycle.
fn daily_change(profile_index: usize, day: u64) -> f64 {
    match profile_index {
        0 => -1500.0 + (day % 7) as f64 * 500.0,
        1 => {
            if day % 5 == 0 {
                200.0
            } else {
                0.0
            }
        }
        _ => -800.0 + (day % 10) as f64 * 300.0,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Read-only snapshot of mock account balances and transactions.
pub struct MockDataStore {
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
}

impl MockDataStore {
    /// Build a store over caller-supplied records. This is the injection
    /// seam tests use in place of seeded data.
    pub fn with_data(accounts: Vec<Account>, transactions: Vec<Transaction>) -> Self {
        Self {
            accounts,
            transactions,
        }
    }

    /// Deterministic demo data set: 30 daily snapshots for three accounts
    /// starting 2026-01-01, plus 50 transactions spread over January 2026.
    pub fn seed() -> Self {
        let start = NaiveDate::parse_from_str(SEED_START, "%Y-%m-%d").expect("valid seed date");

        let mut accounts = Vec::new();
        for (index, profile) in ACCOUNT_PROFILES.iter().enumerate() {
            let mut balance = profile.initial_balance;
            for day in 0..SEED_DAYS {
                balance = round2(balance + daily_change(index, day));
                let date = start + Days::new(day);
                accounts.push(Account {
                    account_description: profile.description.to_string(),
                    iban: profile.iban.to_string(),
                    holder_company_name: profile.company.to_string(),
                    date: date.format("%Y-%m-%d").to_string(),
                    value_balance: balance,
                    currency: profile.currency.to_string(),
                    allowed_overdraft: profile.allowed_overdraft,
                });
            }
        }

        let mut transactions = Vec::new();
        for i in 0..SEED_TRANSACTION_COUNT {
            let (description, min, max, is_debit) = TRANSACTION_PROFILES[i % TRANSACTION_PROFILES.len()];
            let profile = &ACCOUNT_PROFILES[i % ACCOUNT_PROFILES.len()];

            let day_offset = (i as u64 * 7) % 31;
            let operation = start + Days::new(day_offset);
            let value = operation + Days::new(i as u64 % 3);
            let fraction = (i as f64 * 37.0) % 100.0 / 100.0;

            transactions.push(Transaction {
                account_description: description.to_string(),
                iban: profile.iban.to_string(),
                holder_company_name: profile.company.to_string(),
                operation_date: operation.format("%Y-%m-%d").to_string(),
                value_date: value.format("%Y-%m-%d").to_string(),
                amount: round2(min + (max - min) * fraction),
                currency: profile.currency.to_string(),
                is_debit,
            });
        }
        transactions.sort_by(|a, b| a.operation_date.cmp(&b.operation_date));

        Self::with_data(accounts, transactions)
    }

    /// Balances whose snapshot date equals `date`, in store order.
    pub fn accounts_on(&self, date: &str) -> Vec<AccountResponse> {
        self.accounts
            .iter()
            .filter(|account| account.date == date)
            .map(account_response)
            .collect()
    }

    /// Balances within the inclusive `[start, end]` date window.
    ///
    /// Dates are fixed-width `YYYY-MM-DD`, so the lexicographic comparison
    /// is the chronological one.
    pub fn accounts_between(&self, start: &str, end: &str) -> Vec<AccountResponse> {
        self.accounts
            .iter()
            .filter(|account| account.date.as_str() >= start && account.date.as_str() <= end)
            .map(account_response)
            .collect()
    }

    /// Transactions whose operation date falls within the inclusive
    /// `[from, to]` window, in store order.
    pub fn transactions_between(&self, from: &str, to: &str) -> Vec<TransactionResponse> {
        self.transactions
            .iter()
            .filter(|t| t.operation_date.as_str() >= from && t.operation_date.as_str() <= to)
            .map(transaction_response)
            .collect()
    }

    /// The most recent snapshot date present in the store, if any.
    pub fn latest_snapshot_date(&self) -> Option<String> {
        self.accounts.iter().map(|a| a.date.clone()).max()
    }
}

fn account_response(account: &Account) -> AccountResponse {
    AccountResponse {
        account: account.account_description.clone(),
        iban: account.iban.clone(),
        company: account.holder_company_name.clone(),
        date: account.date.clone(),
        balance: account.value_balance,
        currency: account.currency.clone(),
        allowed_overdraft: account.allowed_overdraft,
    }
}

fn transaction_response(transaction: &Transaction) -> TransactionResponse {
    TransactionResponse {
        account: transaction.account_description.clone(),
        iban: transaction.iban.clone(),
        company: transaction.holder_company_name.clone(),
        operation_date: transaction.operation_date.clone(),
        value_date: transaction.value_date.clone(),
        amount: transaction.amount,
        currency: transaction.currency.clone(),
        is_debit: transaction.is_debit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(date: &str, balance: f64) -> Account {
        Account {
            account_description: "Main Business Account".to_string(),
            iban: "FR7612345678901234567890123".to_string(),
            holder_company_name: "ACME Corporation".to_string(),
            date: date.to_string(),
            value_balance: balance,
            currency: "EUR".to_string(),
            allowed_overdraft: 10_000.0,
        }
    }

    fn transaction(operation_date: &str, amount: f64) -> Transaction {
        Transaction {
            account_description: "Supplier Payment".to_string(),
            iban: "FR7612345678901234567890123".to_string(),
            holder_company_name: "ACME Corporation".to_string(),
            operation_date: operation_date.to_string(),
            value_date: operation_date.to_string(),
            amount,
            currency: "EUR".to_string(),
            is_debit: true,
        }
    }

    #[test]
    fn seed_produces_ninety_snapshots() {
        let store = MockDataStore::seed();
        assert_eq!(store.accounts.len(), 90);
        assert_eq!(store.accounts_on("2026-01-01").len(), 3);
        assert_eq!(store.accounts_on("2026-01-30").len(), 3);
        assert!(store.accounts_on("2026-02-01").is_empty());
    }

    #[test]
    fn seed_transactions_stay_in_january() {
        let store = MockDataStore::seed();
        assert_eq!(store.transactions.len(), 50);
        for t in &store.transactions {
            assert!(t.operation_date.as_str() >= "2026-01-01");
            assert!(t.operation_date.as_str() <= "2026-01-31");
            assert!(t.amount >= 0.0);
        }
    }

    #[test]
    fn seed_transactions_are_sorted_by_operation_date() {
        let store = MockDataStore::seed();
        for pair in store.transactions.windows(2) {
            assert!(pair[0].operation_date <= pair[1].operation_date);
        }
    }

    #[test]
    fn seed_is_deterministic() {
        let first = MockDataStore::seed();
        let second = MockDataStore::seed();
        assert_eq!(first.accounts, second.accounts);
        assert_eq!(first.transactions, second.transactions);
    }

    #[test]
    fn accounts_on_matches_exact_date_only() {
        let store = MockDataStore::with_data(
            vec![account("2026-01-15", 1000.0), account("2026-01-16", 900.0)],
            Vec::new(),
        );
        let found = store.accounts_on("2026-01-15");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].balance, 1000.0);
        // Field renames applied by the response transform
        assert_eq!(found[0].account, "Main Business Account");
        assert_eq!(found[0].company, "ACME Corporation");
    }

    #[test]
    fn accounts_between_is_inclusive() {
        let store = MockDataStore::with_data(
            vec![
                account("2026-01-01", 1.0),
                account("2026-01-10", 2.0),
                account("2026-01-11", 3.0),
            ],
            Vec::new(),
        );
        let found = store.accounts_between("2026-01-01", "2026-01-10");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn transactions_between_includes_boundary_dates() {
        let store = MockDataStore::with_data(
            Vec::new(),
            vec![
                transaction("2026-01-05", 100.0),
                transaction("2026-01-10", 200.0),
                transaction("2026-01-15", 300.0),
            ],
        );
        let found = store.transactions_between("2026-01-05", "2026-01-15");
        assert_eq!(found.len(), 3);

        let narrowed = store.transactions_between("2026-01-06", "2026-01-14");
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].amount, 200.0);
    }

    #[test]
    fn latest_snapshot_date_over_seeded_data() {
        let store = MockDataStore::seed();
        assert_eq!(store.latest_snapshot_date().as_deref(), Some("2026-01-30"));
        let empty = MockDataStore::with_data(Vec::new(), Vec::new());
        assert_eq!(empty.latest_snapshot_date(), None);
    }
}
