//! Transaction enrichment: rule-based categorization, merchant extraction,
//! tagging and criteria filtering.
//!
//! Categorization is deterministic keyword matching over the transaction
//! description. The rules are an ordered table so precedence is auditable:
//! the first bucket whose keyword list matches wins.

use once_cell::sync::Lazy;
use shared::{EnrichedTransaction, TransactionCategory, TransactionResponse};

/// Credits above this amount are classified as salary.
const SALARY_THRESHOLD: f64 = 10_000.0;

/// Uncategorized debits above this amount fall back to equipment.
const LARGE_EXPENSE_THRESHOLD: f64 = 50_000.0;

/// Transactions above this amount receive the `large` tag.
const LARGE_TAG_THRESHOLD: f64 = 10_000.0;

/// Ordered debit classification rules: first matching bucket wins.
/// Keywords are matched as case-insensitive substrings of the description.
const KEYWORD_RULES: &[(&str, &[&str])] = &[
    ("supplies", &["fourniture", "office", "supply"]),
    ("utilities", &["electric", "water", "gaz"]),
    ("rent", &["rent", "loyer"]),
    ("insurance", &["insurance", "assurance"]),
    ("tax", &["tax", "impot", "fiscal"]),
    ("equipment", &["equipment", "equipement", "materiel"]),
    ("travel", &["travel", "deplacement", "voyage"]),
];

/// Words dropped before the merchant name is assembled.
const MERCHANT_STOP_WORDS: &[&str] = &["to", "from", "payment", "transfer", "paiement", "virement"];

fn category(
    id: &str,
    name: &str,
    icon: &str,
    color: &str,
    description: &str,
) -> TransactionCategory {
    TransactionCategory {
        id: id.to_string(),
        name: name.to_string(),
        icon: Some(icon.to_string()),
        color: Some(color.to_string()),
        description: Some(description.to_string()),
    }
}

/// The fixed category catalog. Closed: enrichment assigns these entries and
/// never invents new ones.
static CATEGORIES: Lazy<Vec<TransactionCategory>> = Lazy::new(|| {
    vec![
        category("salary", "Salaire", "money-bill-wave", "#28a745", "Revenus salariaux"),
        category("supplies", "Fournitures", "box", "#6c757d", "Achats de fournitures"),
        category("utilities", "Services publics", "bolt", "#ffc107", "Électricité, eau, gaz"),
        category("rent", "Loyer", "building", "#17a2b8", "Paiements de loyer"),
        category("insurance", "Assurance", "shield-alt", "#007bff", "Primes d'assurance"),
        category("tax", "Taxes", "file-invoice-dollar", "#dc3545", "Impôts et taxes"),
        category("equipment", "Équipement", "tools", "#6610f2", "Achats d'équipement"),
        category("travel", "Déplacements", "plane", "#fd7e14", "Frais de déplacement"),
        category("other_income", "Autres revenus", "plus-circle", "#20c997", "Revenus divers"),
        category("other_expense", "Autres dépenses", "minus-circle", "#e83e8c", "Dépenses diverses"),
    ]
});

/// All available transaction categories, in catalog order.
pub fn category_catalog() -> &'static [TransactionCategory] {
    &CATEGORIES
}

fn category_by_id(id: &str) -> TransactionCategory {
    CATEGORIES
        .iter()
        .find(|c| c.id == id)
        .cloned()
        .expect("catalog contains every rule id")
}

/// Assign a category from the amount, direction and free-text description.
///
/// Credits split on the salary threshold. Debits run through the ordered
/// keyword table, then the large-expense fallback, then `other_expense`.
/// Total: always returns a catalog entry, an empty description simply
/// matches no keyword.
pub fn categorize(amount: f64, is_debit: bool, description: &str) -> TransactionCategory {
    if !is_debit {
        if amount > SALARY_THRESHOLD {
            return category_by_id("salary");
        }
        return category_by_id("other_income");
    }

    let description = description.to_lowercase();
    for (id, keywords) in KEYWORD_RULES {
        if keywords.iter().any(|keyword| description.contains(keyword)) {
            return category_by_id(id);
        }
    }

    if amount > LARGE_EXPENSE_THRESHOLD {
        return category_by_id("equipment");
    }
    category_by_id("other_expense")
}

/// Extract a merchant name from the description.
///
/// Whitespace-split, drop stop words, keep at most the first three remaining
/// words and title-case the result. Returns `None` when nothing survives the
/// stop list.
pub fn extract_merchant(description: &str) -> Option<String> {
    let words: Vec<&str> = description
        .split_whitespace()
        .filter(|word| !MERCHANT_STOP_WORDS.contains(&word.to_lowercase().as_str()))
        .collect();

    if words.is_empty() {
        return None;
    }
    let kept = &words[..words.len().min(3)];
    Some(title_case(&kept.join(" ")))
}

// Capitalizes the first letter of every alphabetic run, lowercases the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alphabetic = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_alphabetic {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alphabetic = true;
        } else {
            out.push(ch);
            prev_alphabetic = false;
        }
    }
    out
}

/// Enrich a transaction with category, merchant and tags.
///
/// Pure and deterministic: enriching the same transaction twice yields the
/// same category, merchant and tag set.
pub fn enrich_transaction(transaction: &TransactionResponse) -> EnrichedTransaction {
    let category = categorize(
        transaction.amount,
        transaction.is_debit,
        &transaction.account,
    );
    let merchant = extract_merchant(&transaction.account);

    let mut tags = Vec::new();
    if transaction.amount > LARGE_TAG_THRESHOLD {
        tags.push("large".to_string());
    }
    if transaction.is_debit {
        tags.push("expense".to_string());
    } else {
        tags.push("income".to_string());
    }

    EnrichedTransaction {
        account: transaction.account.clone(),
        iban: transaction.iban.clone(),
        company: transaction.company.clone(),
        operation_date: transaction.operation_date.clone(),
        value_date: transaction.value_date.clone(),
        amount: transaction.amount,
        currency: transaction.currency.clone(),
        is_debit: transaction.is_debit,
        category: Some(category),
        merchant,
        tags,
    }
}

/// Optional filter criteria for enriched transactions. Present criteria are
/// AND-composed; absent ones are no-ops.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub category_ids: Option<Vec<String>>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub is_debit: Option<bool>,
}

/// Narrow a transaction list by the supplied criteria, preserving order.
///
/// Amount bounds are inclusive and compare against the absolute amount. An
/// empty category-id list is treated as absent.
pub fn filter_transactions(
    transactions: Vec<EnrichedTransaction>,
    criteria: &FilterCriteria,
) -> Vec<EnrichedTransaction> {
    let mut filtered = transactions;

    if let Some(ids) = &criteria.category_ids {
        if !ids.is_empty() {
            filtered.retain(|t| {
                t.category
                    .as_ref()
                    .map_or(false, |category| ids.contains(&category.id))
            });
        }
    }
    if let Some(min_amount) = criteria.min_amount {
        filtered.retain(|t| t.amount.abs() >= min_amount);
    }
    if let Some(max_amount) = criteria.max_amount {
        filtered.retain(|t| t.amount.abs() <= max_amount);
    }
    if let Some(is_debit) = criteria.is_debit {
        filtered.retain(|t| t.is_debit == is_debit);
    }

    filtered
}
