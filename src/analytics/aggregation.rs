//! Aggregation of transactions into the buckets shown on the analytics page.

use std::collections::BTreeMap;

use time::Date;

use crate::transaction::{Transaction, TransactionType};

/// Total expenses per category, largest first.
///
/// Only expense transactions contribute. Categories with equal totals are
/// ordered by name so the output is stable.
pub fn expenses_by_category(transactions: &[Transaction]) -> Vec<(String, f64)> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();

    for transaction in transactions {
        if transaction.transaction_type == TransactionType::Expense {
            *totals.entry(transaction.category.as_str()).or_insert(0.0) += transaction.amount;
        }
    }

    let mut buckets: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(category, total)| (category.to_owned(), total))
        .collect();
    buckets.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    buckets
}

/// The income and expense totals for a single day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyTotals {
    pub date: Date,
    pub income: f64,
    pub expense: f64,
}

/// Income and expense totals per day, oldest first.
///
/// Days without income or expense transactions are omitted.
pub fn daily_trend(transactions: &[Transaction]) -> Vec<DailyTotals> {
    let mut totals: BTreeMap<Date, (f64, f64)> = BTreeMap::new();

    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Income => {
                totals.entry(transaction.date).or_insert((0.0, 0.0)).0 += transaction.amount;
            }
            TransactionType::Expense => {
                totals.entry(transaction.date).or_insert((0.0, 0.0)).1 += transaction.amount;
            }
            TransactionType::Investment | TransactionType::Saving => {}
        }
    }

    totals
        .into_iter()
        .map(|(date, (income, expense))| DailyTotals {
            date,
            income,
            expense,
        })
        .collect()
}
