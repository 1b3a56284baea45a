//! Transaction analysis engine.
//!
//! This module turns a loaded record set into the four reports the analyzer
//! offers: month-wise totals, expense totals per category, the largest
//! expenses, and overall statistics. Every report is a pure function of the
//! slice it is given; the engine never mutates its input and keeps no state
//! between calls.
//!
//! An empty record set yields [`Report::NoData`]. A record that breaks an
//! invariant (no `YYYY-MM` date prefix, negative amount) fails the whole call
//! with [`EngineError::InvalidRecord`].

use std::collections::BTreeMap;

use log::debug;
use rust_decimal::Decimal;

use crate::errors::EngineError;
use crate::types::Amount;
use crate::types::CategorySummary;
use crate::types::MonthSummary;
use crate::types::RankedExpense;
use crate::types::Report;
use crate::types::Statistics;
use crate::types::Transaction;

/// Number of expenses shown when the caller does not ask for a specific count.
pub const DEFAULT_TOP_LIMIT: i64 = 5;

/// Number of leading transactions kept per month.
pub const MONTH_TOP_TRANSACTIONS: usize = 5;

pub type ReportResult<T> = Result<Report<T>, EngineError>;

/// Checks every record against the invariants the reports rely on.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRecord`] for the first transaction whose date
/// has no `YYYY-MM` prefix or whose amount is negative.
pub fn validate(transactions: &[Transaction]) -> Result<(), EngineError> {
    for tx in transactions {
        month_key(tx)?;
        if tx.amount < Decimal::ZERO {
            return Err(EngineError::InvalidRecord {
                id: tx.id,
                reason: format!("negative amount {}", tx.amount),
            });
        }
    }
    Ok(())
}

fn month_key(tx: &Transaction) -> Result<&str, EngineError> {
    tx.month_key().ok_or_else(|| EngineError::InvalidRecord {
        id: tx.id,
        reason: format!("date `{}` has no YYYY-MM prefix", tx.date),
    })
}

fn add(total: Amount, amount: Amount, what: &'static str) -> Result<Amount, EngineError> {
    total
        .checked_add(amount)
        .ok_or(EngineError::AmountOverflow(what))
}

/// Groups transactions by the month of their date.
///
/// Months come out in ascending `YYYY-MM` order. Within a month the source
/// order is kept, and the first [`MONTH_TOP_TRANSACTIONS`] transactions of the
/// month are reported as its top transactions.
///
/// # Errors
///
/// Returns an error if a record is invalid or a monthly total overflows.
pub fn analyze_by_month(transactions: &[Transaction]) -> ReportResult<Vec<MonthSummary>> {
    if transactions.is_empty() {
        return Ok(Report::NoData);
    }
    validate(transactions)?;

    let mut months: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
    for tx in transactions {
        months.entry(month_key(tx)?).or_default().push(tx);
    }

    let mut summaries = Vec::with_capacity(months.len());
    for (month, group) in months {
        let mut income = Decimal::ZERO;
        let mut expense = Decimal::ZERO;
        for tx in &group {
            if tx.is_income() {
                income = add(income, tx.amount, "monthly income")?;
            } else {
                expense = add(expense, tx.amount, "monthly expense")?;
            }
        }

        summaries.push(MonthSummary {
            month: month.to_string(),
            transaction_count: group.len(),
            income,
            expense,
            net: income - expense,
            top_transactions: group
                .iter()
                .take(MONTH_TOP_TRANSACTIONS)
                .map(|tx| (*tx).clone())
                .collect(),
        });
    }

    debug!("Month report covers {} months", summaries.len());
    Ok(Report::Ready(summaries))
}

/// Totals expenses per category, largest total first.
///
/// Income never takes part. Categories are matched exactly, so `Food` and
/// `food` are separate groups. Equal totals are ordered by category name.
///
/// # Errors
///
/// Returns an error if a record is invalid or a category total overflows.
pub fn analyze_by_category(transactions: &[Transaction]) -> ReportResult<Vec<CategorySummary>> {
    if transactions.is_empty() {
        return Ok(Report::NoData);
    }
    validate(transactions)?;

    let mut categories: BTreeMap<&str, (Amount, usize)> = BTreeMap::new();
    for tx in transactions.iter().filter(|tx| tx.is_expense()) {
        let (total, count) = categories
            .entry(tx.category.as_str())
            .or_insert((Decimal::ZERO, 0));
        *total = add(*total, tx.amount, "category total")?;
        *count += 1;
    }

    let mut summaries: Vec<CategorySummary> = categories
        .into_iter()
        .map(|(category, (total, count))| CategorySummary {
            category: category.to_string(),
            total,
            count,
            average: total / Decimal::from(count),
        })
        .collect();
    // Stable sort keeps the name order from the map for equal totals
    summaries.sort_by(|a, b| b.total.cmp(&a.total));

    debug!("Category report covers {} categories", summaries.len());
    Ok(Report::Ready(summaries))
}

/// Ranks expenses by amount and returns at most `limit` of them.
///
/// A `limit` of zero or below yields an empty ranking; a `limit` above the
/// number of expenses yields all of them. Equal amounts keep source order.
///
/// # Errors
///
/// Returns an error if a record is invalid.
pub fn top_expenses(
    transactions: &[Transaction],
    limit: i64,
) -> ReportResult<Vec<RankedExpense>> {
    if transactions.is_empty() {
        return Ok(Report::NoData);
    }
    validate(transactions)?;

    let mut expenses: Vec<&Transaction> =
        transactions.iter().filter(|tx| tx.is_expense()).collect();
    expenses.sort_by(|a, b| b.amount.cmp(&a.amount));

    let limit = usize::try_from(limit).unwrap_or(0);
    let ranked: Vec<RankedExpense> = expenses
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, tx)| RankedExpense {
            rank: i + 1,
            amount: tx.amount,
            date: tx.date.clone(),
            category: tx.category.clone(),
            details: tx.details.clone(),
        })
        .collect();

    debug!("Ranked {} expenses (limit {})", ranked.len(), limit);
    Ok(Report::Ready(ranked))
}

/// Computes overall income and expense figures in a single pass.
///
/// # Errors
///
/// Returns an error if a record is invalid or a total overflows. A savings rate
/// too far below zero to fit in a decimal saturates at [`Decimal::MIN`].
pub fn statistics(transactions: &[Transaction]) -> ReportResult<Statistics> {
    if transactions.is_empty() {
        return Ok(Report::NoData);
    }
    validate(transactions)?;

    let mut total_income = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;
    let mut income_count = 0usize;
    let mut expense_count = 0usize;

    for tx in transactions {
        if tx.is_income() {
            total_income = add(total_income, tx.amount, "total income")?;
            income_count += 1;
        } else {
            total_expense = add(total_expense, tx.amount, "total expense")?;
            expense_count += 1;
        }
    }

    let net_balance = total_income - total_expense;
    let average_income = (income_count > 0).then(|| total_income / Decimal::from(income_count));
    let average_expense =
        (expense_count > 0).then(|| total_expense / Decimal::from(expense_count));

    let savings_rate = if total_income > Decimal::ZERO {
        net_balance
            .checked_div(total_income)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            // net never exceeds income, so only a hugely negative rate overflows
            .unwrap_or(Decimal::MIN)
    } else {
        Decimal::ZERO
    };

    Ok(Report::Ready(Statistics {
        total_income,
        total_expense,
        income_count,
        expense_count,
        net_balance,
        average_income,
        average_expense,
        savings_rate,
    }))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::types::TxKind;
    use proptest::prelude::*;

    const CATEGORIES: [&str; 4] = ["food", "rent", "travel", "Food"];

    /// Generates a record set with:
    /// - All four kinds, picked uniformly
    /// - Dates spread over 2023 and 2024
    /// - Amounts from 0.00 to 1000.00 in cents
    /// - Four categories, two of them differing only by case
    fn transaction_strategy() -> impl Strategy<Value = Vec<Transaction>> {
        prop::collection::vec(
            (
                0u8..=3u8,         // kind selector
                2023u16..=2024u16, // year
                1u8..=12u8,        // month
                1u8..=28u8,        // day
                0u64..=100000u64,  // amount in cents
                0usize..4usize,    // category index
            ),
            0..=60,
        )
        .prop_map(|params| {
            params
                .into_iter()
                .enumerate()
                .map(|(i, (kind, year, month, day, cents, category))| Transaction {
                    id: i as i64 + 1,
                    kind: match kind {
                        0 => TxKind::Deposit,
                        1 => TxKind::Withdrawal,
                        2 => TxKind::Transfer,
                        _ => TxKind::Received,
                    },
                    date: format!("{:04}-{:02}-{:02}", year, month, day),
                    amount: Decimal::new(cents as i64, 2),
                    category: CATEGORIES[category].to_string(),
                    details: String::new(),
                    timestamp: String::new(),
                })
                .collect()
        })
    }

    /// Property test: the month and category reports are refinements of the
    /// overall statistics; their totals add back up to the overall totals.
    #[test]
    fn reports_partition_overall_totals() {
        proptest!(|(transactions in transaction_strategy())| {
            let stats = match statistics(&transactions).unwrap() {
                Report::NoData => {
                    prop_assert!(transactions.is_empty());
                    prop_assert!(analyze_by_month(&transactions).unwrap().is_no_data());
                    return Ok(());
                }
                Report::Ready(stats) => stats,
            };

            prop_assert_eq!(stats.transaction_count(), transactions.len());

            let months = analyze_by_month(&transactions).unwrap().ready().unwrap();
            let month_income: Decimal = months.iter().map(|m| m.income).sum();
            let month_expense: Decimal = months.iter().map(|m| m.expense).sum();
            let month_count: usize = months.iter().map(|m| m.transaction_count).sum();
            prop_assert_eq!(month_income, stats.total_income);
            prop_assert_eq!(month_expense, stats.total_expense);
            prop_assert_eq!(month_count, transactions.len());
            for month in &months {
                prop_assert!(month.top_transactions.len() <= MONTH_TOP_TRANSACTIONS);
                prop_assert_eq!(month.net, month.income - month.expense);
            }

            let categories = analyze_by_category(&transactions).unwrap().ready().unwrap();
            let category_total: Decimal = categories.iter().map(|c| c.total).sum();
            let category_count: usize = categories.iter().map(|c| c.count).sum();
            prop_assert_eq!(category_total, stats.total_expense);
            prop_assert_eq!(category_count, stats.expense_count);
            for pair in categories.windows(2) {
                prop_assert!(pair[0].total >= pair[1].total);
            }
        });
    }

    /// Property test: the ranking is ordered by amount and holds exactly
    /// `min(limit, expenses)` entries.
    #[test]
    fn top_expenses_is_bounded_and_sorted() {
        proptest!(|(transactions in transaction_strategy(), limit in -3i64..=80i64)| {
            let report = top_expenses(&transactions, limit).unwrap();
            if transactions.is_empty() {
                prop_assert!(report.is_no_data());
                return Ok(());
            }

            let ranked = report.ready().unwrap();
            let expenses = transactions.iter().filter(|tx| tx.is_expense()).count();
            let expected = usize::try_from(limit).unwrap_or(0).min(expenses);
            prop_assert_eq!(ranked.len(), expected);
            for (i, entry) in ranked.iter().enumerate() {
                prop_assert_eq!(entry.rank, i + 1);
            }
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].amount >= pair[1].amount);
            }
        });
    }

    /// Property test: running a report twice over the same input gives the
    /// same result.
    #[test]
    fn reports_are_idempotent() {
        proptest!(|(transactions in transaction_strategy())| {
            prop_assert_eq!(analyze_by_month(&transactions), analyze_by_month(&transactions));
            prop_assert_eq!(analyze_by_category(&transactions), analyze_by_category(&transactions));
            prop_assert_eq!(top_expenses(&transactions, 5), top_expenses(&transactions, 5));
            prop_assert_eq!(statistics(&transactions), statistics(&transactions));
        });
    }
}
