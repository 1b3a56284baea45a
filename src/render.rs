//! Plain-text rendering of the engine's reports.
//!
//! Amounts are printed with two decimal places, rounded half away from zero.
//! A [`Report::NoData`] renders as a single informational line.

use std::fmt::Write;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{CategorySummary, MonthSummary, RankedExpense, Report, Statistics};

pub const NO_DATA_MESSAGE: &str = "No transactions to analyze.";
pub const NO_EXPENSES_MESSAGE: &str = "No expenses recorded.";

/// Rounds an amount to the two places it is displayed with.
///
/// `{:.2}` on a [`Decimal`] cuts off extra digits instead of rounding them.
pub fn money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn render_report<T>(report: &Report<T>, body: impl FnOnce(&T) -> String) -> String {
    match report {
        Report::NoData => format!("{}\n", NO_DATA_MESSAGE),
        Report::Ready(value) => body(value),
    }
}

/// Renders income, expense, net and the leading transactions of each month.
pub fn render_months(report: &Report<Vec<MonthSummary>>) -> String {
    render_report(report, |months| {
        let mut out = String::from("Month-wise analysis\n");
        for month in months {
            let _ = writeln!(
                out,
                "\n{} ({} transactions)",
                month.month, month.transaction_count
            );
            let _ = writeln!(out, "  Income:  {:.2}", money(month.income));
            let _ = writeln!(out, "  Expense: {:.2}", money(month.expense));
            let _ = writeln!(out, "  Net:     {:.2}", money(month.net));
            let _ = writeln!(out, "  Top transactions:");
            for tx in &month.top_transactions {
                let sign = if tx.is_income() { '+' } else { '-' };
                let _ = writeln!(
                    out,
                    "    {} | {}{:.2} | {}",
                    tx.date, sign, money(tx.amount), tx.details
                );
            }
        }
        out
    })
}

/// Renders expense totals per category, largest first.
pub fn render_categories(report: &Report<Vec<CategorySummary>>) -> String {
    render_report(report, |categories| {
        let mut out = String::from("Expense category analysis\n");
        if categories.is_empty() {
            let _ = writeln!(out, "\n{}", NO_EXPENSES_MESSAGE);
        }
        for category in categories {
            let _ = writeln!(out, "\n{}", category.category);
            let _ = writeln!(out, "  Total:        {:.2}", money(category.total));
            let _ = writeln!(out, "  Transactions: {}", category.count);
            let _ = writeln!(out, "  Average:      {:.2}", money(category.average));
        }
        out
    })
}

/// Renders the ranked expenses under a `Top <limit>` heading.
pub fn render_top_expenses(report: &Report<Vec<RankedExpense>>, limit: i64) -> String {
    render_report(report, |expenses| {
        let mut out = format!("Top {} highest expenses\n", limit);
        if expenses.is_empty() {
            let _ = writeln!(out, "\n{}", NO_EXPENSES_MESSAGE);
        }
        for expense in expenses {
            let _ = writeln!(out, "\n{}. {:.2}", expense.rank, money(expense.amount));
            let _ = writeln!(out, "   Date:     {}", expense.date);
            let _ = writeln!(out, "   Category: {}", expense.category);
            let _ = writeln!(out, "   Details:  {}", expense.details);
        }
        out
    })
}

/// Renders the overall figures and the savings rate.
pub fn render_statistics(report: &Report<Statistics>) -> String {
    render_report(report, |stats| {
        let mut out = String::from("Financial statistics\n\n");
        let _ = writeln!(out, "Total income:  {:.2}", money(stats.total_income));
        let _ = writeln!(out, "Total expense: {:.2}", money(stats.total_expense));
        let _ = writeln!(out, "Net balance:   {:.2}", money(stats.net_balance));
        let _ = writeln!(out, "\nIncome transactions:  {}", stats.income_count);
        let _ = writeln!(out, "Expense transactions: {}", stats.expense_count);
        let _ = writeln!(out, "Total transactions:   {}", stats.transaction_count());
        if let Some(average) = stats.average_income {
            let _ = writeln!(out, "\nAverage income:  {:.2}", money(average));
        }
        if let Some(average) = stats.average_expense {
            let _ = writeln!(out, "Average expense: {:.2}", money(average));
        }
        let _ = writeln!(out, "\nSavings rate: {:.2}%", money(stats.savings_rate));
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine;
    use crate::types::{Transaction, TxKind};
    use std::str::FromStr;

    fn build(rows: &[(i64, TxKind, &str, &str, &str, &str)]) -> Vec<Transaction> {
        rows.iter()
            .map(|&(id, kind, date, amount, category, details)| Transaction {
                id,
                kind,
                date: date.to_string(),
                amount: Decimal::from_str(amount).unwrap(),
                category: category.to_string(),
                details: details.to_string(),
                timestamp: String::new(),
            })
            .collect()
    }

    fn sample() -> Vec<Transaction> {
        build(&[
            (1, TxKind::Deposit, "2024-01-05", "1000", "salary", "pay"),
            (2, TxKind::Withdrawal, "2024-01-10", "200", "food", "groceries"),
            (3, TxKind::Withdrawal, "2024-02-01", "50", "food", "lunch"),
        ])
    }

    #[test]
    fn no_data_renders_message() {
        let report: Report<Statistics> = Report::NoData;
        assert_eq!(render_statistics(&report), "No transactions to analyze.\n");
    }

    #[test]
    fn month_lines_are_signed() {
        let out = render_months(&engine::analyze_by_month(&sample()).unwrap());

        assert!(out.contains("2024-01 (2 transactions)"));
        assert!(out.contains("2024-01-05 | +1000.00 | pay"));
        assert!(out.contains("2024-02-01 | -50.00 | lunch"));
        assert!(out.contains("Net:     -50.00"));
    }

    #[test]
    fn statistics_show_two_decimals() {
        let out = render_statistics(&engine::statistics(&sample()).unwrap());

        assert!(out.contains("Net balance:   750.00"));
        assert!(out.contains("Average expense: 125.00"));
        assert!(out.contains("Savings rate: 75.00%"));
    }

    #[test]
    fn top_expenses_are_numbered() {
        let out = render_top_expenses(&engine::top_expenses(&sample(), 1).unwrap(), 1);

        assert!(out.starts_with("Top 1 highest expenses"));
        assert!(out.contains("1. 200.00"));
        assert!(!out.contains("2. "));
    }

    #[test]
    fn repeating_decimals_are_rounded() {
        let transactions = build(&[
            (1, TxKind::Deposit, "2024-01-01", "300", "salary", "pay"),
            (2, TxKind::Withdrawal, "2024-01-02", "60", "food", "a"),
            (3, TxKind::Withdrawal, "2024-01-03", "20", "food", "b"),
            (4, TxKind::Withdrawal, "2024-01-04", "20", "food", "c"),
        ]);

        // (300 - 100) / 300 * 100 = 66.666...
        let stats = render_statistics(&engine::statistics(&transactions).unwrap());
        assert!(stats.contains("Savings rate: 66.67%"));

        // 100 / 3 = 33.333... stays down, 100.01 / 3 = 33.3366... goes up
        let categories = render_categories(&engine::analyze_by_category(&transactions).unwrap());
        assert!(categories.contains("Average:      33.33"));

        let mut transactions = transactions;
        transactions[3].amount = Decimal::from_str("20.01").unwrap();
        let categories = render_categories(&engine::analyze_by_category(&transactions).unwrap());
        assert!(categories.contains("Average:      33.34"));
    }

    #[test]
    fn money_rounds_half_away_from_zero() {
        assert_eq!(money(Decimal::from(2) / Decimal::from(3)).to_string(), "0.67");
        assert_eq!(money(Decimal::from_str("0.125").unwrap()).to_string(), "0.13");
        assert_eq!(money(Decimal::from_str("-0.125").unwrap()).to_string(), "-0.13");
    }

    #[test]
    fn empty_rankings_say_so() {
        let transactions = build(&[(1, TxKind::Deposit, "2024-01-05", "1000", "salary", "pay")]);

        let top = render_top_expenses(&engine::top_expenses(&transactions, 5).unwrap(), 5);
        let categories = render_categories(&engine::analyze_by_category(&transactions).unwrap());

        assert!(top.contains(NO_EXPENSES_MESSAGE));
        assert!(categories.contains(NO_EXPENSES_MESSAGE));
    }
}
