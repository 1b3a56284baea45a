//! Core data types for transaction analysis.
//!
//! This module defines the record model the analyzer works on and the report
//! values it hands back to callers.
//!
//! # Type Aliases
//!
//! - [`TxId`]: Type alias for transaction identifiers (i64)
//! - [`Amount`]: Type alias for monetary amounts (Decimal)
//!
//! # Core Types
//!
//! - [`TxKind`]: The four kinds of money movement (deposit, withdrawal, transfer, received)
//! - [`Transaction`]: One exported record with kind, date, amount, category, details and timestamp
//!
//! # Report Types
//!
//! - [`Report`]: Either a populated report or [`Report::NoData`] for an empty record set
//! - [`MonthSummary`]: Totals and leading transactions for one `YYYY-MM` month
//! - [`CategorySummary`]: Expense totals for one category label
//! - [`RankedExpense`]: One entry in the ranked list of largest expenses
//! - [`Statistics`]: Overall income/expense figures and the savings rate
//!
//! # Examples
//!
//! Classifying a transaction:
//! ```
//! use khazana_analyzer::types::{Transaction, TxKind};
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//!
//! let tx = Transaction {
//!     id: 1,
//!     kind: TxKind::Received,
//!     date: "2024-03-14".to_string(),
//!     amount: Decimal::from_str("250.00").unwrap(),
//!     category: "salary".to_string(),
//!     details: "March payout".to_string(),
//!     timestamp: "2024-03-14T09:00:00Z".to_string(),
//! };
//!
//! assert!(tx.is_income());
//! assert_eq!(tx.month_key(), Some("2024-03"));
//! ```

use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub type TxId = i64;
pub type Amount = Decimal;

/// Length of the `YYYY-MM` prefix of a transaction date.
pub const MONTH_KEY_LEN: usize = 7;

/// The kind of a money movement.
///
/// Only two kinds count as income: money deposited into the account and money
/// received from someone else. Withdrawals and transfers are both expenses;
/// a transfer is never treated as neutral.
#[derive(Debug, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Deposit,
    Withdrawal,
    Transfer,
    Received,
}

impl TxKind {
    pub fn is_income(self) -> bool {
        matches!(self, TxKind::Deposit | TxKind::Received)
    }

    pub fn is_expense(self) -> bool {
        !self.is_income()
    }
}

/// A single exported transaction.
///
/// # Fields
///
/// - `id`: Numeric part of the export identifier, unique within one loaded file
/// - `kind`: Deposit, withdrawal, transfer or received
/// - `date`: Calendar date as `YYYY-MM-DD`; the first seven characters are the month key
/// - `amount`: Non-negative amount; the direction of the money comes from `kind`
/// - `category`: Free-text label, used to group expenses
/// - `details`: Free-text description, display only
/// - `timestamp`: Opaque export timestamp, carried through untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: TxId,
    pub kind: TxKind,
    pub date: String,
    pub amount: Amount,
    pub category: String,
    pub details: String,
    pub timestamp: String,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind.is_income()
    }

    pub fn is_expense(&self) -> bool {
        self.kind.is_expense()
    }

    /// Returns the `YYYY-MM` prefix of the date, or `None` if the date is too
    /// short to carry one.
    pub fn month_key(&self) -> Option<&str> {
        self.date.get(..MONTH_KEY_LEN)
    }
}

/// Custom deserializer for transaction id.
///
/// The web export builds ids from a millisecond clock followed by a random
/// base-36 suffix (`1718000000000x7k2p9qab`). Only the leading signed integer
/// is kept, leading whitespace aside; a field that does not start with
/// digits is an error.
fn deserialize_id<'de, D>(deserializer: D) -> Result<TxId, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = TxId;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an identifier starting with an integer")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let trimmed = value.trim_start();
            let sign_len = usize::from(trimmed.starts_with(['+', '-']));
            let digits_len = trimmed[sign_len..]
                .bytes()
                .take_while(u8::is_ascii_digit)
                .count();
            if digits_len == 0 {
                return Err(de::Error::custom(format!("invalid id `{}`", value)));
            }
            trimmed[..sign_len + digits_len]
                .parse::<TxId>()
                .map_err(|e| de::Error::custom(format!("invalid id `{}`: {}", value, e)))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            TxId::try_from(value).map_err(|e| de::Error::custom(format!("invalid id: {}", e)))
        }
    }

    deserializer.deserialize_str(IdVisitor)
}

/// Custom deserializer for transaction amount.
///
/// Trims surrounding whitespace and parses the text as an exact decimal.
/// An empty field is an error: every exported record carries an amount.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = Decimal;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a decimal number")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(de::Error::custom("missing amount"));
            }
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .map_err(|e| de::Error::custom(format!("invalid decimal: {}", e)))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Decimal::try_from(value)
                .map_err(|e| de::Error::custom(format!("invalid decimal from float: {}", e)))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Decimal::from(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Decimal::from(value))
        }
    }

    deserializer.deserialize_str(AmountVisitor)
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct TransactionHelper {
            #[serde(deserialize_with = "deserialize_id")]
            id: TxId,
            kind: TxKind,
            date: String,
            #[serde(deserialize_with = "deserialize_amount")]
            amount: Amount,
            category: String,
            details: String,
            timestamp: String,
        }

        let helper = TransactionHelper::deserialize(deserializer)?;
        Ok(Transaction {
            id: helper.id,
            kind: helper.kind,
            date: helper.date,
            amount: helper.amount,
            category: helper.category,
            details: helper.details,
            timestamp: helper.timestamp,
        })
    }
}

/// Outcome of a report over a record set.
///
/// An empty record set is not an error, but it is not a zero-valued report
/// either: it is reported as [`Report::NoData`] so callers can tell the user
/// there was nothing to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report<T> {
    NoData,
    Ready(T),
}

impl<T> Report<T> {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Report::NoData)
    }

    /// Returns the report body, or `None` for [`Report::NoData`].
    pub fn ready(self) -> Option<T> {
        match self {
            Report::NoData => None,
            Report::Ready(value) => Some(value),
        }
    }
}

/// Totals for one calendar month.
///
/// `top_transactions` holds the first (up to five) transactions of the month
/// in the order they appear in the source, not the largest ones. It is left
/// out when the summary is written as CSV.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct MonthSummary {
    pub month: String,
    pub transaction_count: usize,
    pub income: Amount,
    pub expense: Amount,
    pub net: Amount,
    #[serde(skip)]
    pub top_transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: String,
    pub total: Amount,
    pub count: usize,
    pub average: Amount,
}

/// One expense in the ranked list, `rank` starting at 1.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct RankedExpense {
    pub rank: usize,
    pub amount: Amount,
    pub date: String,
    pub category: String,
    pub details: String,
}

/// Overall figures for a record set.
///
/// The averages are `None` when there is nothing to average. The savings rate
/// is a percentage and is zero when there is no income.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Statistics {
    pub total_income: Amount,
    pub total_expense: Amount,
    pub income_count: usize,
    pub expense_count: usize,
    pub net_balance: Amount,
    pub average_income: Option<Amount>,
    pub average_expense: Option<Amount>,
    pub savings_rate: Amount,
}

impl Statistics {
    pub fn transaction_count(&self) -> usize {
        self.income_count + self.expense_count
    }
}
