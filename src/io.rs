//! Loading exported transaction logs.
//!
//! The export holds one transaction per line as seven pipe-separated fields:
//!
//! ```text
//! id|kind|date|amount|category|details|timestamp
//! ```
//!
//! There is no header row and no quoting. Lines with fewer than seven fields
//! are skipped, fields past the seventh are ignored. A line whose fields do not
//! parse is reported on its own and loading carries on with the next line.

use anyhow::{Context, Result};
use csv::StringRecord;
use log::{info, warn};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Read, Write};

use crate::types::Transaction;

/// Number of fields in one exported record.
pub const RECORD_FIELDS: usize = 7;

/// File name the web export uses for a given user.
pub fn user_file_name(user: &str) -> String {
    format!("transactions_{}.txt", user)
}

/// An iterator over transactions from an exported log.
///
/// Yields one item per line that carries at least [`RECORD_FIELDS`] fields;
/// shorter lines are skipped with a warning.
pub struct TransactionReader<R> {
    reader: csv::Reader<R>,
    source: String,
    record: StringRecord,
}

impl<R: Read> Iterator for TransactionReader<R> {
    type Item = Result<Transaction>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.read_record(&mut self.record) {
                Ok(false) => return None,
                Ok(true) => {}
                Err(e) => {
                    let context = format!("Failed to read record from: {}", self.source);
                    return Some(Err(anyhow::Error::new(e).context(context)));
                }
            }

            let line = self.record.position().map_or(0, |p| p.line());
            if self.record.len() < RECORD_FIELDS {
                warn!(
                    "Skipping line {} from {}: expected {} fields, found {}",
                    line,
                    self.source,
                    RECORD_FIELDS,
                    self.record.len()
                );
                continue;
            }

            let fields: StringRecord = self.record.iter().take(RECORD_FIELDS).collect();
            return Some(fields.deserialize::<Transaction>(None).with_context(|| {
                format!("Failed to parse record at line {} from: {}", line, self.source)
            }));
        }
    }
}

/// Wraps any reader of an exported log in a [`TransactionReader`].
///
/// `source` names the input in error messages.
pub fn read_transactions<R: Read>(reader: R, source: &str) -> TransactionReader<R> {
    let reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(reader);

    TransactionReader {
        reader,
        source: source.to_string(),
        record: StringRecord::new(),
    }
}

/// Opens an exported log and returns an iterator over its transactions.
///
/// # Errors
///
/// Returns an error if the file cannot be opened. Errors for individual lines
/// are returned while iterating.
pub fn read_transactions_from_file(path: &str) -> Result<TransactionReader<File>> {
    let file = File::open(path).with_context(|| {
        format!(
            "Failed to open file: {} (export the transactions from the web UI first)",
            path
        )
    })?;
    Ok(read_transactions(file, path))
}

/// Transactions that loaded cleanly, in source order, plus one error per
/// line that did not.
#[derive(Debug, Default)]
pub struct LoadedTransactions {
    pub transactions: Vec<Transaction>,
    pub errors: Vec<anyhow::Error>,
}

impl LoadedTransactions {
    /// Drains a reader, keeping good records and collecting per-line errors.
    pub fn collect_from<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Result<Transaction>>,
    {
        let mut loaded = LoadedTransactions::default();
        for record in records {
            match record {
                Ok(tx) => loaded.transactions.push(tx),
                Err(e) => {
                    warn!("{:#}", e);
                    loaded.errors.push(e);
                }
            }
        }
        loaded
    }
}

/// Loads a whole exported log into memory.
///
/// A fresh load replaces any earlier one; nothing is merged.
///
/// # Errors
///
/// Returns an error only if the file cannot be opened.
pub fn load_transactions(path: &str) -> Result<LoadedTransactions> {
    let loaded = LoadedTransactions::collect_from(read_transactions_from_file(path)?);
    info!(
        "Loaded {} transactions from {} ({} lines rejected)",
        loaded.transactions.len(),
        path,
        loaded.errors.len()
    );
    Ok(loaded)
}

/// Writes report rows as CSV with a header line.
///
/// # Errors
///
/// This function will return an error if:
/// - Serialization of any row fails
/// - Flushing the output buffer fails
pub fn write_rows_as_csv<W, T>(writer: W, rows: &[T]) -> Result<()>
where
    W: Write,
    T: Serialize,
{
    let mut writer = csv::Writer::from_writer(writer);

    for row in rows {
        writer.serialize(row).context("Failed to write report row")?;
    }

    writer.flush().context("Failed to flush report output")?;

    Ok(())
}

/// Writes report rows to stdout as CSV.
///
/// # Errors
///
/// Returns an error if serialization or writing to stdout fails.
pub fn write_rows_as_csv_to_stdout<T: Serialize>(rows: &[T]) -> Result<()> {
    write_rows_as_csv(io::stdout(), rows)
}
