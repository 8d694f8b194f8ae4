//! Normalizes raw tabular rows into the canonical ledger shape.
//!
//! Every row that reaches durable state passes through here. A row is dropped when its date or
//! amount cannot be parsed, or when the amount is negative (income is non-negative by policy).
//! Missing optional columns never drop a row; they are synthesized with defaults, which is also
//! how files written before those columns existed are migrated forward.

use crate::model::{parse_date, Amount, IncomeRecord, Ledger, RawRecord};
use std::str::FromStr;
use tracing::warn;

/// The result of validating a batch of raw rows.
#[derive(Debug, Clone, Default)]
pub struct Validated {
    pub ledger: Ledger,
    /// Number of input rows that were dropped. Non-fatal; callers decide whether to surface it.
    pub dropped: usize,
}

/// Validates raw rows in order, dropping the invalid ones.
///
/// Validation is idempotent: running the output of a `validate` pass through
/// `validate` again drops nothing and changes nothing.
pub fn validate<I>(rows: I) -> Validated
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut ledger = Ledger::default();
    let mut dropped = 0;
    for (ix, raw) in rows.into_iter().enumerate() {
        match validate_row(&raw) {
            Ok(record) => ledger.push(record),
            Err(reason) => {
                // Row numbers are 1-based and skip the header, matching what a user sees in the file.
                warn!("Dropping row {}: {reason}", ix + 2);
                dropped += 1;
            }
        }
    }
    Validated { ledger, dropped }
}

/// Validates a single raw row, returning the reason when it must be dropped.
pub fn validate_row(raw: &RawRecord) -> Result<IncomeRecord, String> {
    let date = parse_date(&raw.date)
        .ok_or_else(|| format!("'{}' is not a recognizable date", raw.date))?;
    let amount = Amount::from_str(&raw.amount).map_err(|e| e.to_string())?;
    if amount.is_negative() {
        return Err(format!("income amounts cannot be negative, got {amount}"));
    }
    Ok(IncomeRecord::new(
        date,
        amount,
        raw.category.clone(),
        raw.description.clone(),
    ))
}
