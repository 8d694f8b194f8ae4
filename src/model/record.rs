//! The canonical ledger row and the raw tabular row it is parsed from.

use crate::model::Amount;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Column header for the record date.
pub const DATE_HEADER: &str = "Data";
/// Column header for the record amount.
pub const AMOUNT_HEADER: &str = "Valor";
/// Column header for the optional category.
pub const CATEGORY_HEADER: &str = "Categoria";
/// Column header for the optional free-text description.
pub const DESCRIPTION_HEADER: &str = "Descrição";

/// The full header row of a ledger file. Legacy files carry only `Data,Valor`; those remain
/// readable and gain the optional columns with default values on the next save.
pub const LEDGER_HEADER: [&str; 4] = [
    DATE_HEADER,
    AMOUNT_HEADER,
    CATEGORY_HEADER,
    DESCRIPTION_HEADER,
];

/// The category assigned to records that were stored without one.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// The canonical date format written to ledger files.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date formats accepted when reading. Files written by older versions carried datetime spill
/// (`2024-01-05 00:00:00`) and manual entries used `05/01/2024`.
const READ_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y"];

/// Parses a ledger date in any of the accepted formats.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    READ_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// A row exactly as it appears in a ledger file, before validation. All fields are raw text;
/// the optional columns are `None` when the file predates them.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Data")]
    pub date: String,
    #[serde(rename = "Valor")]
    pub amount: String,
    #[serde(rename = "Categoria", default)]
    pub category: Option<String>,
    #[serde(rename = "Descrição", default)]
    pub description: Option<String>,
}

impl RawRecord {
    pub fn new(
        date: impl Into<String>,
        amount: impl Into<String>,
        category: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            date: date.into(),
            amount: amount.into(),
            category,
            description,
        }
    }
}

/// A validated income record. Constructed only by the validator or by `IncomeRecord::new`,
/// which enforces the same shape a validated raw row has.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct IncomeRecord {
    pub date: NaiveDate,
    pub amount: Amount,
    pub category: String,
    pub description: String,
}

impl IncomeRecord {
    pub fn new(
        date: NaiveDate,
        amount: Amount,
        category: Option<String>,
        description: Option<String>,
    ) -> Self {
        let category = match category {
            Some(c) if !c.trim().is_empty() => c,
            _ => DEFAULT_CATEGORY.to_string(),
        };
        Self {
            date,
            amount,
            category,
            description: description.unwrap_or_default(),
        }
    }

    /// The "YYYY-MM" month bucket this record belongs to.
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    /// Converts back to the raw row shape for persistence. A validated record always
    /// round-trips through `validate` unchanged.
    pub fn to_raw(&self) -> RawRecord {
        RawRecord {
            date: self.date.format(DATE_FORMAT).to_string(),
            amount: self.amount.to_string(),
            category: Some(self.category.clone()),
            description: Some(self.description.clone()),
        }
    }
}

/// The full set of one user's income records, in insertion order.
///
/// A `Ledger` in memory may only be persisted through `LedgerStore`, which guarantees that no
/// invalid row reaches durable state.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    records: Vec<IncomeRecord>,
}

impl Ledger {
    pub fn new(records: Vec<IncomeRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[IncomeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: IncomeRecord) {
        self.records.push(record);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IncomeRecord> {
        self.records.iter()
    }

    /// The exact sum of every record amount.
    pub fn total(&self) -> Decimal {
        self.records.iter().map(|r| r.amount.value()).sum()
    }

    /// Splits the ledger by `predicate`: records matching it land in the first ledger,
    /// the rest in the second. Insertion order is preserved on both sides.
    pub fn partition<P>(&self, predicate: P) -> (Ledger, Ledger)
    where
        P: Fn(&IncomeRecord) -> bool,
    {
        let (matched, rest) = self.records.iter().cloned().partition(|r| predicate(r));
        (Ledger::new(matched), Ledger::new(rest))
    }

    /// The records matching `predicate`, in insertion order.
    pub fn filter<P>(&self, predicate: P) -> Ledger
    where
        P: Fn(&IncomeRecord) -> bool,
    {
        Ledger::new(self.records.iter().filter(|r| predicate(r)).cloned().collect())
    }
}

impl IntoIterator for Ledger {
    type Item = IncomeRecord;
    type IntoIter = std::vec::IntoIter<IncomeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl FromIterator<IncomeRecord> for Ledger {
    fn from_iter<T: IntoIterator<Item = IncomeRecord>>(iter: T) -> Self {
        Ledger::new(iter.into_iter().collect())
    }
}
