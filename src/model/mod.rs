//! Types that represent the core data model, such as `IncomeRecord` and `Ledger`.
mod amount;
mod record;
mod summary;

pub use amount::{Amount, AmountFormat};
pub use record::{
    parse_date, IncomeRecord, Ledger, RawRecord, AMOUNT_HEADER, CATEGORY_HEADER, DATE_FORMAT,
    DATE_HEADER, DEFAULT_CATEGORY, DESCRIPTION_HEADER, LEDGER_HEADER,
};
pub use summary::{DailySummary, MonthlySummary, WeekKey, WeeklySummary};
