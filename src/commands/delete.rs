//! The `renda delete` command.

use crate::args::DeleteArgs;
use crate::commands::Out;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{parse_date, IncomeRecord};
use crate::service::{LedgerService, Session};
use chrono::NaiveDate;
use tracing::debug;

/// Deletes the records matching the given filters. When several filters are supplied a record
/// must match all of them. `--all` clears the whole ledger explicitly.
pub async fn delete(config: Config, session: &Session, args: &DeleteArgs) -> Result<Out<usize>> {
    if !args.all() && args.month().is_none() && args.category().is_none() && args.date().is_none()
    {
        return Err(Error::Validation(
            "supply at least one of --month, --category, --date, or --all".to_string(),
        ));
    }
    let date = match args.date() {
        Some(s) => Some(
            parse_date(s)
                .ok_or_else(|| Error::Validation(format!("'{s}' is not a recognizable date")))?,
        ),
        None => None,
    };

    let service = LedgerService::new(&config);

    // Keep an independent copy before a destructive edit. Best-effort only.
    if let Some(path) = service.try_snapshot(session).await {
        debug!("Snapshot taken at {}", path.display());
    }

    let matches = |record: &IncomeRecord| {
        matches_filters(record, args.all(), args.month(), args.category(), date)
    };
    let deleted = service.delete(session, matches).await?;

    let message = format!(
        "Deleted {} record{}",
        deleted,
        if deleted == 1 { "" } else { "s" }
    );
    Ok(Out::new(message, deleted))
}

fn matches_filters(
    record: &IncomeRecord,
    all: bool,
    month: Option<&str>,
    category: Option<&str>,
    date: Option<NaiveDate>,
) -> bool {
    if all {
        return true;
    }
    if month.is_some_and(|m| record.month_key() != m) {
        return false;
    }
    if category.is_some_and(|c| record.category != c) {
        return false;
    }
    if date.is_some_and(|d| record.date != d) {
        return false;
    }
    true
}
