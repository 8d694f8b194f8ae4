//! The `renda list` command.

use crate::args::ListArgs;
use crate::commands::Out;
use crate::config::Config;
use crate::error::Result;
use crate::model::IncomeRecord;
use crate::service::{LedgerService, Session};

/// Lists the records in the session user's ledger, optionally restricted to one month.
pub async fn list(
    config: Config,
    session: &Session,
    args: &ListArgs,
) -> Result<Out<Vec<IncomeRecord>>> {
    let service = LedgerService::new(&config);
    let ledger = service.ledger(session).await?;
    let view = match args.month() {
        Some(month) => ledger.filter(|r| r.month_key() == month),
        None => ledger,
    };

    if view.is_empty() {
        return Ok(Out::new("No income recorded yet.", Vec::new()));
    }

    let mut lines = vec![format!(
        "{} record(s){}:",
        view.len(),
        args.month().map(|m| format!(" in {m}")).unwrap_or_default()
    )];
    for record in view.iter() {
        let description = if record.description.is_empty() {
            String::new()
        } else {
            format!("  {}", record.description)
        };
        lines.push(format!(
            "{}  {}  {}{description}",
            record.date, record.amount, record.category
        ));
    }
    lines.push(format!("Total: {}", view.total()));

    Ok(Out::new(lines.join("\n"), view.records().to_vec()))
}
