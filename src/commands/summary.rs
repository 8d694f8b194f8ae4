//! The `renda summary` command.

use crate::aggregate;
use crate::args::{Period, SummaryArgs};
use crate::commands::Out;
use crate::config::Config;
use crate::error::Result;
use crate::goal::GoalTracker;
use crate::model::{DailySummary, MonthlySummary, WeeklySummary};
use crate::service::{LedgerService, Session};
use crate::users::UserStore;
use rust_decimal::Decimal;
use serde::Serialize;

/// The rows of one summary report, in the granularity that was requested.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SummaryRows {
    Daily(Vec<DailySummary>),
    Weekly(Vec<WeeklySummary>),
    Monthly(Vec<MonthlySummary>),
}

/// Produces the requested rollup of the session user's ledger. Daily summaries honor the
/// `--month` filter and are annotated with goal information when a goal is set.
pub async fn summary(
    config: Config,
    session: &Session,
    args: &SummaryArgs,
) -> Result<Out<SummaryRows>> {
    let service = LedgerService::new(&config);
    let ledger = service.ledger(session).await?;
    if ledger.is_empty() {
        return Ok(Out::new_message("No income recorded yet."));
    }

    let out = match args.period() {
        Period::Daily => {
            let goal = GoalTracker::new(UserStore::new(config.home().users_file()))
                .goal(session.user()?)
                .await?;
            let mut rows = aggregate::daily(&ledger);
            if let Some(month) = args.month() {
                rows = aggregate::filter_by_month(&rows, month);
            }
            let rows = aggregate::mark_goal(rows, goal);

            let mut lines = Vec::with_capacity(rows.len() + 2);
            for row in &rows {
                let marker = match row.goal_met {
                    Some(true) => "  goal met",
                    Some(false) => "  below goal",
                    None => "",
                };
                lines.push(format!("{}  {}{marker}", row.date, row.total));
            }
            push_total(&mut lines, rows.iter().map(|r| r.total));
            if goal > Decimal::ZERO {
                lines.push(format!(
                    "Goal of {goal} met on {:.1}% of days",
                    aggregate::success_rate(&rows, goal)
                ));
            }
            Out::new(lines.join("\n"), SummaryRows::Daily(rows))
        }
        Period::Weekly => {
            let rows = aggregate::weekly(&ledger);
            let mut lines: Vec<String> = rows
                .iter()
                .map(|row| format!("{}  {}", row.week, row.total))
                .collect();
            push_total(&mut lines, rows.iter().map(|r| r.total));
            Out::new(lines.join("\n"), SummaryRows::Weekly(rows))
        }
        Period::Monthly => {
            let rows = aggregate::monthly(&ledger);
            let mut lines: Vec<String> = rows
                .iter()
                .map(|row| format!("{}  {}", row.month, row.total))
                .collect();
            push_total(&mut lines, rows.iter().map(|r| r.total));
            Out::new(lines.join("\n"), SummaryRows::Monthly(rows))
        }
    };
    Ok(out)
}

fn push_total(lines: &mut Vec<String>, totals: impl Iterator<Item = Decimal>) {
    let total: Decimal = totals.sum();
    lines.push(format!("Total: {total}"));
}
