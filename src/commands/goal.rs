//! The `renda goal` command.

use crate::args::{GoalArgs, GoalSubcommand};
use crate::commands::Out;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::goal::{progress, GoalTracker, Progress};
use crate::model::parse_date;
use crate::service::{LedgerService, Session};
use crate::users::UserStore;
use chrono::Local;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Shows or sets the daily goal, or reports progress against it.
pub async fn goal(config: Config, session: &Session, args: &GoalArgs) -> Result<Out<Progress>> {
    let user = session.user()?;
    let tracker = GoalTracker::new(UserStore::new(config.home().users_file()));

    let out = match args.action() {
        GoalSubcommand::Set { value } => {
            let value = Decimal::from_str(value)
                .map_err(|e| Error::Validation(format!("'{value}' is not a valid goal: {e}")))?;
            tracker.set_goal(user, value).await?;
            if value.is_zero() {
                Out::new_message(format!("Cleared the daily goal for '{user}'"))
            } else {
                Out::new_message(format!("Set the daily goal for '{user}' to {value}"))
            }
        }
        GoalSubcommand::Show => {
            let value = tracker.goal(user).await?;
            if value.is_zero() {
                Out::new_message(format!("'{user}' has no daily goal set"))
            } else {
                Out::new_message(format!("The daily goal for '{user}' is {value}"))
            }
        }
        GoalSubcommand::Progress { date } => {
            let as_of = match date {
                Some(s) => parse_date(s)
                    .ok_or_else(|| Error::Validation(format!("'{s}' is not a recognizable date")))?,
                None => Local::now().date_naive(),
            };
            let value = tracker.goal(user).await?;
            if value.is_zero() {
                return Ok(Out::new_message(format!(
                    "'{user}' has no daily goal set, so there is no progress to report"
                )));
            }
            let ledger = LedgerService::new(&config).ledger(session).await?;
            let p = progress(&ledger, value, as_of);
            Out::new(
                format!(
                    "{as_of}: earned {} of {value} ({:.1}%, {}) with {} remaining",
                    p.earned, p.percent, p.band, p.remaining
                ),
                p,
            )
        }
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::GoalBand;
    use crate::model::{Amount, IncomeRecord};
    use crate::test::TestEnv;
    use clap::Parser;

    fn goal_args(argv: &[&str]) -> GoalArgs {
        #[derive(Parser)]
        struct Wrapper {
            #[clap(flatten)]
            inner: GoalArgs,
        }
        let mut full = vec!["test", "--username", "maria", "--secret", TestEnv::SECRET];
        full.extend_from_slice(argv);
        Wrapper::parse_from(full).inner
    }

    #[tokio::test]
    async fn test_set_show_progress() {
        let env = TestEnv::new().await;
        let session = env.login("maria").await;
        env.service()
            .add(
                &session,
                IncomeRecord::new(
                    parse_date("2024-01-05").unwrap(),
                    Amount::from_str("75.00").unwrap(),
                    None,
                    None,
                ),
            )
            .await
            .unwrap();

        goal(env.config(), &session, &goal_args(&["set", "100.00"]))
            .await
            .unwrap();

        let out = goal(env.config(), &session, &goal_args(&["show"]))
            .await
            .unwrap();
        assert!(out.message().contains("100.00"));

        let out = goal(
            env.config(),
            &session,
            &goal_args(&["progress", "--date", "2024-01-05"]),
        )
        .await
        .unwrap();
        let p = out.structure().unwrap();
        assert_eq!(p.band, GoalBand::Near);
        assert!(!p.met);
        assert!((p.percent - 75.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_set_rejects_negative() {
        let env = TestEnv::new().await;
        let session = env.login("maria").await;
        let err = goal(env.config(), &session, &goal_args(&["set", "-5.00"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidGoal(_)));
    }

    #[tokio::test]
    async fn test_progress_without_goal() {
        let env = TestEnv::new().await;
        let session = env.login("maria").await;
        let out = goal(env.config(), &session, &goal_args(&["progress"]))
            .await
            .unwrap();
        assert!(out.message().contains("no daily goal"));
        assert!(out.structure().is_none());
    }
}
