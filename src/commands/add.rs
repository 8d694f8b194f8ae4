//! The `renda add` command.

use crate::args::AddArgs;
use crate::commands::Out;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{parse_date, Amount, IncomeRecord};
use crate::service::{LedgerService, Session};
use chrono::Local;
use std::str::FromStr;

/// Adds one income record to the session user's ledger.
pub async fn add(config: Config, session: &Session, args: &AddArgs) -> Result<Out<IncomeRecord>> {
    let date = match args.date() {
        Some(s) => parse_date(s)
            .ok_or_else(|| Error::Validation(format!("'{s}' is not a recognizable date")))?,
        None => Local::now().date_naive(),
    };
    let amount =
        Amount::from_str(args.amount()).map_err(|e| Error::Validation(e.to_string()))?;
    let record = IncomeRecord::new(
        date,
        amount,
        args.category().map(str::to_string),
        args.description().map(str::to_string),
    );

    let service = LedgerService::new(&config);
    service.add(session, record.clone()).await?;

    Ok(Out::new(
        format!("Added {amount} on {date} to the ledger of '{}'", session.user()?),
        record,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use clap::Parser;

    fn add_args(argv: &[&str]) -> AddArgs {
        #[derive(Parser)]
        struct Wrapper {
            #[clap(flatten)]
            inner: AddArgs,
        }
        let mut full = vec!["test", "--username", "maria", "--secret", TestEnv::SECRET];
        full.extend_from_slice(argv);
        Wrapper::parse_from(full).inner
    }

    #[tokio::test]
    async fn test_add_with_explicit_date() {
        let env = TestEnv::new().await;
        let session = env.login("maria").await;
        let out = add(
            env.config(),
            &session,
            &add_args(&["150.00", "--date", "2024-01-05", "--category", "Salary"]),
        )
        .await
        .unwrap();
        assert!(out.message().contains("150.00"));

        let ledger = env.service().ledger(&session).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.records()[0].category, "Salary");
    }

    #[tokio::test]
    async fn test_add_rejects_bad_date() {
        let env = TestEnv::new().await;
        let session = env.login("maria").await;
        let err = add(
            env.config(),
            &session,
            &add_args(&["150.00", "--date", "someday"]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_rejects_bad_amount() {
        let env = TestEnv::new().await;
        let session = env.login("maria").await;
        let err = add(env.config(), &session, &add_args(&["lots"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
