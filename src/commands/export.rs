//! The `renda export` command.

use crate::args::ExportArgs;
use crate::commands::Out;
use crate::config::Config;
use crate::error::Result;
use crate::service::{LedgerService, Session};
use crate::utils;

/// Writes a (possibly filtered) view of the ledger to a CSV file. The output uses the same
/// format as the ledger files themselves, so it re-imports cleanly.
pub async fn export(config: Config, session: &Session, args: &ExportArgs) -> Result<Out<()>> {
    let service = LedgerService::new(&config);
    let text = service
        .export(session, |record| {
            args.month().map_or(true, |m| record.month_key() == m)
                && args.category().map_or(true, |c| record.category == c)
        })
        .await?;

    utils::write(args.output(), &text).await?;

    // One line per record plus the header.
    let rows = text.lines().count().saturating_sub(1);
    Ok(Out::new_message(format!(
        "Exported {} record{} to {}",
        rows,
        if rows == 1 { "" } else { "s" },
        args.output().display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_date, Amount, IncomeRecord};
    use crate::test::TestEnv;
    use clap::Parser;
    use std::str::FromStr;

    fn export_args(argv: &[&str]) -> ExportArgs {
        #[derive(Parser)]
        struct Wrapper {
            #[clap(flatten)]
            inner: ExportArgs,
        }
        let mut full = vec!["test", "--username", "maria", "--secret", TestEnv::SECRET];
        full.extend_from_slice(argv);
        Wrapper::parse_from(full).inner
    }

    #[tokio::test]
    async fn test_export_writes_filtered_file() {
        let env = TestEnv::new().await;
        let session = env.login("maria").await;
        for (date, category) in [("2024-01-05", "Salary"), ("2024-02-05", "Freelance")] {
            env.service()
                .add(
                    &session,
                    IncomeRecord::new(
                        parse_date(date).unwrap(),
                        Amount::from_str("10.00").unwrap(),
                        Some(category.to_string()),
                        None,
                    ),
                )
                .await
                .unwrap();
        }

        let output = env.config().root().join("view.csv");
        let out = export(
            env.config(),
            &session,
            &export_args(&[
                "--month",
                "2024-01",
                "--output",
                output.to_str().unwrap(),
            ]),
        )
        .await
        .unwrap();
        assert!(out.message().contains("1 record"));

        let text = tokio::fs::read_to_string(&output).await.unwrap();
        assert!(text.starts_with("Data,Valor,Categoria,Descrição\n"));
        assert!(text.contains("2024-01-05"));
        assert!(!text.contains("2024-02-05"));
    }
}
