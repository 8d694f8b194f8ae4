//! The `renda migrate` command.

use crate::args::MigrateArgs;
use crate::commands::Out;
use crate::config::Config;
use crate::error::Result;
use crate::service::{LedgerService, Session};
use crate::store::LedgerStore;
use tracing::debug;

/// Imports a pre-multi-user ledger file into the session user's ledger. After a successful
/// import the records belong exclusively to that user and the source file is renamed so the
/// import cannot run twice.
pub async fn migrate(config: Config, session: &Session, args: &MigrateArgs) -> Result<Out<usize>> {
    let source = match args.source() {
        Some(path) => path.to_path_buf(),
        None => config.home().legacy_ledger(),
    };

    // Keep an independent copy of the target ledger before merging into it. Best-effort only.
    let service = LedgerService::new(&config);
    if let Some(path) = service.try_snapshot(session).await {
        debug!("Snapshot taken at {}", path.display());
    }

    let store = LedgerStore::new(&config);
    let imported = store.migrate_legacy(&source, session.user()?).await?;

    let message = if imported == 0 {
        format!("{} had no records to import", source.display())
    } else {
        format!(
            "Imported {} record{} from {} into the ledger of '{}'",
            imported,
            if imported == 1 { "" } else { "s" },
            source.display(),
            session.user()?
        )
    };
    Ok(Out::new(message, imported))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use clap::Parser;

    fn migrate_args(argv: &[&str]) -> MigrateArgs {
        #[derive(Parser)]
        struct Wrapper {
            #[clap(flatten)]
            inner: MigrateArgs,
        }
        let mut full = vec!["test", "--username", "maria", "--secret", TestEnv::SECRET];
        full.extend_from_slice(argv);
        Wrapper::parse_from(full).inner
    }

    #[tokio::test]
    async fn test_migrate_default_source() {
        let env = TestEnv::new().await;
        let session = env.login("maria").await;
        let legacy = env.config().home().legacy_ledger();
        tokio::fs::write(&legacy, "Data,Valor\n2023-12-01,10.0\n")
            .await
            .unwrap();

        let out = migrate(env.config(), &session, &migrate_args(&[]))
            .await
            .unwrap();
        assert_eq!(*out.structure().unwrap(), 1);
        assert_eq!(env.service().ledger(&session).await.unwrap().len(), 1);
        assert!(!legacy.exists());
    }
}
