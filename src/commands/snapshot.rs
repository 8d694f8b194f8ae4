//! The `renda snapshot` command.

use crate::commands::Out;
use crate::config::Config;
use crate::error::Result;
use crate::service::Session;
use crate::store::LedgerStore;
use std::path::PathBuf;

/// Takes an independent, timestamped copy of the session user's ledger file. Old snapshots are
/// rotated away past the configured copy count.
pub async fn snapshot(config: Config, session: &Session) -> Result<Out<PathBuf>> {
    let store = LedgerStore::new(&config);
    match store.snapshot(session.user()?).await? {
        Some(path) => Ok(Out::new(
            format!("Snapshot written to {}", path.display()),
            path,
        )),
        None => Ok(Out::new_message(
            "There is no ledger file to snapshot yet.",
        )),
    }
}
