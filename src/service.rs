//! The orchestrator that ties the validator, store and goal tracker together.
//!
//! Session state is an explicit value passed into every call; there are no ambient globals. A
//! session moves `Unauthenticated -> Authenticated(user)` through [`Session::login`] and back
//! via [`Session::logout`].
//!
//! Every mutating operation reloads the durable ledger immediately before changing it. An
//! in-memory ledger is never trusted across an operation boundary, so a save that happened
//! between two interactions of the same user is not clobbered.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{IncomeRecord, Ledger};
use crate::store::LedgerStore;
use crate::users::AuthProvider;
use crate::validate::validate_row;
use tracing::{debug, info, warn};

/// Whether a user is logged in. Constructed `Unauthenticated`; only a successful
/// `AuthProvider::authenticate` moves it forward.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Session {
    Unauthenticated,
    Authenticated(String),
}

impl Session {
    /// Authenticates against the provider and returns an authenticated session.
    pub async fn login(auth: &dyn AuthProvider, username: &str, secret: &str) -> Result<Session> {
        auth.authenticate(username, secret).await?;
        debug!("'{username}' authenticated");
        Ok(Session::Authenticated(username.to_string()))
    }

    pub fn logout(self) -> Session {
        Session::Unauthenticated
    }

    /// The authenticated username, or `NotAuthenticated`.
    pub fn user(&self) -> Result<&str> {
        match self {
            Session::Authenticated(user) => Ok(user),
            Session::Unauthenticated => Err(Error::NotAuthenticated),
        }
    }
}

/// The outcome of a whole-ledger replace operation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ReplaceOutcome {
    /// Rows outside the filter that were carried over untouched.
    pub kept: usize,
    /// Rows from the edited view that were written.
    pub written: usize,
}

pub struct LedgerService {
    store: LedgerStore,
    allow_zero: bool,
}

impl LedgerService {
    pub fn new(config: &Config) -> Self {
        Self {
            store: LedgerStore::new(config),
            allow_zero: config.allow_zero_amounts(),
        }
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// The current ledger for the session's user.
    pub async fn ledger(&self, session: &Session) -> Result<Ledger> {
        Ok(self.store.load(session.user()?).await?.ledger)
    }

    /// Validates and appends one record, then saves.
    ///
    /// The durable ledger is reloaded first so a concurrent external change is not clobbered.
    /// Zero-amount records are rejected unless the `allow_zero_amounts` policy is on; negative
    /// amounts are always rejected.
    pub async fn add(&self, session: &Session, record: IncomeRecord) -> Result<()> {
        let user = session.user()?;
        self.check_record(&record)?;

        let mut ledger = self.store.load(user).await?.ledger;
        ledger.push(record);
        self.store.save(user, &ledger).await?;
        info!("Added a record for '{user}', ledger now has {} rows", ledger.len());
        Ok(())
    }

    /// Replaces the part of the ledger matched by `predicate` with `new_rows`.
    ///
    /// This models "edit the visible subset": the caller filtered the ledger with `predicate`,
    /// edited the matching rows, and hands back the result. Rows that do NOT match the
    /// predicate are reloaded from durable state and carried over untouched, so a save from a
    /// filtered view can never lose or duplicate them.
    pub async fn replace_filtered<P>(
        &self,
        session: &Session,
        new_rows: Vec<IncomeRecord>,
        predicate: P,
    ) -> Result<ReplaceOutcome>
    where
        P: Fn(&IncomeRecord) -> bool,
    {
        let user = session.user()?;
        for record in &new_rows {
            self.check_record(record)?;
        }

        let current = self.store.load(user).await?.ledger;
        let mut next = current.filter(|r| !predicate(r));
        let kept = next.len();
        let written = new_rows.len();
        for record in new_rows {
            next.push(record);
        }

        if next.is_empty() {
            // The edit deliberately removed everything: an explicit clear, not corruption.
            self.store.clear(user).await?;
        } else {
            self.store.save(user, &next).await?;
        }
        debug!("Replaced filtered view for '{user}': kept {kept}, wrote {written}");
        Ok(ReplaceOutcome { kept, written })
    }

    /// Deletes every record matching `predicate`. Returns the number of deleted rows.
    pub async fn delete<P>(&self, session: &Session, predicate: P) -> Result<usize>
    where
        P: Fn(&IncomeRecord) -> bool,
    {
        let user = session.user()?;
        let before = self.store.load(user).await?.ledger.len();
        let outcome = self.replace_filtered(session, Vec::new(), predicate).await?;
        Ok(before - outcome.kept)
    }

    /// Serializes the records matching `predicate` to ledger CSV text, for download. The output
    /// round-trips through the validator unchanged.
    pub async fn export<P>(&self, session: &Session, predicate: P) -> Result<String>
    where
        P: Fn(&IncomeRecord) -> bool,
    {
        let ledger = self.ledger(session).await?;
        let view = ledger.filter(predicate);
        export_csv(&view)
    }

    /// Takes a snapshot of the user's ledger file. Failure is reported but deliberately
    /// swallowed into `None`: a backup problem must never block a ledger operation.
    pub async fn try_snapshot(&self, session: &Session) -> Option<std::path::PathBuf> {
        let user = match session.user() {
            Ok(user) => user,
            Err(_) => return None,
        };
        match self.store.snapshot(user).await {
            Ok(path) => path,
            Err(e) => {
                warn!("Snapshot for '{user}' failed (non-fatal): {e}");
                None
            }
        }
    }

    fn check_record(&self, record: &IncomeRecord) -> Result<()> {
        // Run the shared row validation so service-level rules can never drift from what the
        // store will accept.
        validate_row(&record.to_raw()).map_err(Error::Validation)?;
        if record.amount.is_zero() && !self.allow_zero {
            return Err(Error::Validation(
                "zero-amount records are not accepted".to_string(),
            ));
        }
        Ok(())
    }
}

/// Serializes a ledger view to the tabular text format used by the store.
pub fn export_csv(view: &Ledger) -> Result<String> {
    crate::store::write_rows(view.iter().map(|r| r.to_raw()))
}
