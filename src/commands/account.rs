//! Registration and login against the authentication provider.

use crate::args::{AuthArgs, RegisterArgs};
use crate::commands::Out;
use crate::config::Config;
use crate::error::Result;
use crate::service::Session;
use crate::users::{AuthProvider, Sha256Hasher, StoreAuth, UserStore};

/// The provider the CLI runs with: the file-backed profile store with the built-in hasher.
pub(crate) fn provider(config: &Config) -> StoreAuth<Sha256Hasher> {
    StoreAuth::new(UserStore::new(config.home().users_file()), Sha256Hasher)
}

/// Authenticates the credentials from the command line into a session.
pub async fn login(config: &Config, auth: &AuthArgs) -> Result<Session> {
    Session::login(&provider(config), auth.username(), auth.secret()).await
}

/// Creates a profile for a new user.
pub async fn register(config: Config, args: &RegisterArgs) -> Result<Out<()>> {
    let username = args.auth().username();
    provider(&config)
        .register(
            username,
            args.auth().secret(),
            args.display_name().unwrap_or_default(),
        )
        .await?;
    Ok(Out::new_message(format!("Registered '{username}'")))
}
