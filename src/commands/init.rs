//! The `renda init` command.

use crate::commands::Out;
use crate::config::Config;
use crate::error::Result;
use std::path::Path;

/// Creates the renda home directory and an initial configuration file. Running it again against
/// an initialized directory is a no-op.
pub async fn init(home: &Path) -> Result<Out<()>> {
    if home.join("config.json").is_file() {
        return Ok(Out::new_message(format!(
            "Renda home at {} is already initialized",
            home.display()
        )));
    }
    let config = Config::create(home).await?;
    Ok(Out::new_message(format!(
        "Initialized renda home at {}",
        config.root().display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_home() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("renda");
        init(&home).await.unwrap();
        assert!(home.join("config.json").is_file());
        assert!(home.join("ledgers").is_dir());

        // Second run leaves the existing configuration alone.
        let before = std::fs::read_to_string(home.join("config.json")).unwrap();
        init(&home).await.unwrap();
        let after = std::fs::read_to_string(home.join("config.json")).unwrap();
        assert_eq!(before, after);
    }
}
