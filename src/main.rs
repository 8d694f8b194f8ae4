use clap::Parser;
use renda_track::args::{Args, Command};
use renda_track::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().renda_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Register(register_args) => {
            let config = Config::load(home).await?;
            commands::register(config, register_args).await?.print()
        }

        Command::Add(add_args) => {
            let config = Config::load(home).await?;
            let session = commands::login(&config, add_args.auth()).await?;
            commands::add(config, &session, add_args).await?.print()
        }

        Command::List(list_args) => {
            let config = Config::load(home).await?;
            let session = commands::login(&config, list_args.auth()).await?;
            commands::list(config, &session, list_args).await?.print()
        }

        Command::Summary(summary_args) => {
            let config = Config::load(home).await?;
            let session = commands::login(&config, summary_args.auth()).await?;
            commands::summary(config, &session, summary_args)
                .await?
                .print()
        }

        Command::Goal(goal_args) => {
            let config = Config::load(home).await?;
            let session = commands::login(&config, goal_args.auth()).await?;
            commands::goal(config, &session, goal_args).await?.print()
        }

        Command::Export(export_args) => {
            let config = Config::load(home).await?;
            let session = commands::login(&config, export_args.auth()).await?;
            commands::export(config, &session, export_args)
                .await?
                .print()
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            let session = commands::login(&config, delete_args.auth()).await?;
            commands::delete(config, &session, delete_args)
                .await?
                .print()
        }

        Command::Snapshot(auth_args) => {
            let config = Config::load(home).await?;
            let session = commands::login(&config, auth_args).await?;
            commands::snapshot(config, &session).await?.print()
        }

        Command::Migrate(migrate_args) => {
            let config = Config::load(home).await?;
            let session = commands::login(&config, migrate_args.auth()).await?;
            commands::migrate(config, &session, migrate_args)
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
