//! These structs provide the CLI interface for the renda CLI.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// renda: A command-line tool for tracking income.
///
/// The purpose of this program is to record income events (date, amount, optional category and
/// description) into a per-user ledger file, and to report daily, weekly and monthly totals plus
/// progress against a daily income goal.
///
/// Each user's ledger lives in its own CSV file under the renda home directory, and every
/// command that touches a ledger authenticates first. Registration and login need a username
/// and a secret; the secret can be supplied via the RENDA_SECRET environment variable to keep
/// it out of shell history.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. Decide what directory you want to store data
    /// in and pass it as --renda-home (or RENDA_HOME). By default it will be $HOME/renda.
    Init,
    /// Register a new user.
    Register(RegisterArgs),
    /// Add one income record to your ledger.
    Add(AddArgs),
    /// List the records in your ledger.
    List(ListArgs),
    /// Show daily, weekly or monthly totals, and goal statistics when a goal is set.
    Summary(SummaryArgs),
    /// Show or set your daily income goal, or show today's progress against it.
    Goal(GoalArgs),
    /// Export a (possibly filtered) view of your ledger to a CSV file.
    Export(ExportArgs),
    /// Delete the records matching the given filters.
    Delete(DeleteArgs),
    /// Take an independent backup copy of your ledger file.
    Snapshot(AuthArgs),
    /// Import a pre-multi-user rendimentos.csv file into your ledger.
    Migrate(MigrateArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where renda data and configuration is held. Defaults to ~/renda
    #[arg(long, env = "RENDA_HOME", default_value_t = default_renda_home())]
    renda_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, renda_home: PathBuf) -> Self {
        Self {
            log_level,
            renda_home: renda_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn renda_home(&self) -> &DisplayPath {
        &self.renda_home
    }
}

/// Credentials shared by every command that touches a ledger.
#[derive(Debug, Parser, Clone)]
pub struct AuthArgs {
    /// The username whose ledger to operate on.
    #[arg(long, short = 'u', env = "RENDA_USER")]
    username: String,

    /// The secret for the username. Prefer the environment variable over the flag.
    #[arg(long, env = "RENDA_SECRET", hide_env_values = true)]
    secret: String,
}

impl AuthArgs {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

/// Args for the `renda register` command.
#[derive(Debug, Parser, Clone)]
pub struct RegisterArgs {
    #[clap(flatten)]
    auth: AuthArgs,

    /// The name shown in greetings and reports. Defaults to the username.
    #[arg(long)]
    display_name: Option<String>,
}

impl RegisterArgs {
    pub fn auth(&self) -> &AuthArgs {
        &self.auth
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

/// Args for the `renda add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    #[clap(flatten)]
    auth: AuthArgs,

    /// The amount earned, e.g. "150.00" or "R$ 1,500.00".
    amount: String,

    /// The date of the income, e.g. 2024-01-05. Defaults to today.
    #[arg(long)]
    date: Option<String>,

    /// An optional category label, e.g. "Freelance".
    #[arg(long)]
    category: Option<String>,

    /// An optional free-text description.
    #[arg(long)]
    description: Option<String>,
}

impl AddArgs {
    pub fn auth(&self) -> &AuthArgs {
        &self.auth
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Args for the `renda list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    #[clap(flatten)]
    auth: AuthArgs,

    /// Only list records from this month, e.g. 2024-01.
    #[arg(long)]
    month: Option<String>,
}

impl ListArgs {
    pub fn auth(&self) -> &AuthArgs {
        &self.auth
    }

    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }
}

/// The rollup granularity of the `summary` command.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

serde_plain::derive_display_from_serialize!(Period);
serde_plain::derive_fromstr_from_deserialize!(Period);

/// Args for the `renda summary` command.
#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    #[clap(flatten)]
    auth: AuthArgs,

    /// The bucket size: daily, weekly or monthly.
    #[arg(value_enum, default_value_t = Period::Daily)]
    period: Period,

    /// Restrict a daily summary to this month, e.g. 2024-01.
    #[arg(long)]
    month: Option<String>,
}

impl SummaryArgs {
    pub fn auth(&self) -> &AuthArgs {
        &self.auth
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }
}

/// Args for the `renda goal` command.
#[derive(Debug, Parser, Clone)]
pub struct GoalArgs {
    #[clap(flatten)]
    auth: AuthArgs,

    #[command(subcommand)]
    action: GoalSubcommand,
}

impl GoalArgs {
    pub fn auth(&self) -> &AuthArgs {
        &self.auth
    }

    pub fn action(&self) -> &GoalSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum GoalSubcommand {
    /// Set the daily goal. Zero clears it.
    Set {
        /// The daily target amount, e.g. "100.00".
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Show the current daily goal.
    Show,
    /// Show progress against the goal for a date (default today).
    Progress {
        /// The date to report on, e.g. 2024-01-05.
        #[arg(long)]
        date: Option<String>,
    },
}

/// Args for the `renda export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[clap(flatten)]
    auth: AuthArgs,

    /// Where to write the exported CSV.
    #[arg(long, short = 'o', default_value = "export.csv")]
    output: PathBuf,

    /// Only export records from this month, e.g. 2024-01.
    #[arg(long)]
    month: Option<String>,

    /// Only export records with this category.
    #[arg(long)]
    category: Option<String>,
}

impl ExportArgs {
    pub fn auth(&self) -> &AuthArgs {
        &self.auth
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// Args for the `renda delete` command. At least one filter is required; `--all` is the
/// explicit way to clear the whole ledger.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    #[clap(flatten)]
    auth: AuthArgs,

    /// Delete records from this month, e.g. 2024-01.
    #[arg(long)]
    month: Option<String>,

    /// Delete records with this category.
    #[arg(long)]
    category: Option<String>,

    /// Delete records on this date, e.g. 2024-01-05.
    #[arg(long)]
    date: Option<String>,

    /// Delete every record in the ledger.
    #[arg(long, conflicts_with_all = ["month", "category", "date"])]
    all: bool,
}

impl DeleteArgs {
    pub fn auth(&self) -> &AuthArgs {
        &self.auth
    }

    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn all(&self) -> bool {
        self.all
    }
}

/// Args for the `renda migrate` command.
#[derive(Debug, Parser, Clone)]
pub struct MigrateArgs {
    #[clap(flatten)]
    auth: AuthArgs,

    /// The legacy single-user CSV file to import. Defaults to rendimentos.csv in the renda
    /// home directory.
    #[arg(long)]
    source: Option<PathBuf>,
}

impl MigrateArgs {
    pub fn auth(&self) -> &AuthArgs {
        &self.auth
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

fn default_renda_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("renda"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --renda-home or RENDA_HOME instead of relying on the default \
                renda home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("renda")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
