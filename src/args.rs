//! These structs provide the CLI interface for the accountbook CLI.

use crate::model::{parse_date_time, Amount, Kind};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// accountbook: A command-line account book for income and expense records.
///
/// Record what came in and what went out, each with a category, a date and an amount. Browse a
/// month as a calendar with per-day totals, list the records of one day, and see how a month's
/// spending or income splits across categories.
///
/// Data is kept in a SQLite file under --home, which must be created once with
/// `accountbook init`.
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
    /// Create the data directory, the configuration file and an empty records database.
    ///
    /// This is the first command you should run. By default the data lives in
    /// $HOME/accountbook; pass --home or set ACCOUNTBOOK_HOME to put it somewhere else.
    Init,
    /// Add an income or expense record.
    Add(AddArgs),
    /// Change fields of an existing record. Fields that are not given keep their value.
    Edit(EditArgs),
    /// Delete one or more records. A backup of the database is taken first.
    Delete(DeleteArgs),
    /// List the records of one day together with the day's totals.
    Day(DayArgs),
    /// Show a month as a Sunday-first calendar with income and expense totals per day.
    Calendar(MonthArgs),
    /// Show how a month's expenses (or income) split across categories.
    Analysis(AnalysisArgs),
    /// Print the preset categories that records can be filed under.
    Categories(CategoriesArgs),
    /// Print all records, or the records of one year or month.
    List(ListArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber EnvFilter docs.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where records and configuration are held. Defaults to ~/accountbook
    #[arg(long, env = "ACCOUNTBOOK_HOME", default_value_t = default_accountbook_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// Args for the `accountbook add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// Whether the record is income or an expense.
    #[arg(long, value_enum, default_value_t = Kind::Expense)]
    kind: Kind,

    /// One of the preset categories for the kind, see `accountbook categories`.
    #[arg(long)]
    category: String,

    /// The amount, e.g. 15000 or 15,000. Never negative.
    #[arg(long)]
    amount: Amount,

    /// When it happened, as YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS]. Defaults to now.
    #[arg(long, value_parser = parse_date_arg)]
    date: Option<NaiveDateTime>,
}

impl AddArgs {
    pub fn new(
        kind: Kind,
        category: impl Into<String>,
        amount: Amount,
        date: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            kind,
            category: category.into(),
            amount,
            date,
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> Option<NaiveDateTime> {
        self.date
    }
}

/// Args for the `accountbook edit` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct EditArgs {
    /// The ID of the record to change.
    id: String,

    #[arg(long, value_enum)]
    kind: Option<Kind>,

    /// Must be a preset category of the record's kind after the edit.
    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    amount: Option<Amount>,

    /// YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS]
    #[arg(long, value_parser = parse_date_arg)]
    date: Option<NaiveDateTime>,
}

impl EditArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_date(mut self, date: NaiveDateTime) -> Self {
        self.date = Some(date);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> Option<Kind> {
        self.kind
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    pub fn date(&self) -> Option<NaiveDateTime> {
        self.date
    }
}

/// Args for the `accountbook delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The IDs of the records to delete. Either all of them are deleted or none are.
    #[arg(required = true)]
    ids: Vec<String>,
}

impl DeleteArgs {
    pub fn new<S: Into<String>>(ids: impl IntoIterator<Item = S>) -> Self {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

/// Args for the `accountbook day` command.
#[derive(Debug, Parser, Clone)]
pub struct DayArgs {
    /// The day to show, as YYYY-MM-DD. Defaults to today.
    #[arg(long, value_parser = parse_day_arg)]
    date: Option<NaiveDate>,
}

impl DayArgs {
    pub fn new(date: Option<NaiveDate>) -> Self {
        Self { date }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

/// A year and month, each defaulting to the current one.
#[derive(Debug, Parser, Clone, Default)]
pub struct MonthArgs {
    #[arg(long)]
    year: Option<i32>,

    /// 1 through 12
    #[arg(long)]
    month: Option<u32>,
}

impl MonthArgs {
    pub fn new(year: Option<i32>, month: Option<u32>) -> Self {
        Self { year, month }
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }
}

/// Args for the `accountbook analysis` command.
#[derive(Debug, Parser, Clone)]
pub struct AnalysisArgs {
    #[clap(flatten)]
    month: MonthArgs,

    /// Break down expenses or income.
    #[arg(long, value_enum, default_value_t = Kind::Expense)]
    kind: Kind,
}

impl AnalysisArgs {
    pub fn new(month: MonthArgs, kind: Kind) -> Self {
        Self { month, kind }
    }

    pub fn month(&self) -> &MonthArgs {
        &self.month
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }
}

/// Args for the `accountbook categories` command.
#[derive(Debug, Parser, Clone)]
pub struct CategoriesArgs {
    /// Only print the categories of this kind.
    #[arg(long, value_enum)]
    kind: Option<Kind>,
}

impl CategoriesArgs {
    pub fn new(kind: Option<Kind>) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> Option<Kind> {
        self.kind
    }
}

/// How `accountbook list` prints records.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// Args for the `accountbook list` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ListArgs {
    /// Only records of this year.
    #[arg(long)]
    year: Option<i32>,

    /// Only records of this month (1 through 12) of --year.
    #[arg(long, requires = "year")]
    month: Option<u32>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl ListArgs {
    pub fn new(year: Option<i32>, month: Option<u32>, format: OutputFormat) -> Self {
        Self {
            year,
            month,
            format,
        }
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

fn parse_date_arg(s: &str) -> Result<NaiveDateTime, String> {
    parse_date_time(s).map_err(|_| {
        format!("'{s}' is not a date, expected YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS]")
    })
}

fn parse_day_arg(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("'{s}' is not a date, expected YYYY-MM-DD"))
}

fn default_accountbook_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("accountbook"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or ACCOUNTBOOK_HOME instead of relying on the default \
                accountbook home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("accountbook")
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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("accountbook").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_is_well_formed() {
        <Args as CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_display_path_from_env_style_string() {
        let home = DisplayPath::from_str("/tmp/accountbook").unwrap();
        assert_eq!(home.path(), Path::new("/tmp/accountbook"));
        assert_eq!(home.to_string(), "/tmp/accountbook");
        assert_eq!(DisplayPath::new(PathBuf::from("x")).path(), Path::new("x"));
    }

    #[test]
    fn test_parse_add() {
        let args = parse(&[
            "--home", "/tmp/ab", "add", "--kind", "income", "--category", "Salary", "--amount",
            "3,000,000", "--date", "2024-05-01",
        ]);
        assert_eq!(args.common().home().path(), Path::new("/tmp/ab"));
        let Command::Add(add) = args.command() else {
            panic!("expected add, got {:?}", args.command());
        };
        assert_eq!(add.kind(), Kind::Income);
        assert_eq!(add.amount(), Amount::from(3_000_000));
        assert_eq!(
            add.date(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(0, 0, 0)
        );
    }

    #[test]
    fn test_add_rejects_negative_amount() {
        let result = Args::try_parse_from([
            "accountbook", "add", "--category", "Food", "--amount", "-5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_edit_partial() {
        let args = parse(&["edit", "rec-1", "--amount", "500"]);
        let Command::Edit(edit) = args.command() else {
            panic!("expected edit");
        };
        assert_eq!(edit.id(), "rec-1");
        assert_eq!(edit.amount(), Some(Amount::from(500)));
        assert!(edit.kind().is_none());
        assert!(edit.category().is_none());
    }

    #[test]
    fn test_delete_requires_ids() {
        assert!(Args::try_parse_from(["accountbook", "delete"]).is_err());
        let args = parse(&["delete", "a", "b"]);
        let Command::Delete(delete) = args.command() else {
            panic!("expected delete");
        };
        assert_eq!(delete.ids(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_list_month_requires_year() {
        assert!(Args::try_parse_from(["accountbook", "list", "--month", "5"]).is_err());
        let args = parse(&["list", "--year", "2024", "--month", "5", "--format", "csv"]);
        let Command::List(list) = args.command() else {
            panic!("expected list");
        };
        assert_eq!(list.format(), OutputFormat::Csv);
    }

    #[test]
    fn test_bad_date_is_rejected() {
        assert!(Args::try_parse_from(["accountbook", "day", "--date", "05/01/2024"]).is_err());
    }
}
