use clap::{Args, Parser, Subcommand, ValueEnum};
use fintrack_engine::SortKey;

#[derive(Parser, Debug)]
#[command(name = "fintrack", disable_version_flag = true)]
#[command(about = "Track income and expenses against a monthly cap")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the data directory.
    #[arg(long, global = true)]
    pub data_dir: Option<String>,
    /// Override timezone (IANA name) used to decide "today".
    #[arg(long, global = true)]
    pub timezone: Option<String>,
    /// Override log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a new entry.
    Add(AddArgs),
    /// Change fields of an existing entry.
    Edit(EditArgs),
    /// Delete an entry.
    Delete(DeleteArgs),
    /// List entries, optionally searched and sorted.
    List(ListArgs),
    /// Show totals, cap status, weekly trend and category totals.
    Stats,
    /// Replace all entries with the content of a JSON file.
    Import(ImportArgs),
    /// Write all entries to a file.
    Export(ExportArgs),
    /// Show or change settings.
    Settings(SettingsArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub description: String,
    /// Amount in the base currency, up to 2 decimals.
    #[arg(long)]
    pub amount: String,
    #[arg(long)]
    pub category: String,
    /// Date as YYYY-MM-DD; defaults to today.
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub id: String,
    /// Skip the confirmation prompt.
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Regular expression matched against description and category.
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub case_sensitive: bool,
    /// Hide entries that do not match the search.
    #[arg(long)]
    pub only_matches: bool,
    /// Sort (and store) the entries by this key before listing.
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,
    /// Sort descending.
    #[arg(long)]
    pub desc: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SortArg {
    Description,
    Amount,
    Date,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Description => SortKey::Description,
            SortArg::Amount => SortKey::Amount,
            SortArg::Date => SortKey::Date,
        }
    }
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    pub file: String,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output path; defaults to finance_data.json (or .csv).
    #[arg(long, short)]
    pub output: Option<String>,
    #[arg(long, value_enum, default_value = "json")]
    pub format: ExportFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: Option<SettingsCommand>,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print the current settings.
    Show,
    /// Manage categories.
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },
    /// Manage convertible currencies.
    Currency {
        #[command(subcommand)]
        command: CurrencyCommand,
    },
    /// Select the currency amounts are displayed in.
    Display { code: String },
    /// Set the monthly spending cap (base currency).
    Cap { amount: String },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    Add { name: String },
    Remove { name: String },
}

#[derive(Subcommand, Debug)]
pub enum CurrencyCommand {
    /// Add a currency worth RATE base units per unit.
    Add { code: String, rate: f64 },
    Remove { code: String },
    /// Change the rate of a configured currency.
    Rate { code: String, rate: f64 },
}
