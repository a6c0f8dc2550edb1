pub mod backup;
pub mod calc;
pub mod cases;
pub mod demo;
pub mod init;
pub mod load;
pub mod report;
pub mod status;
pub mod transactions;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::db::{get_connection, init_db};
use crate::error::{PayoffError, Result};
use crate::models::{parse_date, CaseDetails};
use crate::settings::get_db_path;

/// Open the configured database, failing with a hint when it does not exist.
pub(crate) fn open_db() -> Result<Connection> {
    let db_path = get_db_path();
    if !db_path.exists() {
        return Err(PayoffError::Settings(format!(
            "No database found at {}. Run `payoff init` first.",
            db_path.display()
        )));
    }
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;
    Ok(conn)
}

pub(crate) fn parse_date_opt(date: Option<&str>) -> Result<Option<NaiveDate>> {
    date.map(parse_date).transpose()
}

/// `--as-of` when given, otherwise today's local date.
pub(crate) fn as_of_or_today(as_of: Option<&str>) -> Result<NaiveDate> {
    Ok(parse_date_opt(as_of)?.unwrap_or_else(|| chrono::Local::now().date_naive()))
}

#[derive(Parser)]
#[command(name = "payoff", about = "Judgment-debt payoff tracking for small law offices.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up payoff: choose a data directory and initialize the database.
    Init {
        /// Path for payoff data (default: ~/Documents/payoff)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Firm name shown by `payoff status`
        #[arg(long = "firm-name")]
        firm_name: Option<String>,
    },
    /// Switch to an existing payoff data directory.
    Load {
        /// Path to data directory containing payoff.db
        path: String,
    },
    /// Show current database and summary statistics.
    Status,
    /// Back up the database.
    Backup {
        /// Output path (default: <data_dir>/backups/payoff-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
    /// Manage judgment cases.
    Cases {
        #[command(subcommand)]
        command: CasesCommands,
    },
    /// Manage payments and costs on a case.
    Tx {
        #[command(subcommand)]
        command: TxCommands,
    },
    /// Payoff summary for a case as of a date.
    Payoff {
        /// Case ID (shown in `payoff cases list`)
        case_id: i64,
        /// Evaluation date: YYYY-MM-DD (default: today)
        #[arg(long = "as-of")]
        as_of: Option<String>,
    },
    /// Interest timeline for a case, event by event.
    Timeline {
        case_id: i64,
        #[arg(long = "as-of")]
        as_of: Option<String>,
        /// Write the timeline to a CSV file instead of printing it
        #[arg(long)]
        csv: Option<String>,
    },
    /// Run a calculation request (JSON) and print the response (JSON).
    Calc {
        /// Request file; reads stdin when omitted or `-`
        file: Option<String>,
    },
    /// Load a sample case to explore payoff.
    Demo,
    /// Print shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Optional intake fields shared by `cases add` and `cases edit`.
/// On `cases edit`, an empty value clears the field.
#[derive(Args, Default)]
pub struct DetailArgs {
    /// Collection end date: YYYY-MM-DD
    #[arg(long = "end-date")]
    pub end_date: Option<String>,
    #[arg(long = "firm-name")]
    pub firm_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long = "street")]
    pub street_address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long = "zip")]
    pub zip_code: Option<String>,
    #[arg(long = "phone")]
    pub phone_number: Option<String>,
}

impl DetailArgs {
    pub fn into_details(self) -> Result<CaseDetails> {
        Ok(CaseDetails {
            end_date: parse_date_opt(self.end_date.as_deref())?,
            firm_name: self.firm_name,
            email: self.email,
            website: self.website,
            street_address: self.street_address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            phone_number: self.phone_number,
        })
    }
}

#[derive(Subcommand)]
pub enum CasesCommands {
    /// Record a new judgment.
    Add {
        /// Case name, e.g. 'Rivera v. Holt'
        name: String,
        #[arg(long)]
        court: String,
        /// Court case number
        #[arg(long)]
        number: String,
        /// Judgment amount
        #[arg(long)]
        amount: Decimal,
        /// Judgment date: YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Annual interest rate in percent (default from settings)
        #[arg(long)]
        rate: Option<Decimal>,
        #[command(flatten)]
        details: DetailArgs,
    },
    /// List cases with today's payoff.
    List {
        #[arg(long, default_value = "50")]
        limit: i64,
        #[arg(long, default_value = "0")]
        offset: i64,
        #[arg(long = "as-of")]
        as_of: Option<String>,
    },
    /// Show one case.
    Show { id: i64 },
    /// Edit a case's judgment or intake fields.
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        court: Option<String>,
        #[arg(long)]
        number: Option<String>,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        rate: Option<Decimal>,
        #[command(flatten)]
        details: DetailArgs,
    },
    /// Delete a case and all of its transactions.
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// Record a payment or cost.
    Add {
        case_id: i64,
        /// payment or cost
        #[arg(long)]
        kind: String,
        #[arg(long)]
        amount: Decimal,
        /// Date: YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List a case's transactions with balances after each.
    List {
        case_id: i64,
        #[arg(long = "as-of")]
        as_of: Option<String>,
    },
    /// Edit a transaction.
    Edit {
        /// Transaction ID (shown in `payoff tx list`)
        id: i64,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a transaction.
    Delete { id: i64 },
}
