//! CLI argument definitions for qcloud.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `compile` | Compile a project and wait for the build |
//! | `backtest run` | Compile, backtest, save the result, delete the remote run |
//! | `backtest read` / `list` / `delete` | Single backtest calls |
//! | `backtest orders` | All orders of a backtest |
//! | `backtest chart` | A chart, merged across pages |
//! | `live orders` | All orders of the live deployment |
//! | `object get` | Object-store download job |
//!
//! Credentials come from `QC_USER_ID` and `QC_API_TOKEN`.
//!
//! # Examples
//!
//! ```bash
//! qcloud backtest run 1234567 --name ema-cross --output-dir results --param ema_fast=10
//! qcloud backtest orders 1234567 8a1b2c --pretty
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "qcloud",
    author,
    version,
    about = "QuantConnect cloud backtesting client"
)]
pub struct Cli {
    /// API base url; overrides QC_BASE_URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds; overrides QC_REQUEST_TIMEOUT_SECS.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compile a project and wait until the build settles.
    Compile(CompileArgs),
    #[command(subcommand)]
    Backtest(BacktestCommand),
    #[command(subcommand)]
    Live(LiveCommand),
    #[command(subcommand)]
    Object(ObjectCommand),
}

#[derive(Debug, Args)]
pub struct CompileArgs {
    pub project_id: u64,
}

#[derive(Debug, Subcommand)]
pub enum BacktestCommand {
    /// Full run: compile, backtest, write `<output-dir>/<name>.json`.
    Run(RunArgs),
    Read(BacktestRef),
    List(ListArgs),
    Delete(BacktestRef),
    Orders(BacktestRef),
    Chart(ChartArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    pub project_id: u64,

    /// Backtest name, also used as the result file name.
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Algorithm parameter as `key=value`; repeatable.
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Keep the remote backtest instead of deleting it.
    #[arg(long, default_value_t = false)]
    pub keep: bool,

    /// Compile wait budget in seconds.
    #[arg(long, default_value_t = 300)]
    pub compile_timeout_secs: u64,

    /// Backtest wait budget in seconds; unbounded when absent.
    #[arg(long)]
    pub backtest_timeout_secs: Option<u64>,
}

#[derive(Debug, Args)]
pub struct BacktestRef {
    pub project_id: u64,
    pub backtest_id: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    pub project_id: u64,

    #[arg(long, default_value_t = false)]
    pub no_statistics: bool,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    pub project_id: u64,
    pub backtest_id: String,
    pub name: String,

    /// Points requested per page.
    #[arg(long, default_value_t = 100)]
    pub count: usize,

    /// Range start, unix seconds.
    #[arg(long)]
    pub start: Option<i64>,

    /// Range end, unix seconds.
    #[arg(long)]
    pub end: Option<i64>,
}

#[derive(Debug, Subcommand)]
pub enum LiveCommand {
    Orders(LiveOrdersArgs),
}

#[derive(Debug, Args)]
pub struct LiveOrdersArgs {
    pub project_id: u64,
}

#[derive(Debug, Subcommand)]
pub enum ObjectCommand {
    Get(ObjectGetArgs),
}

#[derive(Debug, Args)]
pub struct ObjectGetArgs {
    pub organization_id: String,

    #[arg(long = "key")]
    pub keys: Vec<String>,

    #[arg(long = "job")]
    pub job_id: Option<String>,
}
