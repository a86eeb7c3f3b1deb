//! Backtest result payloads.
//!
//! In-progress reads return partial objects, so anything not present from the
//! first poll onwards is optional. Banner statistics (`runtimeStatistics`,
//! `statistics`) are free-form label → formatted-value maps and are kept as such.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::ids::{BacktestId, ProjectId};
use super::orders::OrderSymbol;
use super::timestamp::ApiDateTime;

/// Server-side status text of a backtest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BacktestStatus {
    Completed,
    InQueue,
    InProgress,
    RuntimeError,
    /// `Running: NN%` style progress text, kept verbatim.
    Running(String),
    Other(String),
}

impl BacktestStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Completed." => Self::Completed,
            "In Queue..." => Self::InQueue,
            "In Progress..." => Self::InProgress,
            "Runtime Error" => Self::RuntimeError,
            other if other.starts_with("Running") => Self::Running(other.to_owned()),
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "Completed.",
            Self::InQueue => "In Queue...",
            Self::InProgress => "In Progress...",
            Self::RuntimeError => "Runtime Error",
            Self::Running(raw) | Self::Other(raw) => raw,
        }
    }
}

impl Display for BacktestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BacktestStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BacktestStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchGuide {
    pub minutes: i64,
    pub backtest_count: i64,
    pub parameters: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSummary {
    pub name: String,
}

/// Statistics over the list of closed trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeStatistics {
    pub start_date_time: Option<ApiDateTime>,
    pub end_date_time: Option<ApiDateTime>,
    pub total_number_of_trades: i64,
    pub number_of_winning_trades: i64,
    pub number_of_losing_trades: i64,
    pub total_profit_loss: f64,
    pub total_profit: f64,
    pub total_loss: f64,
    pub largest_profit: f64,
    pub largest_loss: f64,
    pub average_profit_loss: f64,
    pub average_profit: f64,
    pub average_loss: f64,
    pub average_trade_duration: String,
    pub average_winning_trade_duration: String,
    pub average_losing_trade_duration: String,
    pub median_trade_duration: String,
    pub median_winning_trade_duration: String,
    pub median_losing_trade_duration: String,
    pub max_consecutive_winning_trades: i64,
    pub max_consecutive_losing_trades: i64,
    pub profit_loss_ratio: f64,
    pub win_loss_ratio: f64,
    pub win_rate: f64,
    pub loss_rate: f64,
    #[serde(rename = "averageMAE")]
    pub average_mae: f64,
    #[serde(rename = "averageMFE")]
    pub average_mfe: f64,
    #[serde(rename = "largestMAE")]
    pub largest_mae: f64,
    #[serde(rename = "largestMFE")]
    pub largest_mfe: f64,
    pub maximum_closed_trade_drawdown: f64,
    pub maximum_intra_trade_drawdown: f64,
    pub profit_loss_standard_deviation: f64,
    pub profit_loss_downside_deviation: f64,
    pub profit_factor: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub profit_to_max_drawdown_ratio: f64,
    pub maximum_end_trade_drawdown: f64,
    pub average_end_trade_drawdown: f64,
    pub maximum_drawdown_duration: String,
    pub total_fees: f64,
}

/// Statistics over equity and benchmark samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStatistics {
    pub average_win_rate: f64,
    pub average_loss_rate: f64,
    pub profit_loss_ratio: f64,
    pub win_rate: f64,
    pub loss_rate: f64,
    pub expectancy: f64,
    pub start_equity: f64,
    pub end_equity: f64,
    pub compounding_annual_return: f64,
    pub drawdown: f64,
    pub total_net_profit: f64,
    pub sharpe_ratio: f64,
    pub probabilistic_sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub alpha: f64,
    pub beta: f64,
    pub annual_standard_deviation: f64,
    pub annual_variance: f64,
    pub information_ratio: f64,
    pub tracking_error: f64,
    pub treynor_ratio: f64,
    pub portfolio_turnover: f64,
    #[serde(rename = "valueAtRisk99")]
    pub value_at_risk_99: f64,
    #[serde(rename = "valueAtRisk95")]
    pub value_at_risk_95: f64,
}

/// A closed trade. `direction` is the platform's numeric code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub symbol: OrderSymbol,
    pub entry_time: ApiDateTime,
    pub entry_price: f64,
    pub direction: i64,
    pub quantity: f64,
    pub exit_time: ApiDateTime,
    pub exit_price: f64,
    pub profit_loss: f64,
    pub total_fees: f64,
    pub mae: f64,
    pub mfe: f64,
    pub duration: String,
    pub end_trade_drawdown: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmPerformance {
    pub trade_statistics: TradeStatistics,
    pub portfolio_statistics: PortfolioStatistics,
    #[serde(default)]
    pub closed_trades: Vec<Trade>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub backtest_id: BacktestId,
    #[serde(default)]
    pub name: String,
    pub note: Option<String>,
    pub organization_id: Option<String>,
    pub project_id: Option<ProjectId>,
    pub status: BacktestStatus,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub progress: f64,
    pub error: Option<String>,
    pub stacktrace: Option<String>,
    pub optimization_id: Option<String>,
    pub tradeable_dates: Option<i64>,
    pub research_guide: Option<ResearchGuide>,
    pub backtest_start: Option<ApiDateTime>,
    pub backtest_end: Option<ApiDateTime>,
    pub created: Option<ApiDateTime>,
    pub snapshot_id: Option<i64>,
    #[serde(default)]
    pub has_initialize_error: bool,
    #[serde(default)]
    pub charts: BTreeMap<String, ChartSummary>,
    pub parameter_set: Option<Value>,
    pub rolling_window: Option<BTreeMap<String, AlgorithmPerformance>>,
    #[serde(default)]
    pub runtime_statistics: BTreeMap<String, String>,
    #[serde(default)]
    pub statistics: BTreeMap<String, String>,
    pub total_performance: Option<AlgorithmPerformance>,
    pub node_name: Option<String>,
    pub out_of_sample_max_end_date: Option<ApiDateTime>,
    pub out_of_sample_days: Option<i64>,
}

impl BacktestResult {
    pub fn failed(&self) -> bool {
        self.status == BacktestStatus::RuntimeError || self.has_initialize_error || self.error.is_some()
    }
}

/// `/backtests/create` and `/backtests/read` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResponse {
    pub backtest: BacktestResult,
    pub debugging: Option<bool>,
}

/// One row of `/backtests/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestSummary {
    pub backtest_id: BacktestId,
    pub status: BacktestStatus,
    pub name: String,
    pub note: Option<String>,
    pub created: Option<ApiDateTime>,
    pub result: Option<String>,
    #[serde(default)]
    pub progress: f64,
    pub optimization_id: Option<String>,
    pub tradeable_dates: Option<i64>,
    pub parameter_set: Option<Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub sharpe_ratio: Option<f64>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub compounding_annual_return: Option<f64>,
    pub drawdown: Option<f64>,
    pub loss_rate: Option<f64>,
    pub net_profit: Option<f64>,
    pub parameters: Option<i64>,
    pub psr: Option<f64>,
    pub security_types: Option<Value>,
    pub sortino_ratio: Option<f64>,
    pub trades: Option<i64>,
    pub treynor_ratio: Option<f64>,
    pub win_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestListResponse {
    #[serde(default)]
    pub backtests: Vec<BacktestSummary>,
    #[serde(default)]
    pub count: usize,
}
