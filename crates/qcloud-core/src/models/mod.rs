//! # Response Models
//!
//! Typed payloads for every endpoint of the facade. Models only describe
//! shape; they carry no request logic.
//!
//! | Type | Endpoint |
//! |------|----------|
//! | [`CompileCreateResponse`], [`CompileReadResponse`] | `/compile/*` |
//! | [`BacktestResponse`], [`BacktestListResponse`] | `/backtests/{create,read,list}` |
//! | [`OrdersResponse`] | `/backtests/orders/read`, `/live/orders/read` |
//! | [`ChartResponse`] | `/backtests/chart/read` |
//! | [`ObjectStoreResponse`] | `/object/get` |

mod backtest;
mod chart;
mod compile;
mod ids;
mod object;
mod orders;
mod timestamp;

pub use backtest::{
    AlgorithmPerformance, BacktestListResponse, BacktestResponse, BacktestResult,
    BacktestStatus, BacktestSummary, ChartSummary, PortfolioStatistics, ResearchGuide, Trade,
    TradeStatistics,
};
pub use chart::{
    Candlestick, Chart, ChartPoint, ChartResponse, ChartType, Series, SeriesData, SeriesType,
};
pub use compile::{CompileCreateResponse, CompileReadResponse, CompileState};
pub use ids::{BacktestId, CompileId, ProjectId};
pub use object::ObjectStoreResponse;
pub use orders::{
    GroupOrderManager, Order, OrderEvent, OrderEventStatus, OrderStatus, OrderSubmissionData,
    OrderSymbol, OrdersResponse,
};
pub use timestamp::ApiDateTime;

#[cfg(test)]
pub(crate) use orders::fixtures;
