use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::timestamp::ApiDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSymbol {
    pub value: String,
    pub id: String,
    pub permtick: String,
}

/// Numeric order status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum OrderStatus {
    New,
    Submitted,
    PartiallyFilled,
    Filled,
    Canceled,
    None,
    Invalid,
    CancelPending,
    UpdateSubmitted,
}

impl OrderStatus {
    pub const fn code(self) -> i64 {
        match self {
            Self::New => 0,
            Self::Submitted => 1,
            Self::PartiallyFilled => 2,
            Self::Filled => 3,
            Self::Canceled => 5,
            Self::None => 6,
            Self::Invalid => 7,
            Self::CancelPending => 8,
            Self::UpdateSubmitted => 9,
        }
    }

    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Filled | Self::Canceled | Self::Invalid)
    }
}

impl TryFrom<i64> for OrderStatus {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::New),
            1 => Ok(Self::Submitted),
            2 => Ok(Self::PartiallyFilled),
            3 => Ok(Self::Filled),
            5 => Ok(Self::Canceled),
            6 => Ok(Self::None),
            7 => Ok(Self::Invalid),
            8 => Ok(Self::CancelPending),
            9 => Ok(Self::UpdateSubmitted),
            other => Err(format!("unknown order status code {other}")),
        }
    }
}

impl From<OrderStatus> for i64 {
    fn from(value: OrderStatus) -> Self {
        value.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderEventStatus {
    New,
    Submitted,
    PartiallyFilled,
    Filled,
    Canceled,
    None,
    Invalid,
    CancelPending,
    UpdateSubmitted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEvent {
    pub algorithm_id: Option<String>,
    pub symbol: String,
    pub symbol_value: Option<String>,
    pub symbol_permtick: Option<String>,
    pub order_id: i64,
    pub order_event_id: i64,
    pub id: String,
    pub status: OrderEventStatus,
    pub order_fee_amount: Option<f64>,
    pub order_fee_currency: Option<String>,
    #[serde(default)]
    pub fill_price: f64,
    pub fill_price_currency: Option<String>,
    #[serde(default)]
    pub fill_quantity: f64,
    pub direction: String,
    pub message: Option<String>,
    #[serde(default)]
    pub is_assignment: bool,
    pub stop_price: Option<f64>,
    pub limit_price: Option<f64>,
    #[serde(default)]
    pub quantity: f64,
    /// Unix seconds, fractional.
    pub time: f64,
    pub is_in_the_money: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmissionData {
    pub bid_price: f64,
    pub ask_price: f64,
    pub last_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupOrderManager {
    pub id: i64,
    pub quantity: f64,
    pub count: i64,
    pub limit_price: f64,
    pub order_ids: Vec<i64>,
    pub direction: i64,
}

/// A single order; numeric `type`, `security_type` and `direction` codes are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub contingent_id: Option<i64>,
    #[serde(default)]
    pub broker_id: Vec<String>,
    pub symbol: OrderSymbol,
    pub limit_price: Option<f64>,
    pub stop_price: Option<f64>,
    pub stop_triggered: Option<bool>,
    pub price: f64,
    pub price_currency: Option<String>,
    pub time: ApiDateTime,
    pub created_time: ApiDateTime,
    pub last_fill_time: Option<ApiDateTime>,
    pub last_update_time: Option<ApiDateTime>,
    pub canceled_time: Option<ApiDateTime>,
    pub quantity: f64,
    #[serde(rename = "type")]
    pub order_type: i64,
    pub status: OrderStatus,
    pub tag: Option<String>,
    pub security_type: i64,
    pub direction: i64,
    pub value: f64,
    pub order_submission_data: Option<OrderSubmissionData>,
    #[serde(default)]
    pub is_marketable: bool,
    #[serde(default)]
    pub properties: Value,
    #[serde(default)]
    pub events: Vec<OrderEvent>,
    pub trailing_amount: Option<f64>,
    pub trailing_percentage: Option<bool>,
    pub group_order_manager: Option<GroupOrderManager>,
    pub trigger_price: Option<f64>,
    pub trigger_touched: Option<bool>,
}

/// One page of `/backtests/orders/read` or `/live/orders/read`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub length: usize,
}
