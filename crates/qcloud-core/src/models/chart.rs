//! Chart payloads.
//!
//! A series' `values` field is encoded differently per `seriesType`: point
//! series send `[time, value]` pairs or `{x, y}` objects, candle series send
//! `[time, open, high, low, close]` rows or keyed objects. [`SeriesData`]
//! resolves the encoding at decode time so callers never see raw arrays.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ChartType {
    Overlay,
    Stacked,
}

impl TryFrom<i64> for ChartType {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Overlay),
            1 => Ok(Self::Stacked),
            other => Err(format!("unknown chart type {other}")),
        }
    }
}

impl From<ChartType> for i64 {
    fn from(value: ChartType) -> Self {
        match value {
            ChartType::Overlay => 0,
            ChartType::Stacked => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum SeriesType {
    Line,
    Scatter,
    Candle,
    Bar,
    Flag,
    StackedArea,
    Pie,
    Treemap,
}

impl SeriesType {
    pub const fn code(self) -> i64 {
        match self {
            Self::Line => 0,
            Self::Scatter => 1,
            Self::Candle => 2,
            Self::Bar => 3,
            Self::Flag => 4,
            Self::StackedArea => 5,
            Self::Pie => 6,
            Self::Treemap => 7,
        }
    }
}

impl TryFrom<i64> for SeriesType {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Line),
            1 => Ok(Self::Scatter),
            2 => Ok(Self::Candle),
            3 => Ok(Self::Bar),
            4 => Ok(Self::Flag),
            5 => Ok(Self::StackedArea),
            6 => Ok(Self::Pie),
            7 => Ok(Self::Treemap),
            other => Err(format!("unknown series type {other}")),
        }
    }
}

impl From<SeriesType> for i64 {
    fn from(value: SeriesType) -> Self {
        value.code()
    }
}

/// Timestamped scalar; `value` is `None` for gaps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub time: i64,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candlestick {
    pub time: i64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
}

/// Series values, resolved by series type.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
    Line(Vec<ChartPoint>),
    Scatter(Vec<ChartPoint>),
    Candle(Vec<Candlestick>),
    Bar(Vec<ChartPoint>),
    Flag(Vec<ChartPoint>),
    StackedArea(Vec<ChartPoint>),
    Pie(Vec<ChartPoint>),
    Treemap(Vec<ChartPoint>),
}

impl SeriesData {
    pub const fn series_type(&self) -> SeriesType {
        match self {
            Self::Line(_) => SeriesType::Line,
            Self::Scatter(_) => SeriesType::Scatter,
            Self::Candle(_) => SeriesType::Candle,
            Self::Bar(_) => SeriesType::Bar,
            Self::Flag(_) => SeriesType::Flag,
            Self::StackedArea(_) => SeriesType::StackedArea,
            Self::Pie(_) => SeriesType::Pie,
            Self::Treemap(_) => SeriesType::Treemap,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Candle(candles) => candles.len(),
            other => other.points().map(<[ChartPoint]>::len).unwrap_or(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point view for every non-candle variant.
    pub fn points(&self) -> Option<&[ChartPoint]> {
        match self {
            Self::Line(points)
            | Self::Scatter(points)
            | Self::Bar(points)
            | Self::Flag(points)
            | Self::StackedArea(points)
            | Self::Pie(points)
            | Self::Treemap(points) => Some(points),
            Self::Candle(_) => None,
        }
    }

    pub fn last_time(&self) -> Option<i64> {
        match self {
            Self::Candle(candles) => candles.last().map(|candle| candle.time),
            other => other.points().and_then(|points| points.last().map(|p| p.time)),
        }
    }

    /// Appends entries strictly newer than the current tail.
    ///
    /// Returns the number of entries appended; mismatched series types append nothing.
    pub fn append_newer(&mut self, other: SeriesData) -> usize {
        let tail = self.last_time();
        let newer = |time: i64| tail.map(|tail| time > tail).unwrap_or(true);

        match (self, other) {
            (Self::Candle(mine), Self::Candle(theirs)) => {
                let before = mine.len();
                mine.extend(theirs.into_iter().filter(|candle| newer(candle.time)));
                mine.len() - before
            }
            (Self::Line(mine), Self::Line(theirs))
            | (Self::Scatter(mine), Self::Scatter(theirs))
            | (Self::Bar(mine), Self::Bar(theirs))
            | (Self::Flag(mine), Self::Flag(theirs))
            | (Self::StackedArea(mine), Self::StackedArea(theirs))
            | (Self::Pie(mine), Self::Pie(theirs))
            | (Self::Treemap(mine), Self::Treemap(theirs)) => {
                let before = mine.len();
                mine.extend(theirs.into_iter().filter(|point| newer(point.time)));
                mine.len() - before
            }
            _ => 0,
        }
    }

    fn decode(series_type: SeriesType, values: &[Value]) -> Result<Self, String> {
        if series_type == SeriesType::Candle {
            return values
                .iter()
                .map(decode_candle)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Candle);
        }

        let points = values
            .iter()
            .map(decode_point)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match series_type {
            SeriesType::Line => Self::Line(points),
            SeriesType::Scatter => Self::Scatter(points),
            SeriesType::Bar => Self::Bar(points),
            SeriesType::Flag => Self::Flag(points),
            SeriesType::StackedArea => Self::StackedArea(points),
            SeriesType::Pie => Self::Pie(points),
            SeriesType::Treemap => Self::Treemap(points),
            SeriesType::Candle => unreachable!("candle series handled above"),
        })
    }

    fn encode(&self) -> Vec<Value> {
        match self {
            Self::Candle(candles) => candles
                .iter()
                .map(|c| json!([c.time, c.open, c.high, c.low, c.close]))
                .collect(),
            other => other
                .points()
                .unwrap_or_default()
                .iter()
                .map(|p| json!([p.time, p.value]))
                .collect(),
        }
    }
}

fn time_of(value: Option<&Value>) -> Result<i64, String> {
    value
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .ok_or_else(|| String::from("chart entry is missing a numeric time"))
}

fn decode_point(value: &Value) -> Result<ChartPoint, String> {
    match value {
        Value::Array(items) if items.len() >= 2 => Ok(ChartPoint {
            time: time_of(items.first())?,
            value: items[1].as_f64(),
        }),
        Value::Object(fields) => Ok(ChartPoint {
            time: time_of(fields.get("x").or_else(|| fields.get("time")))?,
            value: fields
                .get("y")
                .or_else(|| fields.get("value"))
                .and_then(Value::as_f64),
        }),
        other => Err(format!("unsupported chart point encoding: {other}")),
    }
}

fn decode_candle(value: &Value) -> Result<Candlestick, String> {
    match value {
        Value::Array(items) if items.len() >= 5 => Ok(Candlestick {
            time: time_of(items.first())?,
            open: items[1].as_f64(),
            high: items[2].as_f64(),
            low: items[3].as_f64(),
            close: items[4].as_f64(),
        }),
        Value::Object(fields) => Ok(Candlestick {
            time: time_of(fields.get("time").or_else(|| fields.get("x")))?,
            open: fields.get("open").and_then(Value::as_f64),
            high: fields.get("high").and_then(Value::as_f64),
            low: fields.get("low").and_then(Value::as_f64),
            close: fields.get("close").and_then(Value::as_f64),
        }),
        other => Err(format!("unsupported candlestick encoding: {other}")),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSeries {
    name: String,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    index: Option<i64>,
    series_type: SeriesType,
    #[serde(default)]
    values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries", into = "RawSeries")]
pub struct Series {
    pub name: String,
    pub unit: Option<String>,
    pub index: Option<i64>,
    pub data: SeriesData,
}

impl TryFrom<RawSeries> for Series {
    type Error = String;

    fn try_from(raw: RawSeries) -> Result<Self, Self::Error> {
        let data = SeriesData::decode(raw.series_type, &raw.values)
            .map_err(|error| format!("series '{}': {error}", raw.name))?;
        Ok(Self {
            name: raw.name,
            unit: raw.unit,
            index: raw.index,
            data,
        })
    }
}

impl From<Series> for RawSeries {
    fn from(series: Series) -> Self {
        Self {
            values: series.data.encode(),
            series_type: series.data.series_type(),
            name: series.name,
            unit: series.unit,
            index: series.index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub name: String,
    pub chart_type: Option<ChartType>,
    #[serde(default)]
    pub series: BTreeMap<String, Series>,
}

impl Chart {
    /// Number of entries in the longest series.
    pub fn max_series_len(&self) -> usize {
        self.series
            .values()
            .map(|series| series.data.len())
            .max()
            .unwrap_or(0)
    }

    pub fn last_time(&self) -> Option<i64> {
        self.series
            .values()
            .filter_map(|series| series.data.last_time())
            .max()
    }

    /// Merges a later page into this chart; returns the number of entries added.
    pub fn merge_page(&mut self, page: Chart) -> usize {
        let mut added = 0;
        for (name, series) in page.series {
            match self.series.get_mut(&name) {
                Some(existing) => added += existing.data.append_newer(series.data),
                None => {
                    added += series.data.len();
                    self.series.insert(name, series);
                }
            }
        }
        added
    }
}

/// `/backtests/chart/read` payload; `chart` is absent while the server is still generating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartResponse {
    pub chart: Option<Chart>,
    pub progress: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_line_series_from_pairs_and_objects() {
        let payload = json!({
            "name": "Strategy Equity",
            "chartType": 0,
            "series": {
                "Return": {
                    "name": "Return", "unit": "%", "index": 1, "seriesType": 0,
                    "values": [[1704067200, 0.5], { "x": 1704153600, "y": null }]
                }
            }
        });
        let chart: Chart = serde_json::from_value(payload).expect("decode");
        let series = &chart.series["Return"];
        assert_eq!(series.data.series_type(), SeriesType::Line);
        assert_eq!(
            series.data.points().expect("points"),
            [
                ChartPoint { time: 1704067200, value: Some(0.5) },
                ChartPoint { time: 1704153600, value: None },
            ]
        );
    }

    #[test]
    fn decodes_candle_series_from_rows() {
        let payload = json!({
            "name": "Equity", "seriesType": 2,
            "values": [[1704067200, 100.0, 101.0, 99.5, 100.5]]
        });
        let series: Series = serde_json::from_value(payload).expect("decode");
        match &series.data {
            SeriesData::Candle(candles) => {
                assert_eq!(candles[0].high, Some(101.0));
                assert_eq!(candles[0].close, Some(100.5));
            }
            other => panic!("expected candles, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_series_type() {
        let payload = json!({ "name": "x", "seriesType": 99, "values": [] });
        assert!(serde_json::from_value::<Series>(payload).is_err());
    }

    #[test]
    fn merge_page_skips_overlapping_points() {
        let first = json!({ "name": "c", "series": { "s": {
            "name": "s", "seriesType": 0, "values": [[1, 1.0], [2, 2.0]] } } });
        let second = json!({ "name": "c", "series": { "s": {
            "name": "s", "seriesType": 0, "values": [[2, 2.0], [3, 3.0]] } } });

        let mut chart: Chart = serde_json::from_value(first).expect("decode");
        let page: Chart = serde_json::from_value(second).expect("decode");
        assert_eq!(chart.merge_page(page), 1);
        assert_eq!(chart.max_series_len(), 3);
        assert_eq!(chart.last_time(), Some(3));
    }
}
