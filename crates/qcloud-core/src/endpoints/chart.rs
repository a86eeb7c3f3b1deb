use std::time::Instant;

use tracing::debug;

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::models::{BacktestId, Chart, ChartResponse, ProjectId};
use crate::transport::RequestDescriptor;
use crate::ValidationError;

/// Chart data of a backtest, read by name.
pub struct ChartEndpoint<'a> {
    client: &'a ApiClient,
}

impl<'a> ChartEndpoint<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Reads up to `count` points per series, optionally bounded to `[start, end]` unix seconds.
    ///
    /// `chart` stays `None` while the server is still generating the chart.
    pub async fn read(
        &self,
        project_id: ProjectId,
        backtest_id: &BacktestId,
        name: &str,
        count: usize,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<ChartResponse> {
        check_range(count, start, end)?;
        self.client
            .request(
                RequestDescriptor::get("/backtests/chart/read")
                    .with_param("projectId", project_id)
                    .with_param("backtestId", backtest_id.as_str())
                    .with_param("name", name)
                    .with_param("count", count)
                    .with_optional_param("start", start)
                    .with_optional_param("end", end),
            )
            .await
    }

    /// Walks the chart range page by page and merges series by name.
    ///
    /// Each page starts one second after the newest point seen so far. The
    /// walk ends on a short page, a page that adds nothing, or once `end` is passed.
    pub async fn read_all(
        &self,
        project_id: ProjectId,
        backtest_id: &BacktestId,
        name: &str,
        count: usize,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<Chart> {
        check_range(count, start, end)?;
        let started = Instant::now();
        let mut cursor = start;
        let mut merged: Option<Chart> = None;

        loop {
            let page = self
                .read(project_id, backtest_id, name, count, cursor, end)
                .await?;
            // A page without a chart means the server is still generating it.
            let Some(chart) = page.chart else {
                return Err(still_generating(backtest_id, started));
            };

            let page_len = chart.max_series_len();
            let last_time = chart.last_time();
            let added = match merged.as_mut() {
                Some(existing) => existing.merge_page(chart),
                None => {
                    merged = Some(chart);
                    page_len
                }
            };
            debug!(name, ?cursor, page_len, added, "merged chart page");

            if page_len < count || added == 0 {
                break;
            }
            let Some(next) = last_time.map(|time| time + 1) else {
                break;
            };
            if end.is_some_and(|end| next > end) || cursor.is_some_and(|cursor| next <= cursor) {
                break;
            }
            cursor = Some(next);
        }

        merged.ok_or_else(|| still_generating(backtest_id, started))
    }
}

fn still_generating(backtest_id: &BacktestId, started: Instant) -> ApiError {
    ApiError::Timeout {
        operation: "chart read",
        handle: backtest_id.to_string(),
        elapsed: started.elapsed(),
    }
}

fn check_range(
    count: usize,
    start: Option<i64>,
    end: Option<i64>,
) -> std::result::Result<(), ValidationError> {
    if count == 0 {
        return Err(ValidationError::ZeroChartCount);
    }
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(ValidationError::InvertedChartRange { start, end });
        }
    }
    Ok(())
}
