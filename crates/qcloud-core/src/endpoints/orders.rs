use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{BacktestId, Order, OrdersResponse, ProjectId};
use crate::pagination::{check_window, paginate, MAX_PAGE_SIZE};
use crate::transport::RequestDescriptor;

/// Orders filled by a finished backtest.
pub struct BacktestOrdersEndpoint<'a> {
    client: &'a ApiClient,
}

impl<'a> BacktestOrdersEndpoint<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Reads orders `[start, end)`; the window may span at most 100 records.
    pub async fn read(
        &self,
        project_id: ProjectId,
        backtest_id: &BacktestId,
        start: usize,
        end: usize,
    ) -> Result<OrdersResponse> {
        check_window(start, end)?;
        self.client
            .request(
                RequestDescriptor::get("/backtests/orders/read")
                    .with_param("projectId", project_id)
                    .with_param("backtestId", backtest_id.as_str())
                    .with_param("start", start)
                    .with_param("end", end),
            )
            .await
    }

    pub async fn read_all(&self, project_id: ProjectId, backtest_id: &BacktestId) -> Result<Vec<Order>> {
        paginate(MAX_PAGE_SIZE, move |start, end| async move {
            let page = self.read(project_id, backtest_id, start, end).await?;
            Ok(page.orders)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::super::test_support::scripted_client;
    use crate::error::ApiErrorKind;
    use crate::models::fixtures::order_json;

    fn page(ids: std::ops::Range<i64>) -> Value {
        let orders = ids.map(order_json).collect::<Vec<_>>();
        json!({ "success": true, "length": orders.len(), "orders": orders })
    }

    #[tokio::test]
    async fn read_all_walks_windows_until_short_page() {
        let (client, http) = scripted_client();
        http.push_json(page(0..100));
        http.push_json(page(100..200));
        http.push_json(page(200..237));

        let orders = client
            .backtests()
            .orders()
            .read_all(7, &"bt-1".into())
            .await
            .expect("read all");

        assert_eq!(orders.len(), 237);
        assert!(orders.iter().enumerate().all(|(index, order)| order.id == index as i64));
        let windows = http
            .request_bodies()
            .iter()
            .map(|body| (body["start"].as_u64(), body["end"].as_u64()))
            .collect::<Vec<_>>();
        assert_eq!(
            windows,
            vec![
                (Some(0), Some(100)),
                (Some(100), Some(200)),
                (Some(200), Some(300)),
            ]
        );
    }

    #[tokio::test]
    async fn oversized_window_fails_before_sending() {
        let (client, http) = scripted_client();
        let error = client
            .backtests()
            .orders()
            .read(7, &"bt-1".into(), 0, 150)
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), ApiErrorKind::Misuse);
        assert_eq!(http.request_count(), 0);
    }
}
