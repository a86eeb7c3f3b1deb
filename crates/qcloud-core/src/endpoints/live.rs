use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Order, OrdersResponse, ProjectId};
use crate::pagination::{check_window, paginate, MAX_PAGE_SIZE};
use crate::transport::RequestDescriptor;

pub struct LiveEndpoint<'a> {
    client: &'a ApiClient,
}

impl<'a> LiveEndpoint<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn orders(&self) -> LiveOrdersEndpoint<'a> {
        LiveOrdersEndpoint {
            client: self.client,
        }
    }
}

/// Orders of the project's live deployment.
pub struct LiveOrdersEndpoint<'a> {
    client: &'a ApiClient,
}

impl LiveOrdersEndpoint<'_> {
    pub async fn read(&self, project_id: ProjectId, start: usize, end: usize) -> Result<OrdersResponse> {
        check_window(start, end)?;
        self.client
            .request(
                RequestDescriptor::get("/live/orders/read")
                    .with_param("projectId", project_id)
                    .with_param("start", start)
                    .with_param("end", end),
            )
            .await
    }

    pub async fn read_all(&self, project_id: ProjectId) -> Result<Vec<Order>> {
        paginate(MAX_PAGE_SIZE, move |start, end| async move {
            Ok(self.read(project_id, start, end).await?.orders)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::test_support::scripted_client;
    use crate::error::ApiErrorKind;
    use crate::models::fixtures::order_json;

    #[tokio::test]
    async fn read_all_stops_on_first_short_page() {
        let (client, http) = scripted_client();
        http.push_json(json!({
            "success": true,
            "length": 2,
            "orders": [order_json(1), order_json(2)]
        }));

        let orders = client.live().orders().read_all(9).await.expect("read all");
        assert_eq!(orders.len(), 2);
        assert_eq!(http.request_count(), 1);
        assert_eq!(
            http.request_bodies()[0],
            json!({ "projectId": 9, "start": 0, "end": 100 })
        );
        assert!(http.requests()[0].url.ends_with("/live/orders/read"));
    }

    #[tokio::test]
    async fn inverted_window_is_misuse() {
        let (client, http) = scripted_client();
        let error = client
            .live()
            .orders()
            .read(9, 50, 10)
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), ApiErrorKind::Misuse);
        assert_eq!(http.request_count(), 0);
    }
}
