//! Endpoint facade grouped by resource.
//!
//! Each group borrows the [`ApiClient`](crate::ApiClient), builds a
//! [`RequestDescriptor`](crate::transport::RequestDescriptor) and hands it to
//! the typed or raw request path. Preconditions are checked before any call.

mod backtests;
mod chart;
mod compile;
mod live;
mod object;
mod orders;

pub use backtests::{BacktestParameters, BacktestsEndpoint};
pub use chart::ChartEndpoint;
pub use compile::CompileEndpoint;
pub use live::{LiveEndpoint, LiveOrdersEndpoint};
pub use object::ObjectEndpoint;
pub use orders::BacktestOrdersEndpoint;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::config::{ClientConfig, Credential};
    use crate::http_client::ScriptedHttpClient;
    use crate::polling::LoadingRetry;
    use crate::ApiClient;

    pub fn scripted_client() -> (ApiClient, Arc<ScriptedHttpClient>) {
        let http = Arc::new(ScriptedHttpClient::new());
        let config = ClientConfig::new(Credential::new("42", "secret").expect("credential"))
            .with_base_url("https://api.test/v2")
            .with_loading_retry(LoadingRetry::disabled())
            .with_diagnostics_path(None);
        let client = ApiClient::with_http_client(config, http.clone()).expect("valid config");
        (client, http)
    }
}
