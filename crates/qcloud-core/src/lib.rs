//! # QCloud Core
//!
//! Typed async client for the QuantConnect cloud backtesting API.
//!
//! ## Overview
//!
//! - **Request signing** with a fresh timestamped digest on every send
//! - **Transport** that resends while the server answers with a loading placeholder
//! - **Response classification** into typed payloads or structured errors
//! - **Job coordination** for compile → backtest → result runs, plus pagination
//! - **Endpoint facade** grouped by resource (`compile`, `backtests`, `live`, `object`)
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`classify`] | Success/failure classification and typed decode |
//! | [`client`] | [`ApiClient`] and its facade accessors |
//! | [`config`] | Credentials, base url, timeouts, env loading |
//! | [`coordinator`] | Compile/backtest polling and full runs |
//! | [`endpoints`] | Per-resource endpoint groups |
//! | [`envelope`] | Raw JSON envelope accessors |
//! | [`error`] | Error types and kinds |
//! | [`http_client`] | HTTP abstraction, reqwest and scripted clients |
//! | [`models`] | Typed response payloads |
//! | [`pagination`] | Fixed-window record pagination |
//! | [`polling`] | Loading-retry and job polling policies |
//! | [`signer`] | Authorization header computation |
//! | [`transport`] | Signed single-call transport |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use qcloud_core::{ApiClient, ClientConfig, Coordinator, RunRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new(ClientConfig::from_env()?)?;
//!     let request = RunRequest::new(1234567, "ema-cross", "results")
//!         .with_parameter("ema_fast", 10);
//!
//!     let outcome = Coordinator::new(client).run_backtest(&request).await?;
//!     println!("result written to {}", outcome.result_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Coordinator    │  compile → backtest → file
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Endpoint facade │────▶│ Classifier       │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Transport       │────▶│ Signer           │
//! │ (loading loop)  │     └──────────────────┘
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ HttpClient      │  reqwest / scripted
//! └─────────────────┘
//! ```

pub mod classify;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod models;
pub mod pagination;
pub mod polling;
pub mod signer;
pub mod transport;

pub use classify::ResponseClassifier;
pub use client::ApiClient;
pub use config::{ClientConfig, Credential};
pub use coordinator::{BacktestSnapshot, Coordinator, RunOutcome, RunRequest};
pub use endpoints::BacktestParameters;
pub use envelope::Envelope;
pub use error::{ApiError, ApiErrorKind, Result, ValidationError};
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
    ScriptedHttpClient,
};
pub use models::*;
pub use pagination::{paginate, MAX_PAGE_SIZE};
pub use polling::{LoadingRetry, PollPolicy};
pub use signer::{RequestSigner, SignedHeaders};
pub use tokio_util::sync::CancellationToken;
pub use transport::{RawResponse, RequestDescriptor, Transport};
