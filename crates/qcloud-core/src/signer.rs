//! Time-scoped request signing.
//!
//! The API authenticates every call with two headers derived from the
//! credential and the current unix time:
//!
//! ```text
//! digest        = hex(sha256("<token>:<unix-seconds>"))
//! Authorization = "Basic " + base64("<account-id>:<digest>")
//! Timestamp     = "<unix-seconds>"
//! ```
//!
//! The server rejects signatures older than its skew window, so headers are
//! produced per outbound request and never stored on the client.

use base64::{engine::general_purpose, Engine as _};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use crate::config::Credential;

pub const AUTHORIZATION_HEADER: &str = "authorization";
pub const TIMESTAMP_HEADER: &str = "timestamp";

/// Header values for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub authorization: String,
    pub timestamp: String,
}

/// Computes [`SignedHeaders`] from an immutable credential.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credential: Credential,
}

impl RequestSigner {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    pub fn account_id(&self) -> &str {
        self.credential.account_id()
    }

    pub fn sign_now(&self) -> SignedHeaders {
        self.sign_at(OffsetDateTime::now_utc().unix_timestamp())
    }

    pub fn sign_at(&self, unix_seconds: i64) -> SignedHeaders {
        let timestamp = unix_seconds.to_string();
        let digest = Sha256::digest(format!("{}:{timestamp}", self.credential.secret_token()));
        let pair = format!("{}:{}", self.credential.account_id(), hex::encode(digest));

        SignedHeaders {
            authorization: format!("Basic {}", general_purpose::STANDARD.encode(pair)),
            timestamp,
        }
    }
}
