pub mod http;
pub mod model;

use crate::auth::AuthClient;
use crate::error::ToolError;
use crate::metrics::METRICS;
use async_trait::async_trait;
use lru::LruCache;
use model::{
    BatchUpdateResponse, Request, Spreadsheet, UpdateValuesResponse, ValueInputOption, ValueRange,
};
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub use http::{HttpSheetsClient, HttpSheetsFactory};

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4/";

/// Failure talking to the remote spreadsheet service.
///
/// `Api` carries the service's own message so it can be surfaced verbatim.
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response from spreadsheet service: {0}")]
    Decode(String),

    #[error("invalid spreadsheet API url: {0}")]
    Url(String),
}

impl SheetsError {
    pub fn status(&self) -> Option<u16> {
        match self {
            SheetsError::Api { status, .. } => Some(*status),
            SheetsError::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}

/// Remote operations the tool handlers need. One implementation talks to the
/// real service; tests substitute a recording fake.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    async fn create_spreadsheet(&self, title: &str) -> Result<Spreadsheet, SheetsError>;

    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet, SheetsError>;

    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ValueRange, SheetsError>;

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
        input_option: ValueInputOption,
    ) -> Result<UpdateValuesResponse, SheetsError>;

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateResponse, SheetsError>;
}

/// Builds a client bound to one remote API version for an authenticated
/// identity.
pub trait SheetsClientFactory: Send + Sync {
    fn connect(&self, auth: AuthClient) -> Result<Arc<dyn SheetsApi>, SheetsError>;
}

/// Turns the per-call credential blob into a ready client.
///
/// With `cache_capacity == 0` every call builds a fresh client. Otherwise up
/// to `cache_capacity` clients are kept, keyed by credential fingerprint.
pub struct SheetsConnector {
    factory: Arc<dyn SheetsClientFactory>,
    cache: Option<Mutex<LruCache<[u8; 32], Arc<dyn SheetsApi>>>>,
}

impl SheetsConnector {
    pub fn new(factory: Arc<dyn SheetsClientFactory>, cache_capacity: usize) -> Self {
        let cache = NonZeroUsize::new(cache_capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        Self { factory, cache }
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub fn client_for(&self, credentials: &str) -> Result<Arc<dyn SheetsApi>, ToolError> {
        let auth = AuthClient::from_json(credentials)?;

        let Some(cache) = self.cache.as_ref() else {
            return Ok(self.factory.connect(auth)?);
        };

        let key = auth.fingerprint();
        if let Some(client) = cache.lock().get(&key).cloned() {
            METRICS.record_client_cache_hit();
            debug!(client_id = auth.client_id(), "reusing cached sheets client");
            return Ok(client);
        }

        METRICS.record_client_cache_miss();
        let client = self.factory.connect(auth)?;
        cache.lock().put(key, client.clone());
        Ok(client)
    }
}
