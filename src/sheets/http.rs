use super::model::{
    ApiErrorBody, BatchUpdateRequest, BatchUpdateResponse, Request, Spreadsheet,
    SpreadsheetProperties, UpdateValuesResponse, ValueInputOption, ValueRange,
};
use super::{SheetsApi, SheetsClientFactory, SheetsError};
use crate::auth::AuthClient;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Produces [`HttpSheetsClient`]s for a fixed API base URL.
#[derive(Debug, Clone)]
pub struct HttpSheetsFactory {
    base_url: Url,
    timeout: Option<Duration>,
}

impl HttpSheetsFactory {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, SheetsError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| SheetsError::Url(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(SheetsError::Url(base_url.to_string()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url, timeout })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl SheetsClientFactory for HttpSheetsFactory {
    fn connect(&self, auth: AuthClient) -> Result<Arc<dyn SheetsApi>, SheetsError> {
        let client = HttpSheetsClient::new(self.base_url.clone(), auth, self.timeout)?;
        Ok(Arc::new(client))
    }
}

/// Sheets v4 REST client authenticated as one caller.
#[derive(Debug)]
pub struct HttpSheetsClient {
    http: Client,
    base_url: Url,
    auth: AuthClient,
}

impl HttpSheetsClient {
    pub fn new(
        base_url: Url,
        auth: AuthClient,
        timeout: Option<Duration>,
    ) -> Result<Self, SheetsError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url,
            auth,
        })
    }

    /// `spreadsheets/<segments...>` under the base URL, each segment
    /// percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SheetsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .push("spreadsheets")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match self.auth.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, SheetsError> {
        let response = builder.send().await?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| SheetsError::Decode(e.to_string()))
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        body: &B,
    ) -> Result<T, SheetsError> {
        self.send(builder.json(body)).await
    }
}

async fn check_status(response: Response) -> Result<Response, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) if !parsed.error.message.is_empty() => {
            warn!(
                status = status.as_u16(),
                api_status = parsed.error.status.as_deref().unwrap_or("unknown"),
                "spreadsheet service rejected request"
            );
            parsed.error.message
        }
        _ if !body.trim().is_empty() => body,
        _ => status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("request failed with status {}", status.as_u16())),
    };

    Err(SheetsError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl SheetsApi for HttpSheetsClient {
    async fn create_spreadsheet(&self, title: &str) -> Result<Spreadsheet, SheetsError> {
        let url = self.endpoint(&[])?;
        let body = Spreadsheet {
            properties: Some(SpreadsheetProperties {
                title: Some(title.to_string()),
            }),
            ..Spreadsheet::default()
        };
        debug!(%url, "creating spreadsheet");
        self.send_json(self.request(Method::POST, url), &body).await
    }

    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet, SheetsError> {
        let url = self.endpoint(&[spreadsheet_id])?;
        debug!(%url, "fetching spreadsheet metadata");
        self.send(self.request(Method::GET, url)).await
    }

    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ValueRange, SheetsError> {
        let url = self.endpoint(&[spreadsheet_id, "values", range])?;
        debug!(%url, "reading values");
        self.send(self.request(Method::GET, url)).await
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
        input_option: ValueInputOption,
    ) -> Result<UpdateValuesResponse, SheetsError> {
        let mut url = self.endpoint(&[spreadsheet_id, "values", range])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", input_option.as_ref());
        debug!(%url, rows = values.len(), "writing values");
        let body = json!({ "values": values });
        self.send_json(self.request(Method::PUT, url), &body).await
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateResponse, SheetsError> {
        let action = format!("{spreadsheet_id}:batchUpdate");
        let url = self.endpoint(&[action.as_str()])?;
        debug!(%url, requests = requests.len(), "submitting batch update");
        let body = BatchUpdateRequest { requests };
        self.send_json(self.request(Method::POST, url), &body).await
    }
}
