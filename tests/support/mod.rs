#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rmcp::model::{CallToolResult, JsonObject, RawContent};
use serde_json::{Value, json};
use sheets_wizard::ToolDispatcher;
use sheets_wizard::auth::AuthClient;
use sheets_wizard::sheets::model::{
    BatchUpdateResponse, Request, Sheet, SheetProperties, Spreadsheet, UpdateValuesResponse,
    ValueInputOption, ValueRange,
};
use sheets_wizard::sheets::{SheetsApi, SheetsClientFactory, SheetsConnector, SheetsError};

pub const CLIENT_ID: &str = "client-123.apps.example.com";

pub fn creds() -> String {
    json!({
        "client_id": CLIENT_ID,
        "client_secret": "shh",
        "redirect_uri": "http://localhost:3000/oauth2callback",
        "access_token": "ya29.token",
        "refresh_token": "1//refresh"
    })
    .to_string()
}

pub fn creds_without_token() -> String {
    json!({
        "client_id": CLIENT_ID,
        "client_secret": "shh",
        "redirect_uri": "http://localhost:3000/oauth2callback"
    })
    .to_string()
}

pub fn args(value: Value) -> Option<JsonObject> {
    value.as_object().cloned()
}

/// Text of the single content block every call returns.
pub fn envelope_text(result: &CallToolResult) -> String {
    assert_eq!(result.content.len(), 1, "exactly one content block");
    match &result.content[0].raw {
        RawContent::Text(text) => text.text.clone(),
        other => panic!("expected text content, got {other:?}"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    CreateSpreadsheet {
        title: String,
    },
    GetSpreadsheet {
        spreadsheet_id: String,
    },
    GetValues {
        spreadsheet_id: String,
        range: String,
    },
    UpdateValues {
        spreadsheet_id: String,
        range: String,
        values: Vec<Vec<String>>,
        input_option: ValueInputOption,
    },
    BatchUpdate {
        spreadsheet_id: String,
        requests: Vec<Request>,
    },
}

/// Canned replies for [`RecordingSheets`]. `None` fields fall back to an
/// empty success.
#[derive(Default)]
pub struct Canned {
    pub spreadsheet: Option<Spreadsheet>,
    pub values: Option<ValueRange>,
    pub update: Option<UpdateValuesResponse>,
    pub failure: Option<(u16, String)>,
}

/// In-memory backend that records every remote call in order.
#[derive(Default)]
pub struct RecordingSheets {
    calls: Mutex<Vec<RecordedCall>>,
    canned: Mutex<Canned>,
}

impl RecordingSheets {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_canned(canned: Canned) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            canned: Mutex::new(canned),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: RecordedCall) -> Result<(), SheetsError> {
        self.calls.lock().push(call);
        match &self.canned.lock().failure {
            Some((status, message)) => Err(SheetsError::Api {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SheetsApi for RecordingSheets {
    async fn create_spreadsheet(&self, title: &str) -> Result<Spreadsheet, SheetsError> {
        self.record(RecordedCall::CreateSpreadsheet {
            title: title.to_string(),
        })?;
        Ok(self.canned.lock().spreadsheet.clone().unwrap_or_default())
    }

    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet, SheetsError> {
        self.record(RecordedCall::GetSpreadsheet {
            spreadsheet_id: spreadsheet_id.to_string(),
        })?;
        Ok(self.canned.lock().spreadsheet.clone().unwrap_or_default())
    }

    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ValueRange, SheetsError> {
        self.record(RecordedCall::GetValues {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
        })?;
        Ok(self.canned.lock().values.clone().unwrap_or_default())
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
        input_option: ValueInputOption,
    ) -> Result<UpdateValuesResponse, SheetsError> {
        self.record(RecordedCall::UpdateValues {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
            values,
            input_option,
        })?;
        Ok(self.canned.lock().update.clone().unwrap_or_default())
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateResponse, SheetsError> {
        self.record(RecordedCall::BatchUpdate {
            spreadsheet_id: spreadsheet_id.to_string(),
            requests,
        })?;
        Ok(BatchUpdateResponse {
            spreadsheet_id: Some(spreadsheet_id.to_string()),
            replies: vec![json!({"addChart": {}})],
        })
    }
}

/// Hands out the same backend for every identity and remembers who asked.
pub struct RecordingFactory {
    backend: Arc<RecordingSheets>,
    identities: Mutex<Vec<AuthClient>>,
}

impl RecordingFactory {
    pub fn new(backend: Arc<RecordingSheets>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            identities: Mutex::new(Vec::new()),
        })
    }

    pub fn identities(&self) -> Vec<AuthClient> {
        self.identities.lock().clone()
    }
}

impl SheetsClientFactory for RecordingFactory {
    fn connect(&self, auth: AuthClient) -> Result<Arc<dyn SheetsApi>, SheetsError> {
        self.identities.lock().push(auth);
        Ok(self.backend.clone())
    }
}

pub struct Harness {
    pub backend: Arc<RecordingSheets>,
    pub factory: Arc<RecordingFactory>,
    pub dispatcher: ToolDispatcher,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_backend(RecordingSheets::new())
    }

    pub fn with_backend(backend: Arc<RecordingSheets>) -> Self {
        let factory = RecordingFactory::new(backend.clone());
        let dispatcher = ToolDispatcher::new(SheetsConnector::new(factory.clone(), 0));
        Self {
            backend,
            factory,
            dispatcher,
        }
    }

    pub fn with_enabled_tools(mut self, tools: &[&str]) -> Self {
        let set: HashSet<String> = tools.iter().map(|tool| tool.to_string()).collect();
        self.dispatcher = self.dispatcher.with_enabled_tools(Some(set));
        self
    }

    pub async fn call(&self, name: &str, arguments: Value) -> String {
        let result = self.dispatcher.call(name, args(arguments)).await;
        envelope_text(&result)
    }

    pub async fn call_json(&self, name: &str, arguments: Value) -> Value {
        let text = self.call(name, arguments).await;
        serde_json::from_str(&text).unwrap_or_else(|e| panic!("not JSON ({e}): {text}"))
    }
}

pub fn spreadsheet_with_sheets(sheets: &[(i64, &str)]) -> Spreadsheet {
    Spreadsheet {
        sheets: sheets
            .iter()
            .map(|(id, title)| Sheet {
                properties: Some(SheetProperties {
                    sheet_id: Some(*id),
                    title: Some(title.to_string()),
                }),
            })
            .collect(),
        ..Spreadsheet::default()
    }
}
