use crate::config::ServerConfig;
use crate::dispatch::ToolDispatcher;
use crate::sheets::{HttpSheetsFactory, SheetsConnector};
use crate::shutdown;
use anyhow::Result;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    transport::stdio,
};
use std::sync::Arc;

const INSTRUCTIONS: &str = "\
Sheets Wizard: Google Sheets operations, authenticated per call.

Every tool takes a `credentials` argument: a JSON string
{client_id, client_secret, redirect_uri, access_token?, refresh_token?}.
Without access_token the call reaches Google unauthenticated and fails.

TOOLS:
- create_sheet: new spreadsheet; returns spreadsheetId and spreadsheetUrl.
- get_data / update_cells: read or write an A1 range (e.g. Sheet1!A1:D10). \
Writes are USER_ENTERED: '=' starts a formula, numeric strings become numbers.
- add_formula: writes one formula at the range's top-left cell.
- create_chart: charts rows 1-10 of columns A (categories) and B (values) of sheetId, \
placed at D1. sourceRange is accepted but not used.
- export_csv: whole sheet as CSV. Cells are not quoted or escaped.

Failures come back as text starting with 'Error: '.";

#[derive(Clone)]
pub struct SheetsServer {
    dispatcher: Arc<ToolDispatcher>,
}

impl SheetsServer {
    pub fn new(dispatcher: Arc<ToolDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Server talking to the Sheets REST API described by `config`.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let factory = HttpSheetsFactory::new(&config.sheets_api_base, config.request_timeout())?;
        let connector = SheetsConnector::new(Arc::new(factory), config.client_cache_capacity);
        let dispatcher = ToolDispatcher::new(connector)
            .with_chart_window(config.chart_window)
            .with_enabled_tools(config.enabled_tools.clone());
        Ok(Self::new(Arc::new(dispatcher)))
    }

    /// Serves on stdin/stdout until the peer disconnects or a shutdown
    /// signal arrives.
    pub async fn run_stdio(self) -> Result<()> {
        let service = self
            .serve(stdio())
            .await
            .inspect_err(|error| tracing::error!("serving error: {:?}", error))?;

        let cancel = service.cancellation_token();
        tokio::spawn(async move {
            shutdown::wait_for_signal().await;
            tracing::info!("shutdown signal received, closing stdio transport");
            cancel.cancel();
        });

        let reason = service.waiting().await?;
        tracing::info!(?reason, "stdio transport closed");
        Ok(())
    }
}

impl ServerHandler for SheetsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..ServerInfo::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.dispatcher.list_tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.dispatcher.call(&request.name, request.arguments).await)
    }
}
