//! Tool dispatch: name lookup, argument validation, client construction,
//! handler invocation and envelope rendering.

use crate::error::{ToolError, render_outcome};
use crate::metrics::METRICS;
use crate::sheets::{SheetsApi, SheetsConnector, SheetsError};
use crate::tools::chart::ChartWindow;
use crate::tools::registry::{self, ToolDescriptor};
use crate::tools::{self, ToolName, ToolParams};
use crate::validation::parse_arguments;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Metrics label for calls whose name is not in the catalog.
pub const UNKNOWN_TOOL_LABEL: &str = "unknown";

pub struct ToolDispatcher {
    connector: SheetsConnector,
    chart_window: ChartWindow,
    enabled_tools: Option<HashSet<String>>,
}

impl ToolDispatcher {
    pub fn new(connector: SheetsConnector) -> Self {
        Self {
            connector,
            chart_window: ChartWindow::FIXED,
            enabled_tools: None,
        }
    }

    pub fn with_chart_window(mut self, window: ChartWindow) -> Self {
        self.chart_window = window;
        self
    }

    /// Restricts calls and listings to the named tools. Names are matched
    /// case-insensitively.
    pub fn with_enabled_tools(mut self, tools: Option<HashSet<String>>) -> Self {
        self.enabled_tools = tools.map(|set| {
            set.into_iter()
                .map(|tool| tool.to_ascii_lowercase())
                .collect()
        });
        self
    }

    pub fn is_tool_enabled(&self, tool: ToolName) -> bool {
        match &self.enabled_tools {
            Some(set) => set.contains(tool.as_str()),
            None => true,
        }
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &'static ToolDescriptor> + '_ {
        registry::catalog()
            .iter()
            .filter(|descriptor| self.is_tool_enabled(descriptor.name))
    }

    pub fn list_tools(&self) -> Vec<Tool> {
        self.descriptors().map(ToolDescriptor::to_tool).collect()
    }

    /// Runs one tool call and wraps the outcome in the single-text-block
    /// envelope. Failures become `Error: ...` text, never a protocol error.
    pub async fn call(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("mcp_tool", mcp.tool = name, %request_id);

        // caller-chosen names never become label values
        let label = name
            .parse::<ToolName>()
            .map(ToolName::as_str)
            .unwrap_or(UNKNOWN_TOOL_LABEL);

        let started = Instant::now();
        let outcome = self.execute(name, arguments).instrument(span.clone()).await;
        let elapsed = started.elapsed();

        let _entered = span.enter();
        match &outcome {
            Ok(_) => {
                METRICS.record_request_success(label, elapsed);
                tracing::info!(
                    duration_ms = elapsed.as_millis() as u64,
                    "tool call succeeded"
                );
            }
            Err(error) => {
                METRICS.record_request_error(label, elapsed, error.kind());
                if error.is_client_error() {
                    tracing::info!(
                        error.kind = error.kind(),
                        duration_ms = elapsed.as_millis() as u64,
                        "tool call rejected: {}",
                        error
                    );
                } else {
                    tracing::warn!(
                        error.kind = error.kind(),
                        remote_status = ?error_status(error),
                        duration_ms = elapsed.as_millis() as u64,
                        "tool call failed: {}",
                        error
                    );
                }
            }
        }

        CallToolResult::success(vec![Content::text(render_outcome(&outcome))])
    }

    /// Runs one tool call and returns the pretty-printed response body.
    pub async fn execute(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<String, ToolError> {
        let tool: ToolName = name
            .parse()
            .map_err(|_| ToolError::UnknownTool(name.to_string()))?;
        if !self.is_tool_enabled(tool) {
            return Err(ToolError::ToolDisabled(tool.to_string()));
        }

        match tool {
            ToolName::CreateSheet => self.run(tool, arguments, tools::create_sheet).await,
            ToolName::GetData => self.run(tool, arguments, tools::get_data).await,
            ToolName::UpdateCells => self.run(tool, arguments, tools::update_cells).await,
            ToolName::AddFormula => self.run(tool, arguments, tools::add_formula).await,
            ToolName::CreateChart => {
                let window = self.chart_window;
                self.run(tool, arguments, move |client, params| {
                    tools::create_chart(client, params, window)
                })
                .await
            }
            ToolName::ExportCsv => self.run(tool, arguments, tools::export_csv).await,
        }
    }

    async fn run<P, R, F, Fut>(
        &self,
        tool: ToolName,
        arguments: Option<JsonObject>,
        handler: F,
    ) -> Result<String, ToolError>
    where
        P: ToolParams,
        R: Serialize,
        F: FnOnce(Arc<dyn SheetsApi>, P) -> Fut,
        Fut: Future<Output = Result<R, SheetsError>>,
    {
        let params: P = parse_arguments(tool, arguments)?;
        let client = self.connector.client_for(params.credentials())?;
        let response = handler(client, params).await?;
        serde_json::to_string_pretty(&response).map_err(ToolError::Encode)
    }
}

fn error_status(error: &ToolError) -> Option<u16> {
    match error {
        ToolError::Remote(remote) => remote.status(),
        _ => None,
    }
}
