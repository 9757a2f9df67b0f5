use crate::sheets::DEFAULT_API_BASE;
use crate::tools::ToolName;
use crate::tools::chart::ChartWindow;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const MAX_CLIENT_CACHE_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[value(alias = "stream-http", alias = "stream_http")]
    #[serde(alias = "stream-http", alias = "stream_http")]
    Http,
    Stdio,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Http => write!(f, "http"),
            TransportKind::Stdio => write!(f, "stdio"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub transport: TransportKind,
    pub http_bind_address: SocketAddr,
    /// Base URL of the Sheets v4 REST API, ending in `/`
    pub sheets_api_base: String,
    pub enabled_tools: Option<HashSet<String>>,
    /// 0 builds a fresh client for every call
    pub client_cache_capacity: usize,
    pub request_timeout_secs: Option<u64>,
    pub chart_window: ChartWindow,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Stdio,
            http_bind_address: default_bind_address(),
            sheets_api_base: DEFAULT_API_BASE.to_string(),
            enabled_tools: None,
            client_cache_capacity: 0,
            request_timeout_secs: None,
            chart_window: ChartWindow::FIXED,
        }
    }
}

impl ServerConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            transport: cli_transport,
            http_bind: cli_http_bind,
            sheets_api_base: cli_api_base,
            enabled_tools: cli_enabled_tools,
            client_cache_capacity: cli_cache_capacity,
            request_timeout_secs: cli_timeout,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            transport: file_transport,
            http_bind: file_http_bind,
            sheets_api_base: file_api_base,
            enabled_tools: file_enabled_tools,
            client_cache_capacity: file_cache_capacity,
            request_timeout_secs: file_timeout,
            chart_window: file_chart_window,
        } = file_config;

        let defaults = Self::default();

        let enabled_tools = cli_enabled_tools
            .or(file_enabled_tools)
            .map(|tools| {
                tools
                    .into_iter()
                    .map(|tool| tool.trim().to_ascii_lowercase())
                    .filter(|tool| !tool.is_empty())
                    .collect::<HashSet<_>>()
            })
            .filter(|set| !set.is_empty());

        Ok(Self {
            transport: cli_transport.or(file_transport).unwrap_or(defaults.transport),
            http_bind_address: cli_http_bind
                .or(file_http_bind)
                .unwrap_or(defaults.http_bind_address),
            sheets_api_base: cli_api_base
                .or(file_api_base)
                .unwrap_or(defaults.sheets_api_base),
            enabled_tools,
            client_cache_capacity: cli_cache_capacity
                .or(file_cache_capacity)
                .unwrap_or(defaults.client_cache_capacity),
            request_timeout_secs: cli_timeout.or(file_timeout),
            chart_window: file_chart_window.unwrap_or(defaults.chart_window),
        })
    }

    /// Fail-fast checks run before the server starts.
    pub fn validate(&self) -> Result<()> {
        let base = reqwest::Url::parse(&self.sheets_api_base)
            .with_context(|| format!("invalid sheets API base URL {:?}", self.sheets_api_base))?;
        anyhow::ensure!(
            matches!(base.scheme(), "http" | "https"),
            "sheets API base URL must be http or https, got {:?}",
            base.scheme()
        );

        if let Some(tools) = &self.enabled_tools {
            for tool in tools {
                anyhow::ensure!(
                    ToolName::from_str(tool).is_ok(),
                    "unknown tool {:?} in enabled tools",
                    tool
                );
            }
        }

        anyhow::ensure!(
            self.client_cache_capacity <= MAX_CLIENT_CACHE_CAPACITY,
            "client cache capacity {} exceeds maximum {}",
            self.client_cache_capacity,
            MAX_CLIENT_CACHE_CAPACITY
        );

        if let Some(timeout) = self.request_timeout_secs {
            anyhow::ensure!(timeout > 0, "request timeout must be at least one second");
        }

        let window = &self.chart_window;
        anyhow::ensure!(window.rows > 0, "chart window must span at least one row");
        anyhow::ensure!(
            window.domain_column != window.series_column,
            "chart domain and series columns must differ"
        );

        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8079))
}

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "sheets-wizard", about = "Google Sheets MCP server", version)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "SHEETS_WIZARD_TRANSPORT",
        value_enum,
        value_name = "TRANSPORT",
        help = "Transport to expose (stdio or http)"
    )]
    pub transport: Option<TransportKind>,

    #[arg(
        long,
        env = "SHEETS_WIZARD_HTTP_BIND",
        value_name = "ADDR",
        help = "HTTP bind address when using http transport [default: 127.0.0.1:8079]"
    )]
    pub http_bind: Option<SocketAddr>,

    #[arg(
        long,
        env = "SHEETS_WIZARD_API_BASE",
        value_name = "URL",
        help = "Base URL of the Sheets v4 REST API"
    )]
    pub sheets_api_base: Option<String>,

    #[arg(
        long,
        env = "SHEETS_WIZARD_ENABLED_TOOLS",
        value_name = "TOOL",
        value_delimiter = ',',
        help = "Restrict listing and execution to the provided tool names"
    )]
    pub enabled_tools: Option<Vec<String>>,

    #[arg(
        long,
        env = "SHEETS_WIZARD_CLIENT_CACHE",
        value_name = "N",
        help = "Keep up to N authenticated clients between calls (0 disables)",
        value_parser = clap::value_parser!(usize)
    )]
    pub client_cache_capacity: Option<usize>,

    #[arg(
        long,
        env = "SHEETS_WIZARD_REQUEST_TIMEOUT",
        value_name = "SECS",
        help = "Timeout for each request to the Sheets API (none by default)",
        value_parser = clap::value_parser!(u64)
    )]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    transport: Option<TransportKind>,
    http_bind: Option<SocketAddr>,
    sheets_api_base: Option<String>,
    enabled_tools: Option<Vec<String>>,
    client_cache_capacity: Option<usize>,
    request_timeout_secs: Option<u64>,
    chart_window: Option<ChartWindow>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
