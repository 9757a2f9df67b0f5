/// Prometheus metrics for tool calls and the client cache.
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;
use std::sync::Arc;
use std::time::Duration;

/// Global metrics registry instance
pub static METRICS: Lazy<Arc<MetricsCollector>> = Lazy::new(|| Arc::new(MetricsCollector::new()));

/// Labels for tool call metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    /// Tool name as requested by the caller
    pub tool: String,
    /// "success" or "error"
    pub status: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ErrorLabels {
    pub tool: String,
    /// `ToolError::kind` label
    pub error_type: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ToolLabels {
    pub tool: String,
}

pub struct MetricsCollector {
    registry: RwLock<Registry>,

    /// Total tool calls by tool and status
    pub mcp_requests_total: Family<RequestLabels, Counter>,

    /// Tool call duration in seconds by tool
    pub mcp_request_duration_seconds: Family<ToolLabels, Histogram>,

    /// Total errors by tool and error type
    pub mcp_errors_total: Family<ErrorLabels, Counter>,

    pub sheets_client_cache_hits_total: Counter,

    pub sheets_client_cache_misses_total: Counter,
}

impl MetricsCollector {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let mcp_requests_total = Family::<RequestLabels, Counter>::default();
        registry.register(
            "mcp_requests_total",
            "Total number of MCP tool calls",
            mcp_requests_total.clone(),
        );

        let mcp_request_duration_seconds =
            Family::<ToolLabels, Histogram>::new_with_constructor(|| {
                // 25ms .. ~50s; every call waits on at least one remote round trip
                Histogram::new(exponential_buckets(0.025, 2.5, 9))
            });
        registry.register(
            "mcp_request_duration_seconds",
            "Tool call latency histogram in seconds",
            mcp_request_duration_seconds.clone(),
        );

        let mcp_errors_total = Family::<ErrorLabels, Counter>::default();
        registry.register(
            "mcp_errors_total",
            "Total number of failed tool calls by error type",
            mcp_errors_total.clone(),
        );

        let sheets_client_cache_hits_total = Counter::default();
        registry.register(
            "sheets_client_cache_hits_total",
            "Tool calls served by a cached spreadsheet client",
            sheets_client_cache_hits_total.clone(),
        );

        let sheets_client_cache_misses_total = Counter::default();
        registry.register(
            "sheets_client_cache_misses_total",
            "Tool calls that had to build a spreadsheet client",
            sheets_client_cache_misses_total.clone(),
        );

        Self {
            registry: RwLock::new(registry),
            mcp_requests_total,
            mcp_request_duration_seconds,
            mcp_errors_total,
            sheets_client_cache_hits_total,
            sheets_client_cache_misses_total,
        }
    }

    /// Prometheus text exposition of every registered metric.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        let registry = self.registry.read();
        if let Err(e) = encode(&mut buffer, &registry) {
            tracing::error!("failed to encode metrics: {}", e);
        }
        buffer
    }

    pub fn record_request_success(&self, tool: &str, duration: Duration) {
        self.mcp_requests_total
            .get_or_create(&RequestLabels {
                tool: tool.to_string(),
                status: "success".to_string(),
            })
            .inc();
        self.observe_duration(tool, duration);
    }

    pub fn record_request_error(&self, tool: &str, duration: Duration, error_type: &str) {
        self.mcp_requests_total
            .get_or_create(&RequestLabels {
                tool: tool.to_string(),
                status: "error".to_string(),
            })
            .inc();
        self.observe_duration(tool, duration);
        self.mcp_errors_total
            .get_or_create(&ErrorLabels {
                tool: tool.to_string(),
                error_type: error_type.to_string(),
            })
            .inc();
    }

    pub fn record_client_cache_hit(&self) {
        self.sheets_client_cache_hits_total.inc();
    }

    pub fn record_client_cache_miss(&self) {
        self.sheets_client_cache_misses_total.inc();
    }

    fn observe_duration(&self, tool: &str, duration: Duration) {
        self.mcp_request_duration_seconds
            .get_or_create(&ToolLabels {
                tool: tool.to_string(),
            })
            .observe(duration.as_secs_f64());
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
