//! `addChart` construction for the `create_chart` tool.
//!
//! The chart never reads the caller's `sourceRange`. Its data comes from a
//! fixed window on the target sheet: categories in one column, a single
//! series in the next, the same number of rows for both. That window is
//! [`ChartWindow::FIXED`]; deployments that want a different window set it
//! in the config file rather than editing this module.

use crate::sheets::model::{
    AddChartRequest, BasicChartAxis, BasicChartDomain, BasicChartSeries, BasicChartSpec,
    ChartData, ChartSourceRange, ChartSpec, EmbeddedChart, EmbeddedObjectPosition, GridCoordinate,
    GridRange, OverlayPosition, Request,
};
use serde::{Deserialize, Serialize};

pub const CHART_TITLE: &str = "Chart";
pub const LEGEND_POSITION: &str = "BOTTOM_LEGEND";
pub const AXIS_POSITIONS: [&str; 2] = ["BOTTOM_AXIS", "LEFT_AXIS"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartWindow {
    /// Rows read from the top of the sheet, starting at row 0
    pub rows: u32,
    pub domain_column: u32,
    pub series_column: u32,
    pub anchor_row: u32,
    pub anchor_column: u32,
}

impl ChartWindow {
    /// Rows 0..10: categories in column A, values in column B, chart
    /// anchored at D1.
    pub const FIXED: ChartWindow = ChartWindow {
        rows: 10,
        domain_column: 0,
        series_column: 1,
        anchor_row: 0,
        anchor_column: 3,
    };

    pub fn domain(&self, sheet_id: i64) -> GridRange {
        self.column_span(sheet_id, self.domain_column)
    }

    pub fn series(&self, sheet_id: i64) -> GridRange {
        self.column_span(sheet_id, self.series_column)
    }

    pub fn anchor(&self, sheet_id: i64) -> GridCoordinate {
        GridCoordinate {
            sheet_id,
            row_index: self.anchor_row,
            column_index: self.anchor_column,
        }
    }

    fn column_span(&self, sheet_id: i64, column: u32) -> GridRange {
        GridRange {
            sheet_id,
            start_row_index: 0,
            end_row_index: self.rows,
            start_column_index: column,
            end_column_index: column + 1,
        }
    }
}

impl Default for ChartWindow {
    fn default() -> Self {
        Self::FIXED
    }
}

/// Single `addChart` mutation. `chart_type` is forwarded verbatim; both axes
/// are always present, whatever the chart type.
pub fn add_chart_request(sheet_id: i64, chart_type: &str, window: ChartWindow) -> Request {
    let basic_chart = BasicChartSpec {
        chart_type: chart_type.to_string(),
        legend_position: LEGEND_POSITION.to_string(),
        axis: AXIS_POSITIONS
            .iter()
            .map(|position| BasicChartAxis {
                position: (*position).to_string(),
            })
            .collect(),
        domains: vec![BasicChartDomain {
            domain: ChartData {
                source_range: ChartSourceRange {
                    sources: vec![window.domain(sheet_id)],
                },
            },
        }],
        series: vec![BasicChartSeries {
            series: ChartData {
                source_range: ChartSourceRange {
                    sources: vec![window.series(sheet_id)],
                },
            },
        }],
    };

    Request::AddChart(AddChartRequest {
        chart: EmbeddedChart {
            spec: ChartSpec {
                title: CHART_TITLE.to_string(),
                basic_chart,
            },
            position: EmbeddedObjectPosition {
                overlay_position: OverlayPosition {
                    anchor_cell: window.anchor(sheet_id),
                },
            },
        },
    })
}
