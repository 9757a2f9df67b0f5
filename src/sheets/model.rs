//! Wire types for the subset of the Sheets v4 REST API this server uses.
//!
//! Response types deserialize leniently: every field the API may omit is an
//! `Option` or defaulted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<SpreadsheetProperties>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<SheetProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Spreadsheet {
    /// Title of the sheet with the given id, if the metadata lists one.
    pub fn sheet_title(&self, sheet_id: i64) -> Option<&str> {
        self.sheets
            .iter()
            .filter_map(|sheet| sheet.properties.as_ref())
            .find(|props| props.sheet_id == Some(sheet_id))
            .and_then(|props| props.title.as_deref())
    }
}

/// Cell values are usually strings (formatted values), but the API may hand
/// back numbers or booleans, so cells stay untyped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Vec<Value>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_rows: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_columns: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_cells: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputOption {
    /// Values are stored as-is.
    Raw,
    /// Values are parsed as if typed into the UI: `=` starts a formula,
    /// numeric strings become numbers.
    UserEntered,
}

/// One mutation inside a `batchUpdate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    AddChart(AddChartRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateRequest {
    pub requests: Vec<Request>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChartRequest {
    pub chart: EmbeddedChart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedChart {
    pub spec: ChartSpec,
    pub position: EmbeddedObjectPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub title: String,
    pub basic_chart: BasicChartSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicChartSpec {
    pub chart_type: String,
    pub legend_position: String,
    pub axis: Vec<BasicChartAxis>,
    pub domains: Vec<BasicChartDomain>,
    pub series: Vec<BasicChartSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicChartAxis {
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicChartDomain {
    pub domain: ChartData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicChartSeries {
    pub series: ChartData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub source_range: ChartSourceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSourceRange {
    pub sources: Vec<GridRange>,
}

/// Half-open row/column span on one sheet, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    pub sheet_id: i64,
    pub start_row_index: u32,
    pub end_row_index: u32,
    pub start_column_index: u32,
    pub end_column_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedObjectPosition {
    pub overlay_position: OverlayPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPosition {
    pub anchor_cell: GridCoordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCoordinate {
    pub sheet_id: i64,
    pub row_index: u32,
    pub column_index: u32,
}

/// Error body returned by Google APIs on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sheet_title_lookup() {
        let spreadsheet: Spreadsheet = serde_json::from_value(json!({
            "spreadsheetId": "abc",
            "sheets": [
                {"properties": {"sheetId": 0, "title": "Sheet1"}},
                {"properties": {"sheetId": 42, "title": "Budget"}}
            ]
        }))
        .unwrap();

        assert_eq!(spreadsheet.sheet_title(42), Some("Budget"));
        assert_eq!(spreadsheet.sheet_title(7), None);
    }

    #[test]
    fn test_add_chart_request_is_externally_tagged() {
        let request = Request::AddChart(AddChartRequest {
            chart: EmbeddedChart {
                spec: ChartSpec {
                    title: "Chart".into(),
                    basic_chart: BasicChartSpec {
                        chart_type: "LINE".into(),
                        legend_position: "BOTTOM_LEGEND".into(),
                        axis: vec![],
                        domains: vec![],
                        series: vec![],
                    },
                },
                position: EmbeddedObjectPosition {
                    overlay_position: OverlayPosition {
                        anchor_cell: GridCoordinate {
                            sheet_id: 1,
                            row_index: 0,
                            column_index: 3,
                        },
                    },
                },
            },
        });

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["addChart"]["chart"]["spec"]["basicChart"]["chartType"], "LINE");
        assert_eq!(
            value["addChart"]["chart"]["position"]["overlayPosition"]["anchorCell"]["columnIndex"],
            3
        );
    }

    #[test]
    fn test_value_input_option_wire_name() {
        assert_eq!(ValueInputOption::UserEntered.as_ref(), "USER_ENTERED");
        assert_eq!(
            serde_json::to_value(ValueInputOption::Raw).unwrap(),
            json!("RAW")
        );
    }
}
