pub mod chart;
pub mod registry;

use crate::sheets::SheetsApi;
use crate::sheets::SheetsError;
use crate::sheets::model::ValueInputOption;
use crate::validation::{
    ValidationResult, validate_grid, validate_non_empty_string, validate_sheet_id,
};
use chart::ChartWindow;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Sheet title used by `export_csv` when the requested sheet id is not in
/// the spreadsheet metadata.
pub const FALLBACK_SHEET_TITLE: &str = "Sheet1";

/// Names of the catalogued tools, in catalog order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ToolName {
    CreateSheet,
    GetData,
    UpdateCells,
    AddFormula,
    CreateChart,
    ExportCsv,
}

impl ToolName {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Typed argument record of one tool.
pub trait ToolParams: DeserializeOwned + JsonSchema + Send + 'static {
    /// The raw credential blob supplied with the call.
    fn credentials(&self) -> &str;

    fn validate(&self) -> ValidationResult<()>;
}

// ---------------------------------------------------------------------------
// create_sheet

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSheetParams {
    /// Title of the new spreadsheet
    pub title: String,
    /// JSON string containing OAuth2 credentials
    pub credentials: String,
}

impl ToolParams for CreateSheetParams {
    fn credentials(&self) -> &str {
        &self.credentials
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_non_empty_string("title", &self.title)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSheetResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_url: Option<String>,
    pub title: String,
}

pub async fn create_sheet(
    client: Arc<dyn SheetsApi>,
    params: CreateSheetParams,
) -> Result<CreateSheetResponse, SheetsError> {
    let created = client.create_spreadsheet(&params.title).await?;
    Ok(CreateSheetResponse {
        spreadsheet_id: created.spreadsheet_id,
        spreadsheet_url: created.spreadsheet_url,
        title: params.title,
    })
}

// ---------------------------------------------------------------------------
// get_data

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetDataParams {
    /// ID of the spreadsheet
    pub spreadsheet_id: String,
    /// A1 notation range (e.g., 'Sheet1!A1:D10')
    pub range: String,
    /// JSON string containing OAuth2 credentials
    pub credentials: String,
}

impl ToolParams for GetDataParams {
    fn credentials(&self) -> &str {
        &self.credentials
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_non_empty_string("spreadsheetId", &self.spreadsheet_id)?;
        validate_non_empty_string("range", &self.range)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDataResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    pub values: Vec<Vec<Value>>,
    pub row_count: usize,
}

pub async fn get_data(
    client: Arc<dyn SheetsApi>,
    params: GetDataParams,
) -> Result<GetDataResponse, SheetsError> {
    let response = client
        .get_values(&params.spreadsheet_id, &params.range)
        .await?;
    let values = response.values.unwrap_or_default();
    Ok(GetDataResponse {
        range: response.range,
        row_count: values.len(),
        values,
    })
}

// ---------------------------------------------------------------------------
// update_cells

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCellsParams {
    /// ID of the spreadsheet
    pub spreadsheet_id: String,
    /// A1 notation range (e.g., 'Sheet1!A1:D10')
    pub range: String,
    /// 2D array of values to update
    pub values: Vec<Vec<String>>,
    /// JSON string containing OAuth2 credentials
    pub credentials: String,
}

impl ToolParams for UpdateCellsParams {
    fn credentials(&self) -> &str {
        &self.credentials
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_non_empty_string("spreadsheetId", &self.spreadsheet_id)?;
        validate_non_empty_string("range", &self.range)?;
        validate_grid("values", &self.values)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCellsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_rows: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_columns: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_cells: Option<i64>,
}

pub async fn update_cells(
    client: Arc<dyn SheetsApi>,
    params: UpdateCellsParams,
) -> Result<UpdateCellsResponse, SheetsError> {
    let response = client
        .update_values(
            &params.spreadsheet_id,
            &params.range,
            params.values,
            ValueInputOption::UserEntered,
        )
        .await?;
    Ok(UpdateCellsResponse {
        updated_range: response.updated_range,
        updated_rows: response.updated_rows,
        updated_columns: response.updated_columns,
        updated_cells: response.updated_cells,
    })
}

// ---------------------------------------------------------------------------
// add_formula

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddFormulaParams {
    /// ID of the spreadsheet
    pub spreadsheet_id: String,
    /// A1 notation range (e.g., 'Sheet1!A1')
    pub range: String,
    /// Formula to add (e.g., '=SUM(A1:A10)')
    pub formula: String,
    /// JSON string containing OAuth2 credentials
    pub credentials: String,
}

impl ToolParams for AddFormulaParams {
    fn credentials(&self) -> &str {
        &self.credentials
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_non_empty_string("spreadsheetId", &self.spreadsheet_id)?;
        validate_non_empty_string("range", &self.range)?;
        validate_non_empty_string("formula", &self.formula)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFormulaResponse {
    pub formula: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    pub success: bool,
}

/// Writes a 1x1 payload. For a multi-cell range the service places it at
/// the range's top-left cell.
pub async fn add_formula(
    client: Arc<dyn SheetsApi>,
    params: AddFormulaParams,
) -> Result<AddFormulaResponse, SheetsError> {
    let response = client
        .update_values(
            &params.spreadsheet_id,
            &params.range,
            vec![vec![params.formula.clone()]],
            ValueInputOption::UserEntered,
        )
        .await?;
    Ok(AddFormulaResponse {
        formula: params.formula,
        range: response.updated_range,
        success: true,
    })
}

// ---------------------------------------------------------------------------
// create_chart

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChartParams {
    /// ID of the spreadsheet
    pub spreadsheet_id: String,
    /// ID of the sheet to add the chart to
    pub sheet_id: i64,
    /// Type of chart (COLUMN, LINE, PIE, BAR, etc.)
    pub chart_type: String,
    /// A1 notation range for chart data
    pub source_range: String,
    /// JSON string containing OAuth2 credentials
    pub credentials: String,
}

impl ToolParams for CreateChartParams {
    fn credentials(&self) -> &str {
        &self.credentials
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_non_empty_string("spreadsheetId", &self.spreadsheet_id)?;
        validate_sheet_id("sheetId", self.sheet_id)?;
        validate_non_empty_string("chartType", &self.chart_type)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChartResponse {
    pub chart_type: String,
    pub success: bool,
    pub spreadsheet_id: String,
}

pub async fn create_chart(
    client: Arc<dyn SheetsApi>,
    params: CreateChartParams,
    window: ChartWindow,
) -> Result<CreateChartResponse, SheetsError> {
    debug!(
        source_range = %params.source_range,
        rows = window.rows,
        "sourceRange is not used; charting the configured window"
    );
    let request = chart::add_chart_request(params.sheet_id, &params.chart_type, window);
    client
        .batch_update(&params.spreadsheet_id, vec![request])
        .await?;
    Ok(CreateChartResponse {
        chart_type: params.chart_type,
        success: true,
        spreadsheet_id: params.spreadsheet_id,
    })
}

// ---------------------------------------------------------------------------
// export_csv

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportCsvParams {
    /// ID of the spreadsheet
    pub spreadsheet_id: String,
    /// ID of the sheet to export
    pub sheet_id: i64,
    /// JSON string containing OAuth2 credentials
    pub credentials: String,
}

impl ToolParams for ExportCsvParams {
    fn credentials(&self) -> &str {
        &self.credentials
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_non_empty_string("spreadsheetId", &self.spreadsheet_id)?;
        validate_sheet_id("sheetId", self.sheet_id)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportCsvResponse {
    pub csv: String,
    pub row_count: usize,
    pub sheet_title: String,
}

pub async fn export_csv(
    client: Arc<dyn SheetsApi>,
    params: ExportCsvParams,
) -> Result<ExportCsvResponse, SheetsError> {
    let metadata = client.get_spreadsheet(&params.spreadsheet_id).await?;
    let sheet_title = metadata
        .sheet_title(params.sheet_id)
        .filter(|title| !title.is_empty())
        .unwrap_or(FALLBACK_SHEET_TITLE)
        .to_string();

    let data = client
        .get_values(&params.spreadsheet_id, &sheet_title)
        .await?;
    let values = data.values.unwrap_or_default();

    Ok(ExportCsvResponse {
        csv: rows_to_csv(&values),
        row_count: values.len(),
        sheet_title,
    })
}

/// Joins cells with `,` and rows with `\n`. Cells are not quoted or
/// escaped, so embedded commas, quotes and newlines pass through as-is.
pub fn rows_to_csv(rows: &[Vec<Value>]) -> String {
    rows.iter()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>().join(","))
        .collect::<Vec<_>>()
        .join("\n")
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
