//! Static tool catalog.
//!
//! Input schemas are generated from the typed argument records, so the
//! advertised schema and the validation in [`crate::validation`] cannot
//! drift apart.

use super::{
    AddFormulaParams, CreateChartParams, CreateSheetParams, ExportCsvParams, GetDataParams,
    ToolName, ToolParams, UpdateCellsParams,
};
use once_cell::sync::Lazy;
use rmcp::model::{JsonObject, Tool};
use serde_json::Value;
use std::sync::Arc;
use strum::IntoEnumIterator;

#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: ToolName,
    pub description: &'static str,
    pub input_schema: Arc<JsonObject>,
}

impl ToolDescriptor {
    fn of<P: ToolParams>(name: ToolName, description: &'static str) -> Self {
        Self {
            name,
            description,
            input_schema: input_schema::<P>(),
        }
    }

    /// Field names listed under the schema's `required` key.
    pub fn required_fields(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|fields| fields.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn to_tool(&self) -> Tool {
        Tool::new(
            self.name.as_str(),
            self.description,
            self.input_schema.clone(),
        )
    }
}

static CATALOG: Lazy<Vec<ToolDescriptor>> = Lazy::new(|| {
    ToolName::iter()
        .map(|name| match name {
            ToolName::CreateSheet => ToolDescriptor::of::<CreateSheetParams>(
                name,
                "Create a new Google Spreadsheet",
            ),
            ToolName::GetData => {
                ToolDescriptor::of::<GetDataParams>(name, "Get data from a spreadsheet range")
            }
            ToolName::UpdateCells => {
                ToolDescriptor::of::<UpdateCellsParams>(name, "Update cells in a spreadsheet range")
            }
            ToolName::AddFormula => ToolDescriptor::of::<AddFormulaParams>(
                name,
                "Add a formula to a specific cell or range",
            ),
            ToolName::CreateChart => {
                ToolDescriptor::of::<CreateChartParams>(name, "Create a chart in the spreadsheet")
            }
            ToolName::ExportCsv => {
                ToolDescriptor::of::<ExportCsvParams>(name, "Export a sheet as CSV format")
            }
        })
        .collect()
});

/// Every tool, in catalog order. Built once per process.
pub fn catalog() -> &'static [ToolDescriptor] {
    &CATALOG
}

pub fn descriptor(name: ToolName) -> Option<&'static ToolDescriptor> {
    catalog().iter().find(|descriptor| descriptor.name == name)
}

fn input_schema<P: ToolParams>() -> Arc<JsonObject> {
    let schema = schemars::schema_for!(P);
    match serde_json::to_value(schema) {
        Ok(Value::Object(mut object)) => {
            object.remove("$schema");
            object.remove("title");
            Arc::new(object)
        }
        _ => {
            tracing::error!("schema for tool arguments is not a JSON object");
            Arc::new(JsonObject::new())
        }
    }
}
