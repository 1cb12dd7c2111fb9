use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Search inputs as read from the query and pages fields at the moment of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub query: String,
    /// Passed through to the backend verbatim.
    pub pages: String,
}

/// One scraped listing. Field values are opaque scalars owned by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Row {
    #[serde(rename = "Preco", default)]
    pub preco: Value,
    #[serde(rename = "Negociavel", default)]
    pub negociavel: Value,
    #[serde(rename = "Data", default)]
    pub data: Value,
    #[serde(rename = "Localizacao", default)]
    pub localizacao: Value,
    #[serde(rename = "Link", default)]
    pub link: Value,
}

/// Aggregate summary over the returned rows. Any field may be missing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Stats {
    #[serde(default)]
    pub min: Option<Value>,
    #[serde(default)]
    pub max: Option<Value>,
    #[serde(default)]
    pub avg: Option<Value>,
    #[serde(default)]
    pub count: Option<Value>,
}

impl Stats {
    pub fn min_text(&self) -> String {
        placeholder_or(self.min.as_ref(), "-")
    }

    pub fn max_text(&self) -> String {
        placeholder_or(self.max.as_ref(), "-")
    }

    pub fn avg_text(&self) -> String {
        placeholder_or(self.avg.as_ref(), "-")
    }

    pub fn count_text(&self) -> String {
        placeholder_or(self.count.as_ref(), "0")
    }
}

/// Body of a successful `/scan` call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ScanResult {
    pub data: Vec<Row>,
    pub stats: Stats,
}

/// Export formats offered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    Csv,
    Xls,
}

impl ExportKind {
    /// Last path segment of the export endpoint.
    pub fn path_segment(self) -> &'static str {
        match self {
            ExportKind::Csv => "csv",
            ExportKind::Xls => "xls",
        }
    }

    /// Name the backend gives the attachment.
    pub fn default_file_name(self) -> &'static str {
        match self {
            ExportKind::Csv => "olx_price_scanner.csv",
            ExportKind::Xls => "olx_price_scanner.xlsx",
        }
    }
}

impl std::str::FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportKind::Csv),
            "xls" | "xlsx" => Ok(ExportKind::Xls),
            other => Err(format!("unknown export kind: {other} (expected csv or xls)")),
        }
    }
}

/// Render a JSON scalar the way a text sink shows it: strings unquoted, null as empty.
pub fn value_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn placeholder_or(v: Option<&Value>, placeholder: &str) -> String {
    match v {
        None | Some(Value::Null) => placeholder.to_string(),
        Some(v) => value_text(v),
    }
}
