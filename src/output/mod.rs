mod cli;
mod json;

pub use cli::{print_cli_table, render_table};
pub use json::{print_json, render_json};

use crate::model::ScanResult;
use anyhow::Result;

/// Output format for scan results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format for programmatic use
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'table' or 'json'", s)),
        }
    }
}

pub fn print_result(result: &ScanResult, format: OutputFormat, show_locations: bool) -> Result<()> {
    match format {
        OutputFormat::Table => print_cli_table(result, show_locations),
        OutputFormat::Json => print_json(result),
    }
}

/// Format result to string for file output
pub fn format_result_to_string(
    result: &ScanResult,
    format: OutputFormat,
    show_locations: bool,
) -> Result<String> {
    match format {
        OutputFormat::Json => render_json(result),
        OutputFormat::Table => render_table(result, show_locations),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_format() {
        assert_eq!("table".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_result_to_string_json() {
        let out = format_result_to_string(&ScanResult::new(), OutputFormat::Json, true).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(json["package_results"].as_array().unwrap().is_empty());
    }
}
