//! Output formatting for run summaries
//!
//! This module provides formatters for the pipeline's run summary in JSON
//! (machine-readable) and human-readable text.

use anyhow::{Context, Result};

use crate::pipeline::RunSummary;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// Human-readable formatted text
    Human,
}

/// Output formatter for run summaries
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    /// Creates a new output formatter with the specified format
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a run summary according to the configured format
    pub fn format(&self, summary: &RunSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(summary).context("Failed to serialize run summary")
            }
            OutputFormat::Human => Ok(self.format_human(summary)),
        }
    }

    fn format_human(&self, summary: &RunSummary) -> String {
        let mut out = String::new();
        out.push_str("Build complete\n");
        out.push_str(&format!("  Platform:    {}\n", summary.platform));
        out.push_str(&format!(
            "  Provisioned: {}\n",
            if summary.provisioned {
                "yes (dependencies installed)"
            } else {
                "no (dependency tree reused)"
            }
        ));
        out.push_str(&format!(
            "  Artifact:    {}\n",
            summary.artifact_path.display()
        ));
        out.push_str(&format!("  Duration:    {} ms\n", summary.duration_ms));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PlatformTarget;
    use std::path::PathBuf;

    fn sample_summary() -> RunSummary {
        RunSummary {
            platform: PlatformTarget::Mac,
            provisioned: true,
            artifact_path: PathBuf::from("/work/project/out"),
            duration_ms: 1234,
        }
    }

    #[test]
    fn test_human_format_contains_fields() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter.format(&sample_summary()).unwrap();
        assert!(output.contains("mac"));
        assert!(output.contains("dependencies installed"));
        assert!(output.contains("/work/project/out"));
        assert!(output.contains("1234"));
    }

    #[test]
    fn test_json_format_round_trips() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format(&sample_summary()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["platform"], "mac");
        assert_eq!(value["provisioned"], true);
        assert_eq!(value["duration_ms"], 1234);
    }
}
