//! This module assembles the summary of a run and writes it to disk.

use crate::types::{ControlState, SimulatorError};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// The summary of the latest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// The original input string.
    pub input: String,
    /// Display name of the selected pattern.
    pub pattern_name: String,
    /// Transitions executed so far.
    pub steps: usize,
    /// Control state at the time of the report.
    pub final_state: ControlState,
    /// The verdict, `None` if the run has not been evaluated yet.
    pub accepted: Option<bool>,
}

impl Report {
    /// Renders the report as plain text lines.
    pub fn lines(&self) -> Vec<String> {
        let accepted = match self.accepted {
            Some(true) => "true",
            Some(false) => "false",
            None => "pending",
        };

        vec![
            "TURING MACHINE SIMULATOR REPORT".to_string(),
            String::new(),
            format!("Input: {}", self.input),
            format!("Pattern: {}", self.pattern_name),
            format!("Steps executed: {}", self.steps),
            format!("Final state: {}", self.final_state),
            format!("Accepted: {}", accepted),
        ]
    }

    /// Renders the report as pretty printed JSON.
    pub fn to_json(&self) -> Result<String, SimulatorError> {
        serde_json::to_string_pretty(self).map_err(|e| SimulatorError::Export(e.to_string()))
    }

    /// Writes the text rendering, UTF-8 encoded, to `dir/file_name`.
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` with the path of the written file.
    /// * `Err(SimulatorError::Export)` if the file cannot be written.
    pub fn export(&self, dir: &Path, file_name: &str) -> Result<PathBuf, SimulatorError> {
        let path = dir.join(file_name);
        fs::write(&path, self.to_string()).map_err(|e| {
            SimulatorError::Export(format!("Failed to write {}: {}", path.display(), e))
        })?;

        info!(path = %path.display(), "report exported");
        Ok(path)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))?;
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn report() -> Report {
        Report {
            input: "abb".to_string(),
            pattern_name: "(a|b)*abb".to_string(),
            steps: 5,
            final_state: ControlState::Final,
            accepted: Some(true),
        }
    }

    #[test]
    fn test_lines() {
        let lines = report().lines();

        assert_eq!(lines[0], "TURING MACHINE SIMULATOR REPORT");
        assert!(lines.contains(&"Input: abb".to_string()));
        assert!(lines.contains(&"Pattern: (a|b)*abb".to_string()));
        assert!(lines.contains(&"Steps executed: 5".to_string()));
        assert!(lines.contains(&"Final state: q_final".to_string()));
        assert!(lines.contains(&"Accepted: true".to_string()));
    }

    #[test]
    fn test_pending_verdict() {
        let report = Report {
            accepted: None,
            ..report()
        };

        assert!(report.to_string().contains("Accepted: pending"));
    }

    #[test]
    fn test_json() {
        let json = report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["input"], "abb");
        assert_eq!(value["steps"], 5);
        assert_eq!(value["final_state"], "Final");
        assert_eq!(value["accepted"], true);
    }

    #[test]
    fn test_export_writes_utf8_file() {
        let dir = tempdir().unwrap();
        let report = Report {
            input: "ñandú".to_string(),
            ..report()
        };

        let path = report.export(dir.path(), "report.txt").unwrap();
        let content = fs::read_to_string(&path).unwrap();

        assert_eq!(path, dir.path().join("report.txt"));
        assert!(content.contains("Input: ñandú"));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_export_failure_is_reported() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let result = report().export(&missing, "report.txt");

        assert!(matches!(result, Err(SimulatorError::Export(_))));
    }
}
