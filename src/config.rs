//! Run settings for the simulator.

use crate::types::{DEFAULT_AUTO_INTERVAL_MS, DEFAULT_PADDING, REPORT_FILE_NAME};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::warn;

/// Settings applied by the run controller to every run it prepares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Blank cells added to each side of the input. Never less than one.
    #[serde(deserialize_with = "deserialize_padding")]
    pub padding: usize,
    /// Delay between two automatic steps.
    pub auto_interval: Duration,
    /// File name used when exporting a report.
    pub report_file_name: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            auto_interval: Duration::from_millis(DEFAULT_AUTO_INTERVAL_MS),
            report_file_name: REPORT_FILE_NAME.to_string(),
        }
    }
}

impl SimulatorConfig {
    /// Sets the tape padding. A padding of zero is raised to one so a blank is always reachable.
    pub fn with_padding(mut self, padding: usize) -> Self {
        if padding == 0 {
            warn!("tape padding must be at least 1; using 1");
        }
        self.padding = padding.max(1);
        self
    }

    /// Sets the delay between two automatic steps.
    pub fn with_auto_interval(mut self, interval: Duration) -> Self {
        self.auto_interval = interval;
        self
    }

    /// Sets the file name used by report exports.
    pub fn with_report_file_name(mut self, name: impl Into<String>) -> Self {
        self.report_file_name = name.into();
        self
    }
}

fn deserialize_padding<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let padding = usize::deserialize(deserializer)?;
    if padding == 0 {
        warn!("tape padding must be at least 1; using 1");
    }
    Ok(padding.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulatorConfig::default();

        assert_eq!(config.padding, 20);
        assert_eq!(config.auto_interval, Duration::from_millis(400));
        assert_eq!(config.report_file_name, "turing_simulator_report.txt");
    }

    #[test]
    fn test_zero_padding_is_clamped() {
        assert_eq!(SimulatorConfig::default().with_padding(0).padding, 1);
        assert_eq!(SimulatorConfig::default().with_padding(3).padding, 3);
    }

    #[test]
    fn test_deserialized_zero_padding_is_clamped() {
        let config: SimulatorConfig = serde_json::from_str(r#"{"padding": 0}"#).unwrap();

        assert_eq!(config.padding, 1);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: SimulatorConfig = serde_json::from_str(r#"{"padding": 5}"#).unwrap();

        assert_eq!(config.padding, 5);
        assert_eq!(config.auto_interval, Duration::from_millis(400));
    }
}
