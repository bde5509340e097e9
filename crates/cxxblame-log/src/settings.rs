use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default cap on how much build output one run will consume.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 64 * 1024 * 1024;

/// Knobs for [`ToolOutputParser`](crate::driver::ToolOutputParser).
///
/// Every field has a default, so a settings file only lists what it changes:
///
/// ```json
/// { "max_input_bytes": 1048576, "report_unhandled": false }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Input larger than this is rejected instead of parsed.
    pub max_input_bytes: usize,
    /// Report lines no parser recognises as simple messages.
    pub report_unhandled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            report_unhandled: true,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::debug!("Loaded settings from {:?}: {:?}", path, settings);
        Ok(settings)
    }
}
