use serde::{Deserialize, Serialize};

/// Tool settings from `red-settings.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RedSettings {
    #[serde(rename = "RED_Settings", default)]
    pub red_settings: GeneralSettings,

    #[serde(rename = "RED_Logging", default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Root against which workspace-relative library paths are resolved.
    #[serde(rename = "Workspace Root", default)]
    pub workspace_root: String,

    #[serde(rename = "Indent Width", default = "default_indent_width")]
    pub indent_width: usize,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            workspace_root: String::new(),
            indent_width: default_indent_width(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(rename = "Log Directory", default = "default_log_dir")]
    pub log_dir: String,

    #[serde(rename = "Log Prefix", default = "default_log_prefix")]
    pub log_prefix: String,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,

    #[serde(rename = "Console Output", default)]
    pub console_output: bool,

    #[serde(rename = "JSON Format", default)]
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            debug_mode: false,
            console_output: false,
            json_format: false,
        }
    }
}

fn default_indent_width() -> usize {
    4
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_prefix() -> String {
    "redxml".to_string()
}

impl RedSettings {
    /// Configured workspace root, if any.
    pub fn workspace_root(&self) -> Option<&str> {
        let root = self.red_settings.workspace_root.trim();
        (!root.is_empty()).then_some(root)
    }
}
