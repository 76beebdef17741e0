use serde::Deserialize;
use tjls_core::{AnalysisOptions, WorkspaceOptions};
use tower_lsp::lsp_types::ConfigurationItem;

use crate::analyzer::{DEFAULT_MAX_DIAGNOSTICS, TjAnalyzer};

use super::state::TjLanguageServer;

pub(crate) const CONFIG_SECTION: &str = "taskjuggler";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ServerConfig {
    pub(crate) debounce_ms: u64,
    pub(crate) max_diagnostics: usize,
    pub(crate) analysis: AnalysisOptions,
    pub(crate) workspace: WorkspaceOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
            analysis: AnalysisOptions::default(),
            workspace: WorkspaceOptions::default(),
        }
    }
}

impl ServerConfig {
    pub(crate) fn analyzer(&self) -> TjAnalyzer {
        TjAnalyzer::with_options(self.analysis.clone(), self.max_diagnostics)
    }

    /// Overlay the client's `taskjuggler` settings. Missing or invalid values
    /// keep their defaults.
    pub(crate) fn from_section(value: serde_json::Value) -> Self {
        let mut config = Self::default();
        let section = match serde_json::from_value::<ConfigSection>(value) {
            Ok(section) => section,
            Err(err) => {
                tracing::warn!(%err, "ignoring malformed {CONFIG_SECTION} settings");
                return config;
            }
        };

        if let Some(v) = section.diagnostics.debounce_ms {
            config.debounce_ms = v;
        }
        if let Some(v) = section.diagnostics.max_diagnostics.filter(|v| *v > 0) {
            config.max_diagnostics = v;
        }
        if let Some(v) = section.diagnostics.check_account_references {
            config.analysis.check_account_references = v;
        }
        if let Some(v) = section.workspace.exclude {
            config.workspace.exclude = v;
        }
        if let Some(v) = section.workspace.max_files.filter(|v| *v > 0) {
            config.workspace.max_files = Some(v);
        }
        config
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigSection {
    #[serde(default)]
    diagnostics: DiagnosticsConfig,
    #[serde(default)]
    workspace: WorkspaceConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct DiagnosticsConfig {
    #[serde(default)]
    debounce_ms: Option<u64>,
    #[serde(default)]
    check_account_references: Option<bool>,
    #[serde(default)]
    max_diagnostics: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WorkspaceConfig {
    #[serde(default)]
    exclude: Option<Vec<String>>,
    #[serde(default)]
    max_files: Option<usize>,
}

impl TjLanguageServer {
    pub(crate) async fn load_config(&self) {
        let items = vec![ConfigurationItem {
            scope_uri: None,
            section: Some(CONFIG_SECTION.to_string()),
        }];

        let values = match self.client.configuration(items).await {
            Ok(values) => values,
            Err(err) => {
                tracing::debug!(%err, "client did not return configuration");
                return;
            }
        };
        let Some(value) = values.into_iter().next() else {
            return;
        };
        let loaded = ServerConfig::from_section(value);
        tracing::info!(?loaded, "loaded configuration");
        match self.config.lock() {
            Ok(mut guard) => *guard = loaded,
            Err(poisoned) => *poisoned.into_inner() = loaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_when_section_is_empty() {
        assert_eq!(ServerConfig::from_section(json!({})), ServerConfig::default());
        assert_eq!(ServerConfig::from_section(serde_json::Value::Null), ServerConfig::default());
    }

    #[test]
    fn reads_camel_case_settings() {
        let config = ServerConfig::from_section(json!({
            "diagnostics": { "debounceMs": 120, "checkAccountReferences": false, "maxDiagnostics": 50 },
            "workspace": { "exclude": ["build"], "maxFiles": 20 }
        }));
        assert_eq!(config.debounce_ms, 120);
        assert_eq!(config.max_diagnostics, 50);
        assert!(!config.analysis.check_account_references);
        assert_eq!(config.workspace.exclude, vec!["build".to_string()]);
        assert_eq!(config.workspace.max_files, Some(20));
    }

    #[test]
    fn zero_limits_are_ignored() {
        let config = ServerConfig::from_section(json!({
            "diagnostics": { "maxDiagnostics": 0 },
            "workspace": { "maxFiles": 0 }
        }));
        assert_eq!(config.max_diagnostics, DEFAULT_MAX_DIAGNOSTICS);
        assert_eq!(config.workspace.max_files, None);
    }

    #[test]
    fn malformed_values_fall_back() {
        let config = ServerConfig::from_section(json!({ "diagnostics": { "debounceMs": "soon" } }));
        assert_eq!(config, ServerConfig::default());
    }
}
