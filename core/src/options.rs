use serde::{Deserialize, Serialize};

/// Knobs for a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisOptions {
    /// Report `charge`/`chargeset`/`revenue`/`purge` targets that name no account.
    pub check_account_references: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            check_account_references: true,
        }
    }
}
