use anyhow::Context;

use crate::analyzer::TjAnalyzer;

const USAGE: &str = "Usage: tjls-lsp --analyze [--errors-only] <file>\n  --analyze <file>     : Full analysis with JSON output\n  --errors-only        : Show only errors in simple format";

/// `tjls-lsp --analyze <file>` runs one analysis and prints it instead of
/// starting the server.
pub(crate) fn try_cli_analyze() -> anyhow::Result<Option<String>> {
    let args: Vec<String> = std::env::args().collect();
    analyze_args(&args)
}

fn analyze_args(args: &[String]) -> anyhow::Result<Option<String>> {
    let Some(i) = args.iter().position(|a| a == "--analyze") else {
        return Ok(None);
    };
    let path = args[i + 1..]
        .iter()
        .find(|a| !a.starts_with("--"))
        .ok_or_else(|| anyhow::anyhow!(USAGE))?;
    let errors_only = args.iter().any(|a| a == "--errors-only");

    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read file '{path}'"))?;
    let analysis = TjAnalyzer::new().analyze(&content);

    if errors_only {
        let errors: Vec<String> = analysis
            .diagnostics
            .iter()
            .filter(|d| d.severity == Some(tower_lsp::lsp_types::DiagnosticSeverity::ERROR))
            .map(|d| {
                format!(
                    "Line {}:{}: {}",
                    d.range.start.line + 1,
                    d.range.start.character + 1,
                    d.message
                )
            })
            .collect();
        if errors.is_empty() {
            return Ok(Some("No errors found".to_string()));
        }
        return Ok(Some(errors.join("\n")));
    }

    let output = serde_json::json!({
        "diagnostics": analysis.diagnostics,
        "symbols": analysis.symbols,
    });
    Ok(Some(serde_json::to_string_pretty(&output)?))
}
