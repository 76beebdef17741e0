use tjls_lsp::analyzer::TjAnalyzer;
use tower_lsp::lsp_types::{DocumentSymbol, SymbolKind};

fn get_symbol<'a>(symbols: &'a [DocumentSymbol], name: &str) -> Option<&'a DocumentSymbol> {
    symbols.iter().find(|s| s.name == name)
}

fn list_child_names(parent: &DocumentSymbol) -> Vec<String> {
    parent
        .children
        .as_ref()
        .map(|kids| kids.iter().map(|s| s.name.clone()).collect())
        .unwrap_or_default()
}

#[test]
fn test_task_hierarchy_follows_nesting() {
    let code = r#"project acme "Acme" 2024-01-01 +6m {
  timezone "Europe/Berlin"
}

resource team "Team" {
  resource alice "Alice" {
    rate 500
  }
}

task release "Release" {
  task design "Design" {
    effort 10d
    allocate alice
  }
  task build "Build" {
    depends !design
    duration 3w
  }
  task ship "Ship" {
    depends !build
    milestone
  }
}
"#;
    let res = TjAnalyzer::new().analyze(code);
    assert!(res.diagnostics.is_empty(), "unexpected diagnostics: {:?}", res.diagnostics);

    let release = get_symbol(&res.symbols, "release - Release").expect("release task present");
    assert_eq!(release.kind, SymbolKind::FUNCTION);
    assert_eq!(
        list_child_names(release),
        vec!["design - Design", "build - Build", "ship - Ship"]
    );

    let kids = release.children.as_ref().expect("children");
    assert_eq!(kids[0].detail.as_deref(), Some("effort 10d, allocate alice"));
    assert_eq!(kids[1].detail.as_deref(), Some("duration 3w"));
    assert_eq!(kids[2].detail.as_deref(), Some("milestone"));

    let team = get_symbol(&res.symbols, "team - Team").expect("team resource present");
    assert_eq!(team.kind, SymbolKind::CLASS);
    assert_eq!(list_child_names(team), vec!["alice - Alice"]);
}

#[test]
fn test_symbol_ranges_cover_blocks() {
    let code = "task a \"A\" {\n  task b \"B\" {\n  }\n}\n";
    let res = TjAnalyzer::new().analyze(code);
    let a = &res.symbols[0];
    assert_eq!((a.range.start.line, a.range.end.line), (0, 3));
    assert_eq!((a.selection_range.start.character, a.selection_range.end.character), (5, 6));
    let b = &a.children.as_ref().expect("nested task")[0];
    assert_eq!((b.range.start.line, b.range.end.line), (1, 2));
}

#[test]
fn test_broken_document_still_has_outline() {
    let code = "task a \"A\" {\n  task b \"B\" {\n    depends !missing\n";
    let res = TjAnalyzer::new().analyze(code);
    assert_eq!(res.symbols.len(), 1);
    assert_eq!(list_child_names(&res.symbols[0]), vec!["b - B"]);
    let messages: Vec<&str> = res.diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert!(messages.iter().any(|m| m.contains("Undefined task 'missing'")), "{messages:?}");
    assert_eq!(messages.iter().filter(|m| m.starts_with("Unclosed brace")).count(), 2);
}
