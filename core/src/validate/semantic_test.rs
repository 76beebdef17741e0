use crate::diagnostic::{DiagnosticCode, Severity};
use crate::options::AnalysisOptions;
use crate::references::extract_references;
use crate::symbols::extract_symbols;
use crate::text::Range;
use crate::validate::semantic::{DependencyGraph, validate_circular_dependencies, validate_references};

fn undefined(text: &str, options: &AnalysisOptions) -> Vec<crate::diagnostic::Diagnostic> {
    validate_references(&extract_symbols(text), &extract_references(text), options)
}

fn cycles(text: &str) -> Vec<crate::diagnostic::Diagnostic> {
    validate_circular_dependencies(&extract_symbols(text), &extract_references(text))
}

#[test]
fn undefined_task_is_reported() {
    let diags = undefined("task dev \"Dev\" {\n  depends !plan\n}\n", &AnalysisOptions::default());
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("Undefined task"));
    assert!(diags[0].message.contains("plan"));
    assert_eq!(diags[0].message, "Undefined task 'plan' referenced in depends");
    assert_eq!(diags[0].severity, Severity::Error);
    assert_eq!(diags[0].code, DiagnosticCode::UndefinedReference);
    assert_eq!(diags[0].range, Range::on_line(1, 11, 15));
}

#[test]
fn defined_task_is_not_reported() {
    let text = "task plan \"S\" {}\ntask dev \"Dev\" {\n  depends !plan\n}\n";
    assert!(undefined(text, &AnalysisOptions::default()).is_empty());
}

#[test]
fn forward_references_resolve() {
    let text = "task dev \"Dev\" {\n  depends plan\n}\ntask plan \"S\" {}\n";
    assert!(undefined(text, &AnalysisOptions::default()).is_empty());
}

#[test]
fn undefined_resource_is_reported() {
    let diags = undefined("task t {\n  allocate ghost\n}\n", &AnalysisOptions::default());
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "Undefined resource 'ghost' referenced in allocate");
}

#[test]
fn account_check_follows_options() {
    let text = "task t {\n  chargeset travel\n}\n";
    assert_eq!(undefined(text, &AnalysisOptions::default()).len(), 1);

    let relaxed = AnalysisOptions {
        check_account_references: false,
    };
    assert!(undefined(text, &relaxed).is_empty());

    let defined = "account travel \"Travel\"\ntask t {\n  chargeset travel\n}\n";
    assert!(undefined(defined, &AnalysisOptions::default()).is_empty());
}

#[test]
fn shifts_are_not_checked_against_resources() {
    assert!(undefined("resource r \"R\" {\n  shifts night\n}\n", &AnalysisOptions::default()).is_empty());
}

#[test]
fn two_task_cycle_is_reported_once() {
    let text = "task a \"A\" {\n  depends b\n}\ntask b \"B\" {\n  depends a\n}\n";
    let diags = cycles(text);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "Circular dependency detected: a → b → a");
    assert_eq!(diags[0].code, DiagnosticCode::CircularDependency);
    assert_eq!(diags[0].range, Range::on_line(0, 5, 6));
}

#[test]
fn self_dependency_is_a_cycle() {
    let diags = cycles("task a \"A\" {\n  depends !a\n}\n");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "Circular dependency detected: a → a");
}

#[test]
fn diamond_has_no_cycle() {
    let text = "task a {\n  depends b, c\n}\ntask d {\n  depends b, c\n}\ntask b {}\ntask c {}\n";
    assert!(cycles(text).is_empty());
}

#[test]
fn only_first_cycle_is_reported() {
    let text = "task a {\n  depends b\n}\ntask b {\n  depends a\n}\ntask c {\n  depends d\n}\ntask d {\n  depends c\n}\n";
    let diags = cycles(text);
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("a → b → a"));
}

#[test]
fn cycle_through_longer_chain_starts_at_back_edge_target() {
    let text = "task x {\n  depends a\n}\ntask a {\n  depends b\n}\ntask b {\n  depends c\n}\ntask c {\n  depends a\n}\n";
    let diags = cycles(text);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "Circular dependency detected: a → b → c → a");
    assert_eq!(diags[0].range.start.line, 3);
}

#[test]
fn precedes_edges_do_not_form_cycles() {
    let text = "task a {\n  precedes b\n}\ntask b {\n  depends a\n}\n";
    assert!(cycles(text).is_empty());
}

#[test]
fn graph_keeps_insertion_order() {
    let refs = extract_references("task z {\n  depends y\n}\ntask a {\n  depends y, x, y\n}\n");
    let graph = DependencyGraph::from_references(&refs);
    let nodes: Vec<&str> = graph.nodes().collect();
    assert_eq!(nodes, vec!["z", "a"]);
    let deps: Vec<&str> = graph.dependencies("a").collect();
    assert_eq!(deps, vec!["y", "x"]);
}

#[test]
fn cycle_without_definition_falls_back_to_reference_range() {
    let text = "supplement task a {\n  depends a\n}\n";
    let diags = cycles(text);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].range, Range::on_line(1, 10, 11));
}

#[test]
fn dotted_path_ancestors_add_no_edges() {
    let text = "task p \"P\" {\n  depends q.r\n}\ntask q \"Q\" {\n  task r \"R\" {}\n  depends p\n}\n";
    let graph = DependencyGraph::from_references(&extract_references(text));
    assert_eq!(graph.dependencies("p").collect::<Vec<_>>(), vec!["r"]);
    assert!(cycles(text).is_empty());
    assert!(undefined(text, &AnalysisOptions::default()).is_empty());
}
