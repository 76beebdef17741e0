use crate::symbols::{SymbolData, SymbolKind, extract_symbols};
use crate::text::Range;

fn parent_of<'a>(table: &'a crate::symbols::SymbolTable, id: &str) -> Option<&'a str> {
    table.find(SymbolKind::Task, id).and_then(|s| s.parent())
}

#[test]
fn nested_tasks_get_innermost_parent() {
    let table = extract_symbols(
        "task a \"A\" {\n  task b \"B\" {\n    task c \"C\" {}\n  }\n}\n",
    );
    assert_eq!(table.tasks.len(), 3);
    assert_eq!(parent_of(&table, "a"), None);
    assert_eq!(parent_of(&table, "b"), Some("a"));
    assert_eq!(parent_of(&table, "c"), Some("b"));
}

#[test]
fn single_line_nesting_is_recognised() {
    let table = extract_symbols("task a \"A\" { task b \"B\" { task c \"C\" {} } }");
    assert_eq!(parent_of(&table, "b"), Some("a"));
    assert_eq!(parent_of(&table, "c"), Some("b"));
}

#[test]
fn siblings_do_not_nest() {
    let table = extract_symbols(
        "task p \"P\" {\n  task x \"X\" {}\n  task y \"Y\" {\n  }\n  task z \"Z\" {}\n}\n",
    );
    assert_eq!(parent_of(&table, "x"), Some("p"));
    assert_eq!(parent_of(&table, "y"), Some("p"));
    assert_eq!(parent_of(&table, "z"), Some("p"));
}

#[test]
fn name_is_optional_and_defaults_to_id() {
    let table = extract_symbols("task dev {\n}\nresource bob \"Bob Smith\"\n");
    assert_eq!(table.tasks[0].name, "dev");
    assert_eq!(table.resources[0].name, "Bob Smith");
}

#[test]
fn brace_on_next_line_opens_definition() {
    let table = extract_symbols("task a \"A\"\n# comment\n{\n  task b \"B\" {}\n}\n");
    assert_eq!(parent_of(&table, "b"), Some("a"));
}

#[test]
fn braces_and_keywords_in_strings_and_comments_are_ignored() {
    let text = "task a \"A { weird\" {\n  # task ghost \"G\" {\n  note \"task fake {\"\n  task b \"B\" {}\n}\ntask c \"C\" {}\n";
    let table = extract_symbols(text);
    let ids: Vec<&str> = table.tasks.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(table.tasks[0].name, "A { weird");
    assert_eq!(parent_of(&table, "b"), Some("a"));
    assert_eq!(parent_of(&table, "c"), None);
}

#[test]
fn resources_accounts_and_scenarios_nest_by_kind() {
    let text = "resource team \"Team\" {\n  resource bob \"Bob\"\n}\naccount cost \"Cost\" {\n  account dev \"Dev\"\n}\nscenario plan \"Plan\" {\n  scenario delayed \"Delayed\"\n}\n";
    let table = extract_symbols(text);
    assert_eq!(table.find(SymbolKind::Resource, "bob").and_then(|s| s.parent()), Some("team"));
    assert_eq!(table.find(SymbolKind::Account, "dev").and_then(|s| s.parent()), Some("cost"));
    assert_eq!(
        table.find(SymbolKind::Scenario, "delayed").and_then(|s| s.parent()),
        Some("plan")
    );
}

#[test]
fn task_inside_resource_has_no_task_parent() {
    let table = extract_symbols("resource r \"R\" {\n  task t \"T\" {}\n}\n");
    assert_eq!(parent_of(&table, "t"), None);
}

#[test]
fn macros_are_collected_without_parent() {
    let table = extract_symbols("macro alloc_dev [\n  allocate dev\n]\n");
    assert_eq!(table.macros.len(), 1);
    assert_eq!(table.macros[0].id, "alloc_dev");
    assert_eq!(table.macros[0].data, SymbolData::Macro);
    assert_eq!(table.macros[0].parent(), None);
}

#[test]
fn ranges_cover_line_and_identifier() {
    let table = extract_symbols("\n  task dev \"Development\" {\n  }\n");
    let dev = &table.tasks[0];
    assert_eq!(dev.range, Range::on_line(1, 0, 26));
    assert_eq!(dev.id_range, Range::on_line(1, 7, 10));
}

#[test]
fn duplicates_are_all_recorded() {
    let table = extract_symbols("task a \"A\" {}\ntask a \"Again\" {}\n");
    assert_eq!(table.tasks.len(), 2);
    assert_eq!(table.find(SymbolKind::Task, "a").map(|s| s.name.as_str()), Some("A"));
}

#[test]
fn reserved_prefixes_are_not_definitions() {
    let table = extract_symbols("taskreport overview \"\" {\n}\nresourcereport r \"\" {}\n");
    assert!(table.is_empty());
}

#[test]
fn extraction_is_idempotent() {
    let text = "task a \"A\" {\n  task b \"B\" {}\n}\nresource r \"R\"\n";
    assert_eq!(extract_symbols(text), extract_symbols(text));
}

#[test]
fn unbalanced_closing_braces_do_not_panic() {
    let table = extract_symbols("}\n}\ntask a \"A\" {\n  task b \"B\" {}\n}\n");
    assert_eq!(parent_of(&table, "b"), Some("a"));
}

#[test]
fn id_exists_checks_every_kind() {
    let table = extract_symbols("account cost \"Cost\"\nmacro m [ x ]\n");
    assert!(table.id_exists("cost"));
    assert!(table.id_exists("m"));
    assert!(!table.id_exists("nope"));
}

#[test]
fn tasks_inside_supplement_block_take_supplemented_parent() {
    let table = extract_symbols("task a \"A\" {}\nsupplement task a {\n  task extra \"Extra\" {}\n}\n");
    assert_eq!(parent_of(&table, "extra"), Some("a"));
}
