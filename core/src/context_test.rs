use crate::context::{BlockKind, context_at};
use crate::text::Position;

#[test]
fn resource_block() {
    let text = "\nresource john \"John\" {\n  \n}\n";
    let ctx = context_at(text, Position::new(2, 2));
    assert_eq!(ctx.block_kind, BlockKind::Resource);
    assert_eq!(ctx.block_id.as_deref(), Some("john"));
    assert_eq!(ctx.block_start_line, 1);
}

#[test]
fn project_block() {
    let text = "\nproject test \"Test\" 2024-01-01 +6m {\n    timezone \"UTC\"\n\n}\n";
    let ctx = context_at(text, Position::new(3, 4));
    assert_eq!(ctx.block_kind, BlockKind::Project);
    assert!(ctx.used_attribute_names.contains("timezone"));
}

#[test]
fn report_block() {
    let text = "\ntaskreport overview \"\" {\n    formats html\n\n}\n";
    let ctx = context_at(text, Position::new(3, 4));
    assert_eq!(ctx.block_kind, BlockKind::Report);
    assert_eq!(ctx.block_id.as_deref(), Some("overview"));
}

#[test]
fn top_level_after_one_line_block() {
    let text = "\ntask dev \"Development\" {}\n\n";
    let ctx = context_at(text, Position::new(2, 0));
    assert_eq!(ctx.block_kind, BlockKind::None);
    assert!(!ctx.in_block());
    assert!(ctx.parent_block_kinds.is_empty());
}

#[test]
fn tracks_used_attributes() {
    let text = "\ntask dev \"Development\" {\n    effort 5d\n    allocate john\n    depends !plan\n    \n}\n";
    let ctx = context_at(text, Position::new(5, 4));
    let used: Vec<&str> = ctx.used_attribute_names.iter().map(String::as_str).collect();
    assert_eq!(used, vec!["allocate", "depends", "effort"]);
}

#[test]
fn nested_blocks() {
    let text = "\ntask parent \"Parent\" {\n    task child \"Child\" {\n        effort 5d\n\n    }\n}\n";
    let ctx = context_at(text, Position::new(4, 8));
    assert_eq!(ctx.block_kind, BlockKind::Task);
    assert_eq!(ctx.block_id.as_deref(), Some("child"));
    assert_eq!(ctx.parent_block_kinds, vec![BlockKind::Task, BlockKind::Task]);
    assert!(ctx.used_attribute_names.contains("effort"));
}

#[test]
fn closed_child_attributes_are_not_counted() {
    let text = "task p \"P\" {\n  task c \"C\" {\n    effort 2d\n  }\n  priority 500\n  \n}\n";
    let ctx = context_at(text, Position::new(5, 2));
    assert_eq!(ctx.block_id.as_deref(), Some("p"));
    let used: Vec<&str> = ctx.used_attribute_names.iter().map(String::as_str).collect();
    assert_eq!(used, vec!["priority"]);
}

#[test]
fn word_being_typed_is_not_used_yet() {
    let text = "task t \"T\" {\n  eff\n}\n";
    let ctx = context_at(text, Position::new(1, 5));
    assert!(ctx.used_attribute_names.is_empty());
}

#[test]
fn anonymous_blocks_keep_the_enclosing_block_open() {
    let text = "task t \"T\" {\n  limits {\n    dailymax 4h\n  }\n  \n}\n";
    let ctx = context_at(text, Position::new(4, 2));
    assert_eq!(ctx.block_kind, BlockKind::Task);
    assert_eq!(ctx.block_id.as_deref(), Some("t"));
}

#[test]
fn inside_anonymous_block_reports_enclosing_named_block() {
    let text = "resource r \"R\" {\n  limits {\n    \n  }\n}\n";
    let ctx = context_at(text, Position::new(2, 4));
    assert_eq!(ctx.block_kind, BlockKind::Resource);
}

#[test]
fn supplement_opens_task_block() {
    let text = "supplement task dev {\n  \n}\n";
    let ctx = context_at(text, Position::new(1, 2));
    assert_eq!(ctx.block_kind, BlockKind::Task);
    assert_eq!(ctx.block_id.as_deref(), Some("dev"));
}

#[test]
fn brace_on_following_line_opens_block() {
    let text = "account cost \"Cost\"\n{\n  \n}\n";
    let ctx = context_at(text, Position::new(2, 2));
    assert_eq!(ctx.block_kind, BlockKind::Account);
    assert_eq!(ctx.block_id.as_deref(), Some("cost"));
}

#[test]
fn comments_do_not_open_blocks() {
    let text = "# task fake \"F\" {\n\n";
    let ctx = context_at(text, Position::new(1, 0));
    assert_eq!(ctx.block_kind, BlockKind::None);
}

#[test]
fn unbalanced_input_degrades_without_panicking() {
    let text = "}\n}\ntask t \"T\" {\n  \n";
    let ctx = context_at(text, Position::new(3, 2));
    assert_eq!(ctx.block_kind, BlockKind::Task);

    let ctx = context_at("task t {\n", Position::new(10, 0));
    assert_eq!(ctx.block_kind, BlockKind::Task);
}

#[test]
fn block_range_spans_to_cursor() {
    let text = "task t \"T\" {\n  \n}\n";
    let ctx = context_at(text, Position::new(1, 2));
    let range = ctx.block_range.expect("range");
    assert_eq!(range.start, Position::new(0, 0));
    assert_eq!(range.end, Position::new(1, 2));
}
