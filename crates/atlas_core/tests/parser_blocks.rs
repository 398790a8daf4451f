use atlas_core::{
    find_block, parse_blocks, parse_first_block, parse_front_matter, parse_report,
    BlockDecodeError, BlockKind, FieldType, LabelResolver, SortOrder,
};

const TASKS_BLOCK: &str = r#"```atlas
id: tasks
type: kanban-source
title: Sprint board
groupBy: status
sortBy: priority
sortOrder: desc
schema:
  - key: title
    label: Title
    type: text
  - key: status
    type: select
    options:
      - { value: todo, label: To Do, color: gray }
      - { value: done, label: Done, color: green }
data:
  - id: t1
    title: Write parser
    status: todo
  - id: 2
    title: Ship
    status: done
```"#;

fn document(parts: &[&str]) -> String {
    parts.join("\n\nSome prose between blocks.\n\n")
}

#[test]
fn parses_block_metadata_schema_and_items() {
    let blocks = parse_blocks(TASKS_BLOCK);
    assert_eq!(blocks.len(), 1);

    let block = &blocks[0];
    assert_eq!(block.id, "tasks");
    assert_eq!(block.kind, BlockKind::KanbanSource);
    assert_eq!(block.title.as_deref(), Some("Sprint board"));
    assert_eq!(block.group_by.as_deref(), Some("status"));
    assert_eq!(block.sort_by.as_deref(), Some("priority"));
    assert_eq!(block.sort_order, SortOrder::Desc);

    assert_eq!(block.schema.len(), 2);
    let status = block.field("status").expect("status field should exist");
    assert_eq!(status.field_type, FieldType::Select);
    assert_eq!(status.options.len(), 2);
    assert_eq!(status.options[0].label, "To Do");
    assert_eq!(status.options[1].color_token(), "green");

    assert_eq!(block.data.len(), 2);
    assert_eq!(block.data[0].id, "t1");
    assert_eq!(block.data[1].id, "2");
    assert_eq!(block.data[1].text("title").as_deref(), Some("Ship"));
    assert!(block.data[0].fields.get("id").is_none());
}

#[test]
fn malformed_block_is_skipped_without_losing_siblings() {
    let broken = "```atlas\nid: broken\nschema: [\n```";
    let text = document(&[TASKS_BLOCK, broken]);

    let blocks = parse_blocks(&text);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].id, "tasks");

    let report = parse_report(&text);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 1);
    assert!(matches!(report.skipped[0].reason, BlockDecodeError::Yaml(_)));
    assert!(report.skipped[0].line > 1);
}

#[test]
fn blocks_missing_schema_or_data_are_dropped() {
    let no_schema = "```atlas\nid: a\ndata:\n  - id: x\n```";
    let empty_data = "```atlas\nid: b\nschema:\n  - key: title\ndata: []\n```";
    let text = document(&[no_schema, TASKS_BLOCK, empty_data]);

    let report = parse_report(&text);
    assert_eq!(report.blocks.len(), 1);
    let reasons: Vec<_> = report.skipped.iter().map(|s| s.reason.clone()).collect();
    assert_eq!(
        reasons,
        vec![BlockDecodeError::MissingSchema, BlockDecodeError::MissingData]
    );
}

#[test]
fn blocks_keep_order_of_appearance() {
    let first = "```atlas\nid: one\nschema:\n  - key: title\ndata:\n  - id: a\n```";
    let second = "```atlas\nid: two\nschema:\n  - key: title\ndata:\n  - id: b\n```";
    let text = document(&[first, second]);

    let ids: Vec<_> = parse_blocks(&text).into_iter().map(|b| b.id).collect();
    assert_eq!(ids, vec!["one", "two"]);
    assert_eq!(
        parse_first_block(&text).map(|b| b.id).as_deref(),
        Some("one")
    );
}

#[test]
fn other_fences_are_ignored() {
    let text = "```yaml\nschema:\n  - key: title\ndata:\n  - id: a\n```\n\n```atlasx\nid: nope\n```";
    assert!(parse_blocks(text).is_empty());
    assert!(parse_first_block("no blocks here").is_none());
}

#[test]
fn find_block_returns_first_match_on_duplicate_ids() {
    let first = "```atlas\nid: dup\ntitle: First\nschema:\n  - key: title\ndata:\n  - id: a\n```";
    let second = "```atlas\nid: dup\ntitle: Second\nschema:\n  - key: title\ndata:\n  - id: b\n```";
    let text = document(&[first, second]);

    let found = find_block(&text, "dup").expect("block should be found");
    assert_eq!(found.title.as_deref(), Some("First"));
    assert!(find_block(&text, "missing").is_none());
}

#[test]
fn unknown_kind_and_field_type_do_not_reject_block() {
    let text = "```atlas\ntype: spreadsheet\nschema:\n  - key: sig\n    type: signature\ndata:\n  - id: a\n    sig: xyz\n```";
    let block = parse_first_block(text).expect("block should parse");
    assert_eq!(block.kind, BlockKind::Generic);
    assert_eq!(block.id, "block-1");
    assert_eq!(
        block.schema[0].field_type,
        FieldType::Other("signature".to_string())
    );
}

#[test]
fn front_matter_supplies_labels_icons_and_config() {
    let text = format!(
        "---\ntitle: Roadmap\natlas:\n  labels:\n    status: Stage\n  icons:\n    status: flag\n  config:\n    empty_display: n/a\n---\n\n{}",
        TASKS_BLOCK
    );
    let front = parse_front_matter(&text);
    assert_eq!(front.labels.label_for("status").as_deref(), Some("Stage"));
    assert_eq!(front.labels.icon_for("status").as_deref(), Some("flag"));
    assert_eq!(front.config.empty_display, "n/a");

    assert_eq!(parse_blocks(&text).len(), 1);
}

#[test]
fn malformed_front_matter_falls_back_to_defaults() {
    let front = parse_front_matter("---\natlas: [\n---\nbody");
    assert!(front.labels.is_empty());
    assert_eq!(front.config, atlas_core::EngineConfig::default());

    let rejected = parse_front_matter("---\natlas:\n  config:\n    masonry_columns: 0\n---\n");
    assert_eq!(rejected.config, atlas_core::EngineConfig::default());

    let absent = parse_front_matter("# Title only");
    assert!(absent.labels.is_empty());
}

#[test]
fn unterminated_block_does_not_swallow_next_block() {
    let unterminated = "```atlas\nschema: [\n";
    let good = "```atlas\nid: good\nschema:\n  - key: title\ndata:\n  - id: a\n```";
    let text = format!("{unterminated}\nSome prose.\n\n{good}");

    let report = parse_report(&text);
    let ids: Vec<_> = report.blocks.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["good"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 0);
    assert_eq!(report.skipped[0].line, 1);
    assert_eq!(report.skipped[0].reason, BlockDecodeError::Unterminated);
}

#[test]
fn block_left_open_at_end_of_document_is_reported() {
    let text = document(&[TASKS_BLOCK, "```atlas\nid: tail\nschema:\n  - key: title\n"]);

    let report = parse_report(&text);
    assert_eq!(report.blocks.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 1);
    assert_eq!(report.skipped[0].reason, BlockDecodeError::Unterminated);
}

#[test]
fn foreign_fence_ends_an_unclosed_atlas_block() {
    let text = format!(
        "```atlas\nid: open\n\n```yaml\nkey: value\n```\n\n{}",
        TASKS_BLOCK
    );
    let report = parse_report(&text);
    let ids: Vec<_> = report.blocks.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["tasks"]);
    assert_eq!(report.skipped[0].reason, BlockDecodeError::Unterminated);
}
