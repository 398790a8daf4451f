use atlas_core::view::graph::{self, connected_nodes, edges, hierarchy_edges};
use atlas_core::view::tree::{count_nodes, flatten, max_depth, parse};
use atlas_core::{AtlasDataBlock, BlockKind, DataItem, FieldSchema, FieldType, SelectOption};
use serde_json::json;

fn org_block() -> AtlasDataBlock {
    let schema = vec![
        FieldSchema::new("title", FieldType::Text),
        FieldSchema::new("type", FieldType::Select).with_options(vec![
            SelectOption::new("team").with_label("Team").with_color("purple"),
            SelectOption::new("person").with_label("Person"),
        ]),
        FieldSchema::new("status", FieldType::Status).with_options(vec![
            SelectOption::new("active").with_label("Active").with_color("green"),
        ]),
    ];
    let data = vec![
        DataItem::new("eng")
            .with("title", "Engineering")
            .with("type", "team")
            .with(
                "children",
                json!([
                    {
                        "id": "platform",
                        "title": "Platform",
                        "type": "team",
                        "children": [
                            { "id": "ana", "name": "Ana", "type": "person", "status": "active" }
                        ]
                    },
                    { "title": "Unnamed" }
                ]),
            ),
        DataItem::new("design").with("title", "Design"),
    ];
    AtlasDataBlock::new("org", BlockKind::Tree, schema, data)
}

#[test]
fn tree_levels_and_fallback_ids() {
    let roots = parse(&org_block());
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0].level, 0);

    let platform = &roots[0].children[0];
    assert_eq!(platform.level, 1);
    assert_eq!(platform.children[0].level, 2);
    assert_eq!(platform.children[0].title, "Ana");

    let unnamed = &roots[0].children[1];
    assert_eq!(unnamed.id, "eng-2");
    assert!(roots[0].item.fields.get("children").is_none());

    assert_eq!(count_nodes(&roots), 5);
    assert_eq!(max_depth(&roots), Some(2));
    assert_eq!(max_depth(&[]), None);
}

#[test]
fn nested_type_and_status_resolve_against_schema() {
    let roots = parse(&org_block());
    let ana = &roots[0].children[0].children[0];

    assert_eq!(ana.type_value.as_deref(), Some("person"));
    assert_eq!(
        ana.type_option.as_ref().map(|option| option.label.as_str()),
        Some("Person")
    );
    assert_eq!(
        ana.status_option
            .as_ref()
            .map(|option| option.color_token()),
        Some("green")
    );
    assert!(roots[1].type_option.is_none());
}

#[test]
fn flatten_is_preorder_and_keeps_every_node() {
    let roots = parse(&org_block());
    let flat = flatten(&roots);

    assert_eq!(flat.len(), count_nodes(&roots));
    let ids: Vec<_> = flat.iter().map(|node| node.id.as_str()).collect();
    assert_eq!(ids, vec!["eng", "platform", "ana", "eng-2", "design"]);
    assert_eq!(flat[2].parent_id.as_deref(), Some("platform"));
    assert_eq!(flat[0].parent_id, None);
    assert_eq!(flat[2].label, "Ana");
}

#[test]
fn hierarchy_graph_drops_isolated_roots() {
    let view = graph::build_hierarchy(&org_block());
    let edge_ids: Vec<_> = view.edges.iter().map(|edge| edge.id.as_str()).collect();
    assert_eq!(edge_ids, vec!["eng->platform", "platform->ana", "eng->eng-2"]);
    assert!(view
        .edges
        .iter()
        .all(|edge| edge.relation.as_deref() == Some("child")));

    let node_ids: Vec<_> = view.nodes.iter().map(|node| node.id.as_str()).collect();
    assert_eq!(node_ids, vec!["eng", "platform", "ana", "eng-2"]);
}

#[test]
fn orphan_nodes_are_excluded_from_graph_but_not_tree() {
    let schema = vec![FieldSchema::new("title", FieldType::Text)];
    let nodes_block = AtlasDataBlock::new(
        "people",
        BlockKind::Tree,
        schema,
        vec![
            DataItem::new("a"),
            DataItem::new("b"),
            DataItem::new("c"),
            DataItem::new("d"),
        ],
    );
    let edge_schema = vec![
        FieldSchema::new("source", FieldType::Text),
        FieldSchema::new("target", FieldType::Text),
        FieldSchema::new("relation", FieldType::Select)
            .with_options(vec![SelectOption::new("reports").with_label("Reports to")]),
    ];
    let edge_block = AtlasDataBlock::new(
        "links",
        BlockKind::Graph,
        edge_schema,
        vec![DataItem::new("e1")
            .with("source", "a")
            .with("target", "c")
            .with("relation", "reports")],
    );

    let view = graph::build(&nodes_block, &edge_block);
    let ids: Vec<_> = view.nodes.iter().map(|node| node.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert_eq!(view.edges.len(), 1);
    assert_eq!(
        view.edges[0]
            .relation_option
            .as_ref()
            .map(|option| option.label.as_str()),
        Some("Reports to")
    );

    assert_eq!(count_nodes(&parse(&nodes_block)), 4);
}

#[test]
fn edges_keep_dangling_endpoints() {
    let block = AtlasDataBlock::new(
        "links",
        BlockKind::Graph,
        vec![FieldSchema::new("source", FieldType::Text)],
        vec![
            DataItem::new("e1").with("source", "x"),
            DataItem::new("e2").with("source", "y").with("target", "ghost"),
        ],
    );
    let edge_list = edges(&block);
    assert_eq!(edge_list.len(), 2);
    assert_eq!(edge_list[0].target, "");
    assert_eq!(edge_list[1].target, "ghost");
    assert!(edge_list[0].relation.is_none());

    let flat = flatten(&parse(&org_block()));
    let kept = connected_nodes(flat.clone(), &edge_list);
    assert!(kept.is_empty());
    assert_eq!(hierarchy_edges(&flat).len(), 3);
}
