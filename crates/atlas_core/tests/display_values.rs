use atlas_core::resolve::labels::resolve_label;
use atlas_core::{
    field_icon, field_label, DataItem, DisplayValueResolver, EngineConfig, FieldSchema,
    FieldType, LabelTable, NoLabels, SelectOption,
};
use serde_json::{json, Value};

const ALL_TYPES: &[&str] = &[
    "text",
    "textarea",
    "number",
    "date",
    "datetime",
    "select",
    "multiselect",
    "status",
    "tags",
    "currency",
    "url",
    "email",
    "phone",
    "boolean",
    "image",
    "avatar",
    "file",
    "rating",
    "progress",
    "reference",
    "assignee",
    "object",
    "signature",
];

fn status_field() -> FieldSchema {
    FieldSchema::new("status", FieldType::Select).with_options(vec![
        SelectOption::new("todo").with_label("To Do"),
        SelectOption::new("done").with_label("Done").with_color("green"),
    ])
}

#[test]
fn empty_values_resolve_to_sentinel_for_every_type() {
    let resolver = DisplayValueResolver::default();
    let empties = [None, Some(Value::Null), Some(json!("")), Some(json!("   "))];

    for type_name in ALL_TYPES {
        let field = FieldSchema::new("field", FieldType::parse(type_name));
        for raw in &empties {
            let resolved = resolver.resolve(&field, raw.as_ref());
            assert_eq!(
                resolved.display_value, "—",
                "type `{type_name}` with {raw:?} should resolve to the sentinel"
            );
            assert!(resolved.option.is_none());
        }
    }
}

#[test]
fn sentinel_follows_engine_config() {
    let config = EngineConfig {
        empty_display: "n/a".to_string(),
        ..EngineConfig::default()
    };
    let resolver = DisplayValueResolver::from_config(&config);
    let resolved = resolver.resolve(&FieldSchema::new("x", FieldType::Text), None);
    assert_eq!(resolved.display_value, "n/a");
    assert_eq!(resolver.empty_display(), "n/a");
}

#[test]
fn select_maps_options_and_falls_back_to_raw_value() {
    let resolver = DisplayValueResolver::default();
    let field = status_field();

    let mapped = resolver.resolve(&field, Some(&json!("done")));
    assert_eq!(mapped.display_value, "Done");
    assert_eq!(
        mapped.option.expect("option should match").color_token(),
        "green"
    );

    let unmapped = resolver.resolve(&field, Some(&json!("blocked")));
    assert_eq!(unmapped.display_value, "blocked");
    assert!(unmapped.option.is_none());

    let numeric = FieldSchema::new("priority", FieldType::Select)
        .with_options(vec![SelectOption::new("1").with_label("High")]);
    assert_eq!(resolver.resolve(&numeric, Some(&json!(1))).display_value, "High");
}

#[test]
fn multiselect_joins_labels() {
    let resolver = DisplayValueResolver::default();
    let field = FieldSchema::new("states", FieldType::Multiselect)
        .with_options(status_field().options);
    let resolved = resolver.resolve(&field, Some(&json!(["todo", "other", "done"])));
    assert_eq!(resolved.display_value, "To Do, other, Done");
    assert_eq!(resolved.option.map(|o| o.value).as_deref(), Some("todo"));
}

#[test]
fn dates_use_long_form_and_fall_back_on_garbage() {
    let resolver = DisplayValueResolver::default();
    let date = FieldSchema::new("due", FieldType::Date);
    assert_eq!(
        resolver.resolve(&date, Some(&json!("2025-06-15"))).display_value,
        "June 15, 2025"
    );
    assert_eq!(
        resolver
            .resolve(&date, Some(&json!("2025-06-15T23:30:00")))
            .display_value,
        "June 15, 2025"
    );
    assert_eq!(
        resolver.resolve(&date, Some(&json!("soon"))).display_value,
        "soon"
    );

    let datetime = FieldSchema::new("at", FieldType::Datetime);
    assert_eq!(
        resolver
            .resolve(&datetime, Some(&json!("2025-01-02T14:07")))
            .display_value,
        "January 2, 2025 2:07 PM"
    );
}

#[test]
fn currency_uses_field_or_default_code() {
    let resolver = DisplayValueResolver::default();
    let usd = FieldSchema::new("budget", FieldType::Currency);
    assert_eq!(
        resolver.resolve(&usd, Some(&json!(1234.5))).display_value,
        "$1,234.50"
    );
    assert_eq!(
        resolver.resolve(&usd, Some(&json!("99"))).display_value,
        "$99.00"
    );
    assert_eq!(
        resolver.resolve(&usd, Some(&json!("TBD"))).display_value,
        "TBD"
    );

    let mut eur = FieldSchema::new("budget", FieldType::Currency);
    eur.currency = Some("EUR".to_string());
    assert_eq!(
        resolver.resolve(&eur, Some(&json!(1000000))).display_value,
        "€1,000,000.00"
    );
}

#[test]
fn tags_accept_arrays_json_strings_and_comma_lists() {
    let resolver = DisplayValueResolver::default();
    let tags = FieldSchema::new("tags", FieldType::Tags);
    for raw in [json!(["ui", "core"]), json!(r#"["ui","core"]"#), json!("ui, core")] {
        assert_eq!(resolver.resolve(&tags, Some(&raw)).display_value, "ui, core");
    }
    assert_eq!(resolver.resolve(&tags, Some(&json!([]))).display_value, "—");
}

#[test]
fn other_types_stringify_directly() {
    let resolver = DisplayValueResolver::default();
    let cases = [
        (FieldType::Number, json!(42), "42"),
        (FieldType::Boolean, json!(true), "true"),
        (FieldType::Rating, json!(4.5), "4.5"),
        (FieldType::Url, json!("https://example.com"), "https://example.com"),
        (FieldType::Text, json!(["a", "b"]), "a, b"),
    ];
    for (field_type, raw, expected) in cases {
        let field = FieldSchema::new("f", field_type);
        assert_eq!(resolver.resolve(&field, Some(&raw)).display_value, expected);
    }
}

#[test]
fn resolve_item_reads_the_schema_key() {
    let resolver = DisplayValueResolver::default();
    let item = DataItem::new("t1").with("status", "todo");
    assert_eq!(
        resolver.resolve_item(&status_field(), &item).display_value,
        "To Do"
    );
}

#[test]
fn labels_follow_declared_then_registry_then_key() {
    let mut table = LabelTable::default();
    table.labels.insert("status".to_string(), "Stage".to_string());
    table.labels.insert("owner".to_string(), "  ".to_string());
    table.icons.insert("status".to_string(), "flag".to_string());

    let declared = FieldSchema::new("status", FieldType::Select).with_label("State");
    assert_eq!(field_label(&declared, &table), "State");

    let undeclared = FieldSchema::new("status", FieldType::Select);
    assert_eq!(field_label(&undeclared, &table), "Stage");
    assert_eq!(field_label(&undeclared, &NoLabels), "status");

    assert_eq!(resolve_label("owner", None, &table), "owner");
    assert_eq!(resolve_label("owner", Some(""), &table), "owner");

    assert_eq!(field_icon(&undeclared, &table).as_deref(), Some("flag"));
    let mut with_icon = undeclared.clone();
    with_icon.icon = Some("star".to_string());
    assert_eq!(field_icon(&with_icon, &table).as_deref(), Some("star"));
    assert_eq!(field_icon(&undeclared, &NoLabels), None);
}
