//! Catalog tests

use super::*;
use crate::streams::StreamRegistry;
use crate::types::ReplicationMethod;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;

fn catalog_with(streams: serde_json::Value) -> Catalog {
    serde_json::from_value(json!({ "streams": streams })).unwrap()
}

fn stream_entry(name: &str, metadata: serde_json::Value) -> serde_json::Value {
    json!({"tap_stream_id": name, "stream": name, "metadata": metadata})
}

#[test]
fn test_discover_entries() {
    let registry = StreamRegistry::contentquo();
    let catalog = Catalog::discover(&registry);
    assert_eq!(catalog.streams.len(), 7);

    let evaluations = catalog.get("evaluations").unwrap();
    assert_eq!(evaluations.key_properties, vec!["eid".to_string()]);
    assert_eq!(evaluations.replication_method, ReplicationMethod::FullTable);
    assert_eq!(evaluations.schema["additionalProperties"], json!(false));

    let root = evaluations.stream_metadata().unwrap();
    assert_eq!(root.inclusion(), Some("available"));
    assert_eq!(root.selected_by_default(), Some(true));
    assert_eq!(root.metadata["table-key-properties"], json!(["eid"]));
    assert_eq!(root.metadata["forced-replication-method"], json!("FULL_TABLE"));
}

#[test]
fn test_discover_property_breadcrumbs() {
    let registry = StreamRegistry::contentquo();
    let catalog = Catalog::discover(&registry);
    let entry = catalog.get("evaluations").unwrap();

    let eid = entry
        .metadata
        .iter()
        .find(|m| m.property() == Some("eid"))
        .unwrap();
    assert_eq!(eid.breadcrumb, vec!["properties", "eid"]);
    assert_eq!(eid.inclusion(), Some("automatic"));

    let name = entry
        .metadata
        .iter()
        .find(|m| m.property() == Some("name"))
        .unwrap();
    assert_eq!(name.inclusion(), Some("available"));

    // one breadcrumb per top-level property plus the stream itself
    assert_eq!(entry.metadata.len(), 20);

    let details = catalog.get("evaluation_details").unwrap();
    assert_eq!(
        details.stream_metadata().unwrap().metadata["parent-tap-stream-id"],
        json!("evaluations")
    );
}

#[test]
fn test_discovered_catalog_selects_everything() {
    let registry = StreamRegistry::contentquo();
    let catalog = Catalog::discover(&registry);
    let selection = Selection::from_catalog(&catalog, &registry);

    for name in registry.names() {
        assert!(selection.is_selected(name), "{name}");
        assert!(selection.deselected_properties(name).is_empty());
    }
}

#[test]
fn test_stream_selection_rules() {
    let catalog = catalog_with(json!([
        stream_entry("evaluations", json!([{"breadcrumb": [], "metadata": {"selected": false, "selected-by-default": true}}])),
        stream_entry("evaluation_details", json!([{"breadcrumb": [], "metadata": {"selected": true}}])),
        stream_entry("users", json!([{"breadcrumb": [], "metadata": {"selected-by-default": true}}])),
        stream_entry("user_details", json!([{"breadcrumb": [], "metadata": {}}])),
    ]));

    let entries: Vec<bool> = catalog.streams.iter().map(|e| e.is_selected()).collect();
    assert_eq!(entries, vec![false, true, true, false]);
}

#[test]
fn test_parent_runs_for_selected_child() {
    let registry = StreamRegistry::contentquo();
    let catalog = catalog_with(json!([
        stream_entry("evaluation_details", json!([{"breadcrumb": [], "metadata": {"selected": true}}])),
    ]));
    let selection = Selection::from_catalog(&catalog, &registry);

    assert!(!selection.is_selected("evaluations"));
    assert!(selection.should_sync("evaluations", &registry));
    assert!(selection.should_sync("evaluation_details", &registry));
    assert!(!selection.should_sync("users", &registry));
    assert!(!selection.should_sync("evaluation_issues", &registry));
    assert_eq!(selection.selected_streams(), vec!["evaluation_details"]);
}

#[test]
fn test_property_deselection_keeps_keys() {
    let registry = StreamRegistry::contentquo();
    let catalog = catalog_with(json!([
        stream_entry("evaluations", json!([
            {"breadcrumb": [], "metadata": {"selected": true}},
            {"breadcrumb": ["properties", "name"], "metadata": {"selected": false}},
            {"breadcrumb": ["properties", "eid"], "metadata": {"selected": false}},
            {"breadcrumb": ["properties", "scope"], "metadata": {"selected": true}},
        ])),
    ]));
    let selection = Selection::from_catalog(&catalog, &registry);

    let deselected = selection.deselected_properties("evaluations");
    assert!(deselected.contains("name"));
    assert!(!deselected.contains("eid"));
    assert!(!deselected.contains("scope"));
}

#[test]
fn test_unknown_catalog_stream_ignored() {
    let registry = StreamRegistry::contentquo();
    let catalog = catalog_with(json!([
        stream_entry("quality_profiles", json!([{"breadcrumb": [], "metadata": {"selected": true}}])),
    ]));
    let selection = Selection::from_catalog(&catalog, &registry);
    assert!(selection.selected_streams().is_empty());
}

#[test]
fn test_selection_all() {
    let registry = StreamRegistry::contentquo();
    let selection = Selection::all(&registry);
    assert_eq!(selection.selected_streams().len(), 7);
}

#[test]
fn test_catalog_from_file() {
    let registry = StreamRegistry::contentquo();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", Catalog::discover(&registry).to_json()).unwrap();

    let catalog = Catalog::from_file(file.path()).unwrap();
    assert_eq!(catalog, Catalog::discover(&registry));
}

#[test]
fn test_catalog_errors() {
    assert!(Catalog::from_json("not json").is_err());
    assert!(Catalog::from_file("/nonexistent/catalog.json").is_err());
}
