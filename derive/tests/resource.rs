use serde::Deserialize;

use osroute::{MarkerResource, Resource};

#[derive(Debug, Deserialize, Resource)]
struct SimpleResource {
    #[resource_id]
    pub id: String,
    #[allow(dead_code)]
    pub not_id: String,
}

#[derive(Debug, Deserialize, Resource)]
#[collection_name = "items"]
struct RenamedResource {
    #[resource_id]
    pub id: u64,
}

#[derive(Debug, Deserialize, Resource)]
struct Address {
    #[allow(dead_code)]
    pub addr: String,
}

#[test]
fn test_simple_derive() {
    assert_eq!(SimpleResource::collection_name(), "simple_resources");

    let res = SimpleResource {
        id: "the id".into(),
        not_id: "not id".into(),
    };
    let res_id: String = res.resource_id();
    assert_eq!(&res_id, "the id");

    let json: serde_json::Value = serde_json::from_str(
        r#"{"simple_resources": [{"id": "1", "not_id": "abcd"}, {"id": "2", "not_id": "dcba"}]}"#,
    )
    .unwrap();
    let resources: Vec<SimpleResource> =
        serde_json::from_value(json[SimpleResource::collection_name()].clone()).unwrap();
    assert_eq!(resources.len(), 2);
}

#[test]
fn test_renamed_collection() {
    assert_eq!(RenamedResource::collection_name(), "items");
    let res = RenamedResource { id: 42 };
    assert_eq!(res.resource_id(), 42);
}

#[test]
fn test_without_marker() {
    assert_eq!(Address::collection_name(), "addresses");
}
