use bitmap_atlas_core::error::AtlasError;
use bitmap_atlas_core::prelude::*;
use serde_json::json;

fn doc(value: serde_json::Value) -> Document {
    serde_json::from_value(value).expect("document")
}

fn bitmap(name: &str, w: u32, h: u32) -> serde_json::Value {
    json!({
        "elementType": "instance",
        "instanceType": "bitmap",
        "libraryItem": { "name": name },
        "hPixels": w,
        "vPixels": h
    })
}

fn item(name: &str, layers: serde_json::Value) -> serde_json::Value {
    json!({ "name": name, "timeline": { "layers": layers } })
}

fn normal_layer(frames: serde_json::Value) -> serde_json::Value {
    json!({ "name": "art", "layerType": "normal", "frames": frames })
}

#[test]
fn one_block_per_distinct_bitmap() {
    let d = doc(json!({ "items": [
        item("PanelA", json!([normal_layer(json!([
            { "startFrame": 0, "elements": [bitmap("bg", 100, 50), bitmap("icon", 16, 16), bitmap("bg", 100, 50)] }
        ]))])),
        item("PanelB", json!([normal_layer(json!([
            { "startFrame": 0, "elements": [bitmap("icon", 16, 16), bitmap("bar", 64, 8)] }
        ]))])),
    ]}));

    let blocks = AssetCollector::collect(&d.items).expect("collect");
    let names: Vec<&str> = blocks.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["bg", "icon", "bar"]);

    let bg = &blocks[0];
    assert_eq!(bg.refs.len(), 1, "same item referencing twice is one ref");
    assert_eq!(bg.refs[0].name, "PanelA");

    let icon = &blocks[1];
    let refs: Vec<&str> = icon.refs.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(refs, vec!["PanelA", "PanelB"]);
}

#[test]
fn first_instance_decides_size() {
    let d = doc(json!({ "items": [
        item("A", json!([normal_layer(json!([
            { "startFrame": 0, "elements": [bitmap("logo", 40, 20), bitmap("logo", 80, 40)] }
        ]))])),
        item("B", json!([normal_layer(json!([
            { "startFrame": 0, "elements": [bitmap("logo", 10, 10)] }
        ]))])),
    ]}));
    let blocks = AssetCollector::collect(&d.items).expect("collect");
    assert_eq!(blocks.len(), 1);
    assert_eq!((blocks[0].width, blocks[0].height), (40, 20));
    assert_eq!(blocks[0].refs.len(), 2);
}

#[test]
fn refs_compare_identity_not_name() {
    // two distinct root items sharing a name are two references
    let layers = json!([normal_layer(json!([
        { "startFrame": 0, "elements": [bitmap("shared", 8, 8)] }
    ]))]);
    let d = doc(json!({ "items": [item("Dup", layers.clone()), item("Dup", layers)] }));
    let blocks = AssetCollector::collect(&d.items).expect("collect");
    assert_eq!(blocks[0].refs.len(), 2);
    assert_eq!(blocks[0].refs[0].index, 0);
    assert_eq!(blocks[0].refs[1].index, 1);
}

#[test]
fn skips_non_normal_layers_tweens_and_other_elements() {
    let d = doc(json!({ "items": [item("P", json!([
        { "name": "g", "layerType": "guide", "frames": [
            { "startFrame": 0, "elements": [bitmap("in_guide", 5, 5)] }
        ]},
        { "name": "m", "layerType": "mask", "frames": [
            { "startFrame": 0, "elements": [bitmap("in_mask", 5, 5)] }
        ]},
        { "name": "f", "layerType": "folder" },
        normal_layer(json!([
            { "startFrame": 0, "elements": [bitmap("key0", 10, 10)] },
            { "startFrame": 0, "elements": [bitmap("tween", 10, 10)] },
            { "startFrame": 2, "elements": [
                bitmap("key2", 12, 12),
                { "elementType": "instance", "instanceType": "symbol", "libraryItem": { "name": "sym" } },
                { "elementType": "shape" },
                { "elementType": "text" }
            ]}
        ]))
    ]))]}));
    let blocks = AssetCollector::collect(&d.items).expect("collect");
    let names: Vec<&str> = blocks.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["key0", "key2"]);
}

#[test]
fn unknown_kinds_are_skipped() {
    let d = doc(json!({ "items": [item("P", json!([
        { "name": "x", "layerType": "somethingnew", "frames": [
            { "startFrame": 0, "elements": [bitmap("hidden", 5, 5)] }
        ]},
        normal_layer(json!([
            { "startFrame": 0, "elements": [
                { "elementType": "hologram" },
                bitmap("seen", 3, 3)
            ]}
        ]))
    ]))]}));
    let blocks = AssetCollector::collect(&d.items).expect("collect");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].name, "seen");
}

#[test]
fn missing_timeline_is_validation_error() {
    let d = doc(json!({ "items": [ { "name": "Broken" } ] }));
    match AssetCollector::collect(&d.items) {
        Err(AtlasError::Validation { item, .. }) => assert_eq!(item, "Broken"),
        other => panic!("expected Validation error, got {:?}", other),
    }
}

#[test]
fn missing_layers_is_validation_error() {
    let d = doc(json!({ "items": [
        item("Fine", json!([normal_layer(json!([
            { "startFrame": 0, "elements": [bitmap("ok", 4, 4)] }
        ]))])),
        { "name": "NoLayers", "timeline": {} }
    ]}));
    match AssetCollector::collect(&d.items) {
        Err(AtlasError::Validation { item, reason }) => {
            assert_eq!(item, "NoLayers");
            assert!(reason.contains("layers"));
        }
        other => panic!("expected Validation error, got {:?}", other),
    }
}

#[test]
fn zero_sized_bitmap_is_validation_error() {
    let d = doc(json!({ "items": [item("Z", json!([normal_layer(json!([
        { "startFrame": 0, "elements": [bitmap("flat", 0, 10)] }
    ]))]))]}));
    assert!(matches!(
        AssetCollector::collect(&d.items),
        Err(AtlasError::Validation { .. })
    ));
}

#[test]
fn failed_item_leaves_collector_untouched() {
    let good = doc(json!({ "items": [item("Good", json!([normal_layer(json!([
        { "startFrame": 0, "elements": [bitmap("a", 4, 4)] }
    ]))]))]}));
    // the bitmap before the malformed frame must not be recorded
    let bad = doc(json!({ "items": [item("Bad", json!([normal_layer(json!([
        { "startFrame": 0, "elements": [bitmap("b", 4, 4)] },
        { "startFrame": 1 }
    ]))]))]}));

    let mut c = AssetCollector::new();
    c.check_item(0, &good.items[0]).expect("good item");
    assert!(c.check_item(1, &bad.items[0]).is_err());
    assert_eq!(c.len(), 1);
    assert!(c.get("b").is_none());
}

#[test]
fn collection_is_reproducible() {
    let d = doc(json!({ "items": [
        item("A", json!([normal_layer(json!([
            { "startFrame": 0, "elements": [bitmap("z", 1, 1), bitmap("y", 2, 2), bitmap("x", 3, 3)] }
        ]))])),
    ]}));
    let first = AssetCollector::collect(&d.items).expect("collect");
    let second = AssetCollector::collect(&d.items).expect("collect");
    assert_eq!(first, second);
}
