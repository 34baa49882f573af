use bitmap_atlas_core::pipeline::pack_blocks_with;
use bitmap_atlas_core::prelude::*;
use bitmap_atlas_core::{Placement, RectOracle};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn panel(name: &str, class: Option<&str>, bitmaps: Vec<Element>) -> LibraryItem {
    LibraryItem {
        name: name.to_string(),
        linkage_class_name: class.map(str::to_string),
        timeline: Some(Timeline {
            layers: Some(vec![Layer {
                name: "Layer 1".into(),
                layer_type: LayerKind::Normal,
                frames: Some(vec![Frame {
                    start_frame: 0,
                    elements: Some(bitmaps),
                }]),
            }]),
        }),
    }
}

fn ui_document() -> Document {
    Document {
        items: vec![
            panel(
                "ShopPanel",
                Some("ui.ShopPanel"),
                vec![
                    Element::bitmap("shop_bg", 120, 80),
                    Element::bitmap("coin", 16, 16),
                ],
            ),
            panel(
                "BagPanel",
                Some("ui.BagPanel"),
                vec![
                    Element::bitmap("bag_bg", 100, 90),
                    Element::bitmap("coin", 16, 16),
                ],
            ),
            panel("OkBtn", Some("ui.OkBtn"), vec![Element::bitmap("ok_up", 40, 20)]),
        ],
    }
}

#[test]
fn pack_document_commits_every_block() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(256, 256)
        .texture_padding(2)
        .seed(Some(7))
        .build();
    let out = pack_document(&ui_document(), &cfg).expect("pack");

    assert_eq!(out.layout.records.len(), 4);
    assert_eq!(out.layout.winner, "rotation0");
    assert_eq!(out.stats().attempts, 4 + 29);
    assert_eq!(out.layout.score, 120 * 80 + 16 * 16 + 100 * 90 + 40 * 20);

    let indices: Vec<usize> = out.layout.records.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);

    // committed back into the collector by name
    for rec in &out.layout.records {
        let block = out.collector.get(&rec.name).expect("collected");
        assert_eq!(block.index, Some(rec.index));
        assert_eq!(block.placement, Some(Placement { x: rec.x, y: rec.y }));
    }

    let coin = out.collector.get("coin").expect("coin");
    let refs: Vec<&str> = coin.refs.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(refs, vec!["ShopPanel", "BagPanel"]);
}

#[test]
fn atlas_size_includes_trailing_padding_and_border() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(128, 128)
        .border_padding(4)
        .texture_padding(6)
        .family(AlgorithmFamily::Skyline)
        .build();
    let layout = pack_blocks(&[Block::new("only", 10, 10)], &cfg).expect("pack");
    let rec = &layout.records[0];
    assert_eq!((rec.x, rec.y), (7, 7));
    assert_eq!((layout.width, layout.height), (24, 24));
    assert_eq!(layout.stats.used_area, 100);
    assert_eq!(layout.stats.atlas_area, 24 * 24);
    assert_eq!(layout.stats.wasted_area(), 24 * 24 - 100);
    let expected = format!("Waste: {:.2}%", layout.stats.waste_percentage());
    assert!(layout.stats.summary().contains(&expected));
}

#[test]
fn empty_input_gives_empty_layout() {
    let layout = pack_blocks(&[], &PackerConfig::default()).expect("pack");
    assert!(layout.records.is_empty());
    assert_eq!(layout.winner, "w");
    assert_eq!(layout.score, 0);
    assert_eq!((layout.width, layout.height), (0, 0));
    assert_eq!(layout.stats.attempts, 29);
    assert_eq!(layout.stats.occupancy, 0.0);
}

#[test]
fn oversized_block_exhausts_the_search() {
    let cfg = PackerConfig::builder().with_max_dimensions(256, 256).build();
    let blocks = vec![Block::new("poster", 300, 100), Block::new("icon", 8, 8)];
    match pack_blocks(&blocks, &cfg) {
        Err(AtlasError::PackingExhausted { blocks, attempts }) => {
            assert_eq!(blocks, 2);
            assert_eq!(attempts, 31);
        }
        other => panic!("expected PackingExhausted, got {:?}", other.map(|l| l.winner)),
    }
}

#[test]
fn invalid_config_is_rejected_before_searching() {
    let zero = PackerConfig::builder().with_max_dimensions(0, 64).build();
    assert!(matches!(
        pack_blocks(&[Block::new("a", 1, 1)], &zero),
        Err(AtlasError::InvalidDimensions { width: 0, height: 64 })
    ));

    let thick = PackerConfig::builder()
        .with_max_dimensions(64, 64)
        .border_padding(32)
        .build();
    match thick.validate() {
        Err(AtlasError::InvalidConfig(msg)) => assert!(msg.contains("border_padding")),
        other => panic!("expected InvalidConfig, got {:?}", other),
    }
}

#[test]
fn seeded_searches_agree() {
    let blocks: Vec<Block> = (0..10u32)
        .map(|i| Block::new(format!("tile{}", i), 20 + (i * 7) % 30, 15 + (i * 11) % 25))
        .collect();
    let cfg = PackerConfig::builder()
        .with_max_dimensions(256, 256)
        .family(AlgorithmFamily::Guillotine)
        .score_metric(ScoreMetric::BoundingArea)
        .seed(Some(2024))
        .build();
    let a = pack_blocks(&blocks, &cfg).expect("first");
    let b = pack_blocks(&blocks, &cfg).expect("second");
    assert_eq!(a.winner, b.winner);
    assert_eq!(a.records, b.records);
}

#[test]
fn injected_factory_and_progress_callback() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(64, 64)
        .family(AlgorithmFamily::Skyline)
        .build();
    let blocks = vec![
        Block::new("a", 30, 30),
        Block::new("b", 30, 30),
        Block::new("c", 30, 30),
    ];
    let mut calls = 0;
    let mut fits = 0;
    let layout = pack_blocks_with(
        &blocks,
        &cfg,
        &|| RectOracle::new(&cfg),
        &mut StdRng::seed_from_u64(1),
        |o| {
            calls += 1;
            if o.is_fit() {
                fits += 1;
            }
        },
    )
    .expect("pack");
    assert_eq!(calls, 32);
    assert_eq!(fits, 32);
    assert_eq!(layout.stats.successful, 32);
    assert_eq!(layout.winner, "rotation0");
}

#[test]
fn json_metadata_shape() {
    let cfg = PackerConfig::builder().with_max_dimensions(256, 256).build();
    let out = pack_document(&ui_document(), &cfg).expect("pack");
    let json = to_json(&out.layout);

    let images = json["images"].as_array().expect("images array");
    assert_eq!(images.len(), 4);
    for key in ["name", "index", "x", "y", "width", "height", "refs"] {
        assert!(images[0].get(key).is_some(), "missing `{}`", key);
    }
    assert_eq!(json["meta"]["app"], "bitmap-atlas");
    assert_eq!(json["meta"]["winner"], "rotation0");
    assert_eq!(json["meta"]["attempts"], 33);
    assert_eq!(json["meta"]["width"], out.layout.width);
}

#[test]
fn invalid_document_surfaces_validation_error() {
    let mut doc = ui_document();
    doc.items.push(LibraryItem {
        name: "Orphan".into(),
        linkage_class_name: None,
        timeline: None,
    });
    match pack_document(&doc, &PackerConfig::default()) {
        Err(AtlasError::Validation { item, .. }) => assert_eq!(item, "Orphan"),
        other => panic!("expected Validation, got {:?}", other.map(|o| o.layout.winner)),
    }
}
