use bitmap_atlas_core::Block;
use bitmap_atlas_core::ordering::{FIXED_ORDERINGS, SortKey, generate_orderings, rotation};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn names(blocks: &[Block]) -> Vec<&str> {
    blocks.iter().map(|b| b.name.as_str()).collect()
}

fn sample() -> Vec<Block> {
    vec![
        Block::new("a", 30, 10),
        Block::new("b", 10, 40),
        Block::new("c", 20, 20),
        Block::new("d", 5, 5),
    ]
}

#[test]
fn count_and_labels() {
    let blocks = sample();
    let mut rng = StdRng::seed_from_u64(1);
    let orderings = generate_orderings(&blocks, &mut rng);
    assert_eq!(orderings.len(), blocks.len() + FIXED_ORDERINGS);
    assert_eq!(orderings.len(), 33);

    let labels: Vec<&str> = orderings.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(&labels[..4], &["rotation0", "rotation1", "rotation2", "rotation3"]);
    assert_eq!(
        &labels[4..13],
        &["w", "h", "a", "max", "min", "height", "width", "area", "maxside"]
    );
    assert_eq!(labels[13], "random0");
    assert_eq!(labels[32], "random19");

    for (i, o) in orderings.iter().enumerate() {
        assert_eq!(o.generation, i);
    }
}

#[test]
fn empty_input_still_yields_sorts_and_shuffles() {
    let mut rng = StdRng::seed_from_u64(0);
    let orderings = generate_orderings(&[], &mut rng);
    assert_eq!(orderings.len(), FIXED_ORDERINGS);
    assert_eq!(orderings[0].label, "w");
    assert!(orderings.iter().all(|o| o.blocks.is_empty()));
}

#[test]
fn rotations_are_permutations_starting_at_k() {
    let blocks = sample();
    for k in 0..blocks.len() {
        let rot = rotation(&blocks, k);
        assert_eq!(rot.len(), blocks.len());
        assert_eq!(rot[0].name, blocks[k].name);
        let mut sorted = names(&rot);
        sorted.sort();
        assert_eq!(sorted, vec!["a", "b", "c", "d"]);
    }
    assert_eq!(names(&rotation(&blocks, 2)), vec!["c", "d", "a", "b"]);
}

#[test]
fn height_sort_breaks_ties_on_width() {
    let blocks = vec![Block::new("B", 5, 20), Block::new("A", 10, 20)];
    assert_eq!(names(&SortKey::Height.sorted(&blocks)), vec!["A", "B"]);
}

#[test]
fn area_sort_breaks_ties_on_height() {
    let blocks = vec![Block::new("C", 8, 5), Block::new("D", 4, 10)];
    assert_eq!(names(&SortKey::Area.sorted(&blocks)), vec!["D", "C"]);
}

#[test]
fn single_key_sorts_are_stable() {
    let blocks = vec![
        Block::new("first", 10, 1),
        Block::new("wide", 50, 1),
        Block::new("second", 10, 9),
    ];
    // equal widths keep their collected order
    assert_eq!(
        names(&SortKey::W.sorted(&blocks)),
        vec!["wide", "first", "second"]
    );
}

#[test]
fn maxside_cascades_through_min_side() {
    let blocks = vec![
        Block::new("thin", 40, 2),
        Block::new("thick", 40, 30),
        Block::new("tall", 3, 40),
    ];
    assert_eq!(
        names(&SortKey::MaxSide.sorted(&blocks)),
        vec!["thick", "tall", "thin"]
    );
}

#[test]
fn sorts_are_descending() {
    let blocks = sample();
    let w = SortKey::W.sorted(&blocks);
    assert!(w.windows(2).all(|p| p[0].width >= p[1].width));
    let min = SortKey::Min.sorted(&blocks);
    assert!(min.windows(2).all(|p| p[0].min_side() >= p[1].min_side()));
}

#[test]
fn shuffles_are_permutations() {
    let blocks = sample();
    let mut rng = StdRng::seed_from_u64(99);
    for o in generate_orderings(&blocks, &mut rng)
        .iter()
        .filter(|o| o.label.starts_with("random"))
    {
        let mut got = names(&o.blocks);
        got.sort();
        assert_eq!(got, vec!["a", "b", "c", "d"]);
    }
}

#[test]
fn seeded_generation_is_reproducible() {
    let blocks: Vec<Block> = (0..12)
        .map(|i| Block::new(format!("img{}", i), 10 + i, 30 - i))
        .collect();
    let a = generate_orderings(&blocks, &mut StdRng::seed_from_u64(42));
    let b = generate_orderings(&blocks, &mut StdRng::seed_from_u64(42));
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b.iter()) {
        assert_eq!(x.label, y.label);
        assert_eq!(names(&x.blocks), names(&y.blocks));
    }
}

#[test]
fn orderings_own_their_blocks() {
    let blocks = sample();
    let mut orderings = generate_orderings(&blocks, &mut StdRng::seed_from_u64(3));
    orderings[0].blocks[0].width = 999;
    assert_eq!(orderings[1].blocks.iter().find(|b| b.name == "a").map(|b| b.width), Some(30));
    assert_eq!(blocks[0].width, 30);
}
