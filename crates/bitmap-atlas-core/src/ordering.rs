//! Candidate block orderings tried by the search.
//!
//! Three families are generated, in this order:
//! - `rotation0..rotation{N-1}`: every starting offset of the collected order;
//! - nine descending sorts (`w`, `h`, `a`, `max`, `min`, `height`, `width`, `area`, `maxside`);
//! - `random0..random19`: uniform shuffles.
//!
//! That is always `N + 29` orderings; each owns a private clone of the blocks.

use std::cmp::Ordering as CmpOrdering;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::Block;

/// Number of random shuffles per search.
pub const RANDOM_SHUFFLES: usize = 20;

/// Orderings generated on top of the `N` rotations.
pub const FIXED_ORDERINGS: usize = SortKey::ALL.len() + RANDOM_SHUFFLES;

/// A candidate order of blocks, ready to hand to an oracle.
#[derive(Debug, Clone)]
pub struct Ordering {
    pub label: String,
    /// Position in generation order; breaks score ties.
    pub generation: usize,
    pub blocks: Vec<Block>,
}

/// Single-key descending comparators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Width,
    Height,
    Area,
    MaxSide,
    MinSide,
}

impl Primitive {
    fn key(self, b: &Block) -> u64 {
        match self {
            Primitive::Width => b.width as u64,
            Primitive::Height => b.height as u64,
            Primitive::Area => b.area(),
            Primitive::MaxSide => b.max_side() as u64,
            Primitive::MinSide => b.min_side() as u64,
        }
    }

    /// Larger key first.
    pub fn compare(self, a: &Block, b: &Block) -> CmpOrdering {
        self.key(b).cmp(&self.key(a))
    }
}

/// The nine fixed sorts; composites cascade through primitives until one differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    W,
    H,
    A,
    Max,
    Min,
    Height,
    Width,
    Area,
    MaxSide,
}

impl SortKey {
    /// Generation order of the sort family.
    pub const ALL: [SortKey; 9] = [
        SortKey::W,
        SortKey::H,
        SortKey::A,
        SortKey::Max,
        SortKey::Min,
        SortKey::Height,
        SortKey::Width,
        SortKey::Area,
        SortKey::MaxSide,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::W => "w",
            SortKey::H => "h",
            SortKey::A => "a",
            SortKey::Max => "max",
            SortKey::Min => "min",
            SortKey::Height => "height",
            SortKey::Width => "width",
            SortKey::Area => "area",
            SortKey::MaxSide => "maxside",
        }
    }

    pub fn criteria(self) -> &'static [Primitive] {
        use Primitive::*;
        match self {
            SortKey::W => &[Width],
            SortKey::H => &[Height],
            SortKey::A => &[Area],
            SortKey::Max => &[MaxSide],
            SortKey::Min => &[MinSide],
            SortKey::Height => &[Height, Width],
            SortKey::Width => &[Width, Height],
            SortKey::Area => &[Area, Height, Width],
            SortKey::MaxSide => &[MaxSide, MinSide, Height, Width],
        }
    }

    pub fn compare(self, a: &Block, b: &Block) -> CmpOrdering {
        self.criteria()
            .iter()
            .map(|p| p.compare(a, b))
            .find(|o| *o != CmpOrdering::Equal)
            .unwrap_or(CmpOrdering::Equal)
    }

    /// Stable sort of a copy of `blocks`.
    pub fn sorted(self, blocks: &[Block]) -> Vec<Block> {
        let mut out = blocks.to_vec();
        out.sort_by(|a, b| self.compare(a, b));
        out
    }
}

/// `[b_k, .., b_{n-1}, b_0, .., b_{k-1}]`. Panics if `k > blocks.len()`.
pub fn rotation(blocks: &[Block], k: usize) -> Vec<Block> {
    let mut out = Vec::with_capacity(blocks.len());
    out.extend_from_slice(&blocks[k..]);
    out.extend_from_slice(&blocks[..k]);
    out
}

/// Builds every candidate ordering of `blocks`, drawing shuffles from `rng`.
pub fn generate_orderings<R: Rng + ?Sized>(blocks: &[Block], rng: &mut R) -> Vec<Ordering> {
    let n = blocks.len();
    let mut out: Vec<Ordering> = Vec::with_capacity(n + FIXED_ORDERINGS);

    for k in 0..n {
        out.push(Ordering {
            label: format!("rotation{}", k),
            generation: out.len(),
            blocks: rotation(blocks, k),
        });
    }

    for key in SortKey::ALL {
        out.push(Ordering {
            label: key.label().to_string(),
            generation: out.len(),
            blocks: key.sorted(blocks),
        });
    }

    for t in 0..RANDOM_SHUFFLES {
        let mut shuffled = blocks.to_vec();
        shuffled.shuffle(rng);
        out.push(Ordering {
            label: format!("random{}", t),
            generation: out.len(),
            blocks: shuffled,
        });
    }

    out
}
