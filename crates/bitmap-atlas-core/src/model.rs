use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn right(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
    /// Returns true if `r` is fully inside `self`. Edges are compared in `u64`
    /// so oversized candidates cannot wrap.
    pub fn contains(&self, r: &Rect) -> bool {
        let edge = |o: u32, len: u32| o as u64 + len as u64;
        r.x >= self.x
            && r.y >= self.y
            && edge(r.x, r.w) <= edge(self.x, self.w)
            && edge(r.y, r.h) <= edge(self.y, self.h)
    }
    pub fn intersects(&self, r: &Rect) -> bool {
        !(self.x >= r.right() || r.x >= self.right() || self.y >= r.bottom() || r.y >= self.bottom())
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
}

/// Top-left coordinate assigned to a block by an oracle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

/// Identity of a root item within one collection pass.
///
/// Two items are the same reference only when `index` matches; the name is
/// carried for reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ItemRef {
    pub index: usize,
    pub name: String,
}

/// One distinct bitmap asset to pack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    /// Library name of the bitmap; unique within a collection pass.
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Library asset the block stands for.
    pub asset: String,
    /// Root items referencing this bitmap, in first-seen order.
    pub refs: Vec<ItemRef>,
    #[serde(default)]
    pub placement: Option<Placement>,
    #[serde(default)]
    pub index: Option<usize>,
}

impl Block {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        let name = name.into();
        Self {
            asset: name.clone(),
            name,
            width,
            height,
            refs: Vec::new(),
            placement: None,
            index: None,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn max_side(&self) -> u32 {
        self.width.max(self.height)
    }

    pub fn min_side(&self) -> u32 {
        self.width.min(self.height)
    }

    /// Appends `item` unless the same identity is already referenced.
    /// Returns true when the reference was new.
    pub fn add_ref(&mut self, item: ItemRef) -> bool {
        if self.refs.iter().any(|r| r.index == item.index) {
            return false;
        }
        self.refs.push(item);
        true
    }

    /// Placed rectangle, if the block has a placement.
    pub fn rect(&self) -> Option<Rect> {
        self.placement
            .map(|p| Rect::new(p.x, p.y, self.width, self.height))
    }

    /// Forgets any placement/index from a previous attempt.
    pub fn reset(&mut self) {
        self.placement = None;
        self.index = None;
    }
}

/// Successful packing attempt: every block placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackResult {
    /// Label of the ordering that produced it (`rotation0`, `area`, `random3`...).
    pub label: String,
    /// Position of that ordering in generation order.
    pub generation: usize,
    /// Block clones carrying this attempt's placements, in packing order.
    pub placements: Vec<Block>,
    pub score: u64,
}

/// What happened to one attempt.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Fit(PackResult),
    NoFit {
        label: String,
        generation: usize,
        /// Position of the first block the oracle left unplaced.
        first_failure: usize,
    },
}

impl AttemptOutcome {
    pub fn label(&self) -> &str {
        match self {
            AttemptOutcome::Fit(r) => &r.label,
            AttemptOutcome::NoFit { label, .. } => label,
        }
    }

    pub fn is_fit(&self) -> bool {
        matches!(self, AttemptOutcome::Fit(_))
    }
}

/// Per-image metadata record handed to exporters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportRecord {
    pub name: String,
    pub index: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Names of the root items referencing this image.
    pub refs: Vec<String>,
}

/// The committed winner of a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasLayout {
    /// Blocks in placement order with `index` = position.
    pub blocks: Vec<Block>,
    pub records: Vec<ExportRecord>,
    /// Atlas canvas size needed to hold every placement.
    pub width: u32,
    pub height: u32,
    pub winner: String,
    pub score: u64,
    pub stats: LayoutStats,
}

/// Statistics about a search and its winning layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LayoutStats {
    /// Number of distinct blocks packed.
    pub blocks: usize,
    /// Orderings tried.
    pub attempts: usize,
    /// Orderings that placed every block.
    pub successful: usize,
    /// Sum of block areas.
    pub used_area: u64,
    /// Atlas width * height.
    pub atlas_area: u64,
    /// used_area / atlas_area (0.0 to 1.0). Higher is better.
    pub occupancy: f64,
}

impl LayoutStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Blocks: {}, Attempts: {} ({} fit), Occupancy: {:.2}%, Waste: {:.2}%, Atlas Area: {} px², Used Area: {} px²",
            self.blocks,
            self.attempts,
            self.successful,
            self.occupancy * 100.0,
            self.waste_percentage(),
            self.atlas_area,
            self.used_area,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.atlas_area.saturating_sub(self.used_area)
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.atlas_area > 0 {
            (self.wasted_area() as f64 / self.atlas_area as f64) * 100.0
        } else {
            0.0
        }
    }
}
