use serde_json::{Value, json};

use crate::config::PackerConfig;
use crate::error::Result;
use crate::model::{AtlasLayout, ExportRecord, LayoutStats, Rect};
use crate::selector::Selection;

/// Consumer of a finished layout (metadata writer, template, preview...).
pub trait AtlasExporter {
    fn export(&mut self, layout: &AtlasLayout) -> Result<()>;
}

/// Freezes the winning attempt: assigns `index` 0..n-1 in placement order and
/// builds the export records and atlas size.
pub fn commit(selection: Selection, cfg: &PackerConfig) -> AtlasLayout {
    let Selection {
        best,
        attempts,
        successful,
    } = selection;
    let mut blocks = best.placements;
    let mut records = Vec::with_capacity(blocks.len());
    let mut width = 0u32;
    let mut height = 0u32;
    for (index, block) in blocks.iter_mut().enumerate() {
        block.index = Some(index);
        // every block of a selected attempt is placed
        let rect = block.rect().unwrap_or(Rect::new(0, 0, 0, 0));
        width = width.max(rect.right());
        height = height.max(rect.bottom());
        records.push(ExportRecord {
            name: block.name.clone(),
            index,
            x: rect.x,
            y: rect.y,
            width: block.width,
            height: block.height,
            refs: block.refs.iter().map(|r| r.name.clone()).collect(),
        });
    }
    if !blocks.is_empty() {
        // trailing half of the slot padding plus the border on the far sides
        let pad_rem = cfg.texture_padding - cfg.texture_padding / 2;
        width += pad_rem + cfg.border_padding;
        height += pad_rem + cfg.border_padding;
    }

    let used_area: u64 = blocks.iter().map(|b| b.area()).sum();
    let atlas_area = width as u64 * height as u64;
    let stats = LayoutStats {
        blocks: blocks.len(),
        attempts,
        successful,
        used_area,
        atlas_area,
        occupancy: if atlas_area > 0 {
            used_area as f64 / atlas_area as f64
        } else {
            0.0
        },
    };
    AtlasLayout {
        blocks,
        records,
        width,
        height,
        winner: best.label,
        score: best.score,
        stats,
    }
}

/// Serialize a layout as `{ images, meta }`.
/// `images` holds one `{name, index, x, y, width, height, refs}` record per block.
pub fn to_json(layout: &AtlasLayout) -> Value {
    json!({
        "images": &layout.records,
        "meta": {
            "app": "bitmap-atlas",
            "version": env!("CARGO_PKG_VERSION"),
            "width": layout.width,
            "height": layout.height,
            "winner": &layout.winner,
            "score": layout.score,
            "attempts": layout.stats.attempts,
            "successful": layout.stats.successful,
        }
    })
}
