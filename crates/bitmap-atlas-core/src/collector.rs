//! Deduplicates the bitmaps referenced by authored timelines into [`Block`]s.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::document::{LayerKind, LibraryItem};
use crate::error::{AtlasError, Result};
use crate::model::{AtlasLayout, Block, ItemRef};

/// Walks root items and keeps one [`Block`] per distinct bitmap name.
///
/// Only normal layers, keyframes and bitmap instances are considered. The first
/// instance of a bitmap decides the block size; later instances only add the
/// referencing root item to `refs`.
#[derive(Debug, Default, Clone)]
pub struct AssetCollector {
    lookup: HashMap<String, usize>,
    blocks: Vec<Block>,
}

impl AssetCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `items` in order and returns the distinct blocks in first-seen order.
    #[instrument(skip_all)]
    pub fn collect(items: &[LibraryItem]) -> Result<Vec<Block>> {
        let mut collector = Self::new();
        for (index, item) in items.iter().enumerate() {
            collector.check_item(index, item)?;
        }
        debug!(items = items.len(), blocks = collector.blocks.len(), "collected bitmaps");
        Ok(collector.into_blocks())
    }

    /// Scans one root item. `index` is the item's identity for `refs`.
    ///
    /// On error nothing from this item is kept.
    pub fn check_item(&mut self, index: usize, item: &LibraryItem) -> Result<()> {
        // Validate and gather first so a malformed item leaves no trace.
        let mut found: Vec<(&str, u32, u32)> = Vec::new();
        let timeline = item
            .timeline
            .as_ref()
            .ok_or_else(|| AtlasError::validation(&item.name, "missing timeline"))?;
        let layers = timeline
            .layers
            .as_ref()
            .ok_or_else(|| AtlasError::validation(&item.name, "timeline has no layers"))?;
        for layer in layers {
            if layer.layer_type != LayerKind::Normal {
                continue;
            }
            let frames = layer.frames.as_ref().ok_or_else(|| {
                AtlasError::validation(&item.name, format!("layer `{}` has no frames", layer.name))
            })?;
            for (position, frame) in frames.iter().enumerate() {
                if !frame.is_keyframe_at(position) {
                    continue;
                }
                let elements = frame.elements.as_ref().ok_or_else(|| {
                    AtlasError::validation(
                        &item.name,
                        format!("layer `{}` frame {} has no elements", layer.name, position),
                    )
                })?;
                for ele in elements.iter().filter(|e| e.is_bitmap_instance()) {
                    let asset = ele.library_item.as_ref().ok_or_else(|| {
                        AtlasError::validation(
                            &item.name,
                            format!("bitmap instance on layer `{}` has no library item", layer.name),
                        )
                    })?;
                    match (ele.h_pixels, ele.v_pixels) {
                        (Some(w), Some(h)) if w > 0 && h > 0 => {
                            found.push((asset.name.as_str(), w, h))
                        }
                        _ => {
                            return Err(AtlasError::validation(
                                &item.name,
                                format!("bitmap `{}` has no rendered size", asset.name),
                            ));
                        }
                    }
                }
            }
        }

        let item_ref = ItemRef {
            index,
            name: item.name.clone(),
        };
        for (name, w, h) in found {
            let slot = match self.lookup.get(name) {
                Some(&slot) => slot,
                None => {
                    let slot = self.blocks.len();
                    self.blocks.push(Block::new(name, w, h));
                    self.lookup.insert(name.to_string(), slot);
                    slot
                }
            };
            self.blocks[slot].add_ref(item_ref.clone());
        }
        Ok(())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Block> {
        self.lookup.get(name).map(|&slot| &self.blocks[slot])
    }

    /// Writes the winning placements and indices back into the collected set.
    pub fn commit(&mut self, layout: &AtlasLayout) {
        for placed in &layout.blocks {
            if let Some(&slot) = self.lookup.get(&placed.name) {
                let block = &mut self.blocks[slot];
                block.placement = placed.placement;
                block.index = placed.index;
            }
        }
    }
}
