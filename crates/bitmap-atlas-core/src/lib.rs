//! Core library for packing the bitmaps of an authored document into one atlas.
//!
//! - Collection: walk root items' timelines (normal layers, keyframes, bitmap instances)
//!   and keep one `Block` per distinct bitmap
//! - Search: try `N + 29` orderings (rotations, composite sorts, random shuffles)
//!   against a packing oracle (Skyline / MaxRects / Guillotine) and keep the best complete layout
//! - Data model is serde-serializable; exporters live in helpers and the CLI crate.
//!
//! Quick example:
//! ```ignore
//! use bitmap_atlas_core::{Document, PackerConfig, pack_document, to_json};
//! # fn main() -> anyhow::Result<()> {
//! let doc = Document::from_json(&std::fs::read_to_string("ui.json")?)?;
//! let cfg = PackerConfig { max_width: 1024, max_height: 1024, ..Default::default() };
//! let out = pack_document(&doc, &cfg)?;
//! println!("{}", to_json(&out.layout));
//! # Ok(()) }
//! ```

pub mod collector;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod model;
pub mod ordering;
pub mod packer;
pub mod panel;
pub mod pipeline;
pub mod registry;
pub mod selector;

pub use collector::*;
pub use config::*;
pub use document::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `bitmap_atlas_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::collector::AssetCollector;
    pub use crate::config::{
        AlgorithmFamily, GuillotineChoice, GuillotineSplit, MaxRectsHeuristic, PackerConfig,
        PackerConfigBuilder, ScoreMetric,
    };
    pub use crate::document::{Document, Element, Frame, Layer, LayerKind, LibraryItem, Timeline};
    pub use crate::model::{AtlasLayout, AttemptOutcome, Block, ExportRecord, LayoutStats, PackResult};
    pub use crate::ordering::{Ordering, SortKey, generate_orderings};
    pub use crate::packer::{OracleFactory, PackingOracle, RectOracle};
    pub use crate::registry::{ComponentKind, ComponentRegistry, ExportKind};
    pub use crate::selector::{Selection, select_best};
    pub use crate::{AtlasError, PackOutput, pack_blocks, pack_document, to_json};
}
