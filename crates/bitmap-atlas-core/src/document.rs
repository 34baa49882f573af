//! Authored document shape, limited to what is needed to find bitmap references.
//!
//! The JSON form mirrors the authoring tool's DOM: root library items own a
//! timeline of layers, layers own frames, frames own elements. Substructures are
//! kept as `Option` so a missing field survives deserialization and can be
//! reported by the collector instead of silently becoming empty.

use serde::{Deserialize, Serialize};

/// A whole authored document: the root library items to scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub items: Vec<LibraryItem>,
}

impl Document {
    /// Parses a document from its JSON text.
    pub fn from_json(text: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A root library item (panel, component, movie clip...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    pub name: String,
    /// Export class name; used by the component registry to classify items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkage_class_name: Option<String>,
    pub timeline: Option<Timeline>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    pub layers: Option<Vec<Layer>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Normal,
    Guide,
    Guided,
    Mask,
    Masked,
    Folder,
    Camera,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    #[serde(default)]
    pub name: String,
    pub layer_type: LayerKind,
    pub frames: Option<Vec<Frame>>,
}

/// One timeline position. Tweened positions repeat the `start_frame` of the
/// keyframe they interpolate from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub start_frame: usize,
    pub elements: Option<Vec<Element>>,
}

impl Frame {
    /// True when this frame is the keyframe at `position`.
    pub fn is_keyframe_at(&self, position: usize) -> bool {
        self.start_frame == position
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Instance,
    Shape,
    Text,
    Shapeobj,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InstanceKind {
    Bitmap,
    Symbol,
    Video,
    Compiled,
    #[serde(other)]
    Other,
}

/// Reference to an asset in the document library.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub element_type: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<InstanceKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_item: Option<LibraryRef>,
    /// Rendered width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h_pixels: Option<u32>,
    /// Rendered height in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_pixels: Option<u32>,
}

impl Element {
    pub fn is_bitmap_instance(&self) -> bool {
        self.element_type == ElementKind::Instance
            && self.instance_type == Some(InstanceKind::Bitmap)
    }

    /// Convenience constructor for a bitmap instance of `asset` rendered at `w`x`h`.
    pub fn bitmap(asset: impl Into<String>, w: u32, h: u32) -> Self {
        Self {
            element_type: ElementKind::Instance,
            instance_type: Some(InstanceKind::Bitmap),
            library_item: Some(LibraryRef { name: asset.into() }),
            h_pixels: Some(w),
            v_pixels: Some(h),
        }
    }
}
