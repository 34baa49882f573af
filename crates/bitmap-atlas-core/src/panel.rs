use serde::Serialize;

use crate::collector::AssetCollector;
use crate::error::Result;
use crate::model::Rect;
use crate::registry::{ExportKind, RegisteredItem};

/// Identity of the panel being generated.
#[derive(Debug, Clone, Serialize)]
pub struct BaseData {
    pub class_name: String,
    pub item_name: String,
    /// Ordinal of the panel among items of its kind.
    pub ordinal: usize,
}

/// An atlas image used by the panel.
#[derive(Debug, Clone, Serialize)]
pub struct ImageUse {
    pub name: String,
    pub index: usize,
    pub frame: Rect,
}

/// Everything a generator needs for one panel.
#[derive(Debug, Clone, Serialize)]
pub struct PanelRequest {
    pub export_kind: ExportKind,
    pub base_data: BaseData,
    pub component_data: Vec<ImageUse>,
    /// Library item the panel was built from.
    pub library_ref: String,
}

impl PanelRequest {
    /// Builds the request for `item` from a collector whose layout has been committed.
    /// Images are listed in atlas index order; unplaced images are skipped.
    pub fn from_committed(
        item: &RegisteredItem,
        export_kind: ExportKind,
        collector: &AssetCollector,
    ) -> Self {
        let mut component_data: Vec<ImageUse> = collector
            .blocks()
            .iter()
            .filter(|b| b.refs.iter().any(|r| r.index == item.index))
            .filter_map(|b| {
                Some(ImageUse {
                    name: b.name.clone(),
                    index: b.index?,
                    frame: b.rect()?,
                })
            })
            .collect();
        component_data.sort_by_key(|u| u.index);
        Self {
            export_kind,
            base_data: BaseData {
                class_name: item.class_name.clone(),
                item_name: item.name.clone(),
                ordinal: item.ordinal,
            },
            component_data,
            library_ref: item.name.clone(),
        }
    }
}

/// Produces source code for a panel.
pub trait PanelGenerator {
    fn generate(&self, class_name: &str, request: &PanelRequest) -> Result<String>;
}
