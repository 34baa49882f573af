use std::fs;
use std::path::Path;

use anyhow::Context;
use bitmap_atlas_core::panel::{PanelGenerator, PanelRequest};
use bitmap_atlas_core::registry::{ComponentKind, ComponentRegistry};
use bitmap_atlas_core::{AssetCollector, AtlasError, Document};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use crate::exporters::source_registry;

/// Panel generator backed by one handlebars template.
pub struct TemplatePanelGenerator {
    reg: Handlebars<'static>,
}

#[derive(Serialize)]
struct PanelContext<'a> {
    class_name: &'a str,
    #[serde(flatten)]
    request: &'a PanelRequest,
}

impl TemplatePanelGenerator {
    pub fn new(template: &str) -> anyhow::Result<Self> {
        let mut reg = source_registry();
        reg.register_template_string("panel", template)
            .context("compile panel template")?;
        Ok(Self { reg })
    }
}

impl PanelGenerator for TemplatePanelGenerator {
    fn generate(
        &self,
        class_name: &str,
        request: &PanelRequest,
    ) -> bitmap_atlas_core::Result<String> {
        let ctx = PanelContext {
            class_name,
            request,
        };
        self.reg
            .render("panel", &ctx)
            .map_err(|e| AtlasError::Encode(e.to_string()))
    }
}

/// Generates a source file for every registered panel. Returns how many were produced.
pub fn write_panels<G: PanelGenerator>(
    registry: &ComponentRegistry,
    doc: &Document,
    collector: &AssetCollector,
    generator: &G,
    out_dir: &Path,
    ext: &str,
    dry_run: bool,
) -> anyhow::Result<usize> {
    let mut requests: Vec<PanelRequest> = Vec::new();
    registry.for_each(ComponentKind::Panel, |item| {
        let export_kind = doc
            .items
            .get(item.index)
            .and_then(|it| registry.export_kind(it));
        if let Some(export_kind) = export_kind {
            requests.push(PanelRequest::from_committed(item, export_kind, collector));
        }
    });

    for req in &requests {
        let class_name = short_class_name(&req.base_data.class_name);
        let source = generator.generate(class_name, req)?;
        debug!(class_name, images = req.component_data.len(), "panel generated");
        if !dry_run {
            let path = out_dir.join(format!("{}.{}", class_name, ext));
            fs::write(&path, source).with_context(|| format!("write {}", path.display()))?;
            info!(?path, "panel written");
        }
    }
    Ok(requests.len())
}

/// Last segment of a dotted linkage name (`ui.main.ShopPanel` -> `ShopPanel`).
fn short_class_name(linkage: &str) -> &str {
    linkage.rsplit('.').next().unwrap_or(linkage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitmap_atlas_core::registry::{ExportKind, RegisteredItem};
    use bitmap_atlas_core::{
        Block, Element, Frame, Layer, LayerKind, LibraryItem, PackerConfig, Timeline, pack_blocks,
    };

    #[test]
    fn builtin_panel_template_keeps_names_verbatim() {
        let mut collector = AssetCollector::new();
        let item = LibraryItem {
            name: "Shop".into(),
            linkage_class_name: Some("ui.ShopPanel".into()),
            timeline: Some(Timeline {
                layers: Some(vec![Layer {
                    name: "art".into(),
                    layer_type: LayerKind::Normal,
                    frames: Some(vec![Frame {
                        start_frame: 0,
                        elements: Some(vec![
                            Element::bitmap("hero's=bg&1", 8, 8),
                            Element::bitmap("say \"hi\" <b>`", 4, 4),
                        ]),
                    }]),
                }]),
            }),
        };
        collector.check_item(0, &item).expect("collect");
        let blocks: Vec<Block> = collector.blocks().to_vec();
        let layout = pack_blocks(&blocks, &PackerConfig::default()).expect("pack");
        collector.commit(&layout);

        let registered = RegisteredItem {
            index: 0,
            name: "Shop".into(),
            class_name: "ui.ShopPanel".into(),
            ordinal: 0,
        };
        let request = PanelRequest::from_committed(&registered, ExportKind::Panel, &collector);
        let generator =
            TemplatePanelGenerator::new(include_str!("templates/panel.hbs")).expect("template");
        let source = generator.generate("ShopPanel", &request).expect("render");

        assert!(source.contains(r#"name: "hero's=bg&1""#), "{}", source);
        assert!(source.contains(r#"name: "say \"hi\" <b>`""#), "{}", source);
        assert!(!source.contains("&amp;") && !source.contains("&#x"));
    }
}
