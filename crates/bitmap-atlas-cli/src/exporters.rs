use std::fs;
use std::path::PathBuf;

use bitmap_atlas_core::{AtlasError, AtlasExporter, AtlasLayout, to_json};
use handlebars::Handlebars;
use image::{Rgba, RgbaImage};
use serde::Serialize;
use tracing::info;

/// Writes `{ images, meta }` JSON metadata.
pub struct JsonExporter {
    path: PathBuf,
}

impl JsonExporter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl AtlasExporter for JsonExporter {
    fn export(&mut self, layout: &AtlasLayout) -> bitmap_atlas_core::Result<()> {
        let json = serde_json::to_string_pretty(&to_json(layout))?;
        fs::write(&self.path, json)?;
        info!(json_path = ?self.path, images = layout.records.len(), "atlas written");
        Ok(())
    }
}

#[derive(Serialize)]
struct TemplateSprite<'a> {
    name: &'a str,
    index: usize,
    frame: serde_json::Value,
    refs: &'a [String],
}

#[derive(Serialize)]
struct TemplateContext<'a> {
    image: &'a str,
    size: serde_json::Value,
    sprites: Vec<TemplateSprite<'a>>,
    meta: serde_json::Value,
}

/// Renders a handlebars template over the layout.
pub struct TemplateExporter {
    path: PathBuf,
    template: String,
    image_name: String,
}

impl TemplateExporter {
    pub fn new(path: PathBuf, template: String, image_name: String) -> Self {
        Self {
            path,
            template,
            image_name,
        }
    }
}

/// Escapes `{{value}}` output for a double-quoted JSON or JS string literal
/// instead of HTML.
pub(crate) fn escape_string_literal(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// Handlebars registry in strict mode with string-literal escaping.
pub(crate) fn source_registry() -> Handlebars<'static> {
    let mut reg = Handlebars::new();
    reg.set_strict_mode(true);
    reg.register_escape_fn(escape_string_literal);
    reg
}

impl TemplateExporter {
    fn render(&self, layout: &AtlasLayout) -> bitmap_atlas_core::Result<String> {
        let sprites = layout
            .records
            .iter()
            .map(|r| TemplateSprite {
                name: &r.name,
                index: r.index,
                frame: serde_json::json!({"x": r.x, "y": r.y, "w": r.width, "h": r.height}),
                refs: &r.refs,
            })
            .collect();
        let ctx = TemplateContext {
            image: &self.image_name,
            size: serde_json::json!({"w": layout.width, "h": layout.height}),
            sprites,
            meta: serde_json::json!({
                "app": "bitmap-atlas",
                "version": env!("CARGO_PKG_VERSION"),
                "winner": layout.winner,
            }),
        };

        let mut reg = source_registry();
        reg.register_template_string("tpl", &self.template)
            .map_err(|e| AtlasError::Encode(e.to_string()))?;
        reg.render("tpl", &ctx)
            .map_err(|e| AtlasError::Encode(e.to_string()))
    }
}

impl AtlasExporter for TemplateExporter {
    fn export(&mut self, layout: &AtlasLayout) -> bitmap_atlas_core::Result<()> {
        let rendered = self.render(layout)?;
        fs::write(&self.path, rendered)?;
        info!(out_path = ?self.path, "template written");
        Ok(())
    }
}

/// Draws every placed image as a flat tinted rectangle; a quick visual check of
/// the layout, not the composited atlas.
pub struct PreviewExporter {
    path: PathBuf,
    outlines: bool,
}

impl PreviewExporter {
    pub fn new(path: PathBuf, outlines: bool) -> Self {
        Self { path, outlines }
    }
}

fn tint(index: usize) -> Rgba<u8> {
    // spread hues with a golden-ratio step
    let h = (index as f32 * 0.618_034).fract() * 6.0;
    let x = 1.0 - ((h % 2.0) - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    let c = |v: f32| (80.0 + v * 150.0) as u8;
    Rgba([c(r), c(g), c(b), 255])
}

impl AtlasExporter for PreviewExporter {
    fn export(&mut self, layout: &AtlasLayout) -> bitmap_atlas_core::Result<()> {
        let mut canvas = RgbaImage::new(layout.width.max(1), layout.height.max(1));
        let (cw, ch) = canvas.dimensions();
        let red = Rgba([255, 0, 0, 255]);
        for r in &layout.records {
            let fill = tint(r.index);
            let (x2, y2) = ((r.x + r.width).min(cw), (r.y + r.height).min(ch));
            for y in r.y..y2 {
                for x in r.x..x2 {
                    let edge = x == r.x || y == r.y || x + 1 == x2 || y + 1 == y2;
                    let px = if self.outlines && edge { red } else { fill };
                    canvas.put_pixel(x, y, px);
                }
            }
        }
        canvas
            .save(&self.path)
            .map_err(|e| AtlasError::Encode(e.to_string()))?;
        info!(png_path = ?self.path, "preview written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitmap_atlas_core::{Block, PackerConfig, pack_blocks};

    #[test]
    fn string_literal_escaping() {
        assert_eq!(escape_string_literal("hero's=bg&1"), "hero's=bg&1");
        assert_eq!(escape_string_literal("a\"b\\c\nd"), "a\\\"b\\\\c\\nd");
    }

    #[test]
    fn builtin_atlas_template_renders_valid_json_with_raw_names() {
        let odd = "a&b<c>\"q\"=1";
        let layout = pack_blocks(&[Block::new(odd, 10, 6)], &PackerConfig::default())
            .expect("pack");
        let exporter = TemplateExporter::new(
            PathBuf::from("unused.json"),
            include_str!("templates/atlas.hbs").to_string(),
            "atlas's.png".to_string(),
        );
        let rendered = exporter.render(&layout).expect("render");
        let parsed: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");
        assert_eq!(parsed["image"], "atlas's.png");
        assert_eq!(parsed["frames"][odd]["w"], 10);
        assert_eq!(parsed["frames"][odd]["h"], 6);
    }
}
