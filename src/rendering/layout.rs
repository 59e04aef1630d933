//! Scene layout for the composed export wrapper.
//!
//! The wrapper's direct children (header, reparented timeline, legend) are
//! stacked vertically inside the wrapper padding; everything below them is
//! positioned absolutely from the offsets stored on each element. Style
//! resolution goes through [`Document::effective_style`], so the injected
//! override sheet is what actually decides the painted colors.

use ego_tree::NodeId;

use crate::panel::Document;
use crate::rendering::paint::{parse_css_color, PaintCommand};

const PAD_TOP: u32 = 40;
const PAD_X: u32 = 48;
const PAD_BOTTOM: u32 = 32;
/// Vertical gap between stacked wrapper blocks
const BLOCK_GAP: u32 = 24;

const DEFAULT_TEXT_COLOR: (u8, u8, u8, u8) = (26, 26, 46, 255);
const DEFAULT_FONT_SIZE: u32 = 13;

/// A fully laid-out display list covering the wrapper's scrolled extent
#[derive(Debug, Clone)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<PaintCommand>,
}

/// Lay out the wrapper subtree and emit paint commands. This resolves every
/// box up front, which is also what flushes pending geometry before capture.
pub fn build_scene(doc: &Document, wrapper: NodeId) -> Scene {
    let mut commands = Vec::new();
    let mut y = PAD_TOP;
    let mut content_width = 0u32;

    let children = doc.children(wrapper);
    for &child in &children {
        let (w, h) = doc.scroll_extent(child);
        walk(doc, child, PAD_X as i32, y as i32, &mut commands);
        content_width = content_width.max(w);
        y += h + BLOCK_GAP;
    }
    let height = y.saturating_sub(BLOCK_GAP) + PAD_BOTTOM;
    let width = content_width + PAD_X * 2;

    // Wrapper background underneath everything
    let bg = doc
        .effective_style(wrapper, "background")
        .and_then(|v| parse_css_color(&v))
        .unwrap_or((255, 255, 255, 255));
    commands.insert(
        0,
        PaintCommand::SolidRect { x: 0, y: 0, width, height, rgba: bg },
    );

    Scene { width, height, commands }
}

fn walk(doc: &Document, node: NodeId, ax: i32, ay: i32, commands: &mut Vec<PaintCommand>) {
    if doc.effective_style(node, "display").as_deref() == Some("none") {
        return;
    }
    let el = doc.element(node);

    let opacity = doc
        .effective_style(node, "opacity")
        .and_then(|v| v.parse::<f32>().ok())
        .unwrap_or(1.0)
        .clamp(0.0, 1.0);

    if el.width > 0 && el.height > 0 {
        if let Some(rgba) = doc
            .effective_style(node, "background")
            .and_then(|v| parse_css_color(&v))
        {
            let alpha = (rgba.3 as f32 * opacity).round() as u8;
            if alpha > 0 {
                commands.push(PaintCommand::SolidRect {
                    x: ax,
                    y: ay,
                    width: el.width,
                    height: el.height,
                    rgba: (rgba.0, rgba.1, rgba.2, alpha),
                });
            }
        }
    }

    if let Some(text) = &el.text {
        let rgba = doc
            .effective_style(node, "color")
            .and_then(|v| parse_css_color(&v))
            .unwrap_or(DEFAULT_TEXT_COLOR);
        let size = doc
            .effective_style(node, "font-size")
            .and_then(|v| v.trim_end_matches("px").parse::<u32>().ok())
            .unwrap_or(DEFAULT_FONT_SIZE);
        commands.push(PaintCommand::Text {
            x: ax,
            y: ay,
            text: text.clone(),
            size,
            rgba,
        });
    }

    for child in doc.children(node) {
        let cel = doc.element(child);
        walk(doc, child, ax + cel.x, ay + cel.y, commands);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{Document, Element};
    use crate::style::{Rule, Selector, Stylesheet};

    fn doc_with_wrapper() -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.root_id();
        let wrapper = doc.append_new(
            root,
            Element::new("div")
                .with_id("png-export-wrapper")
                .with_style("background", "#ffffff"),
        );
        let body = doc.append_new(wrapper, Element::new("div").sized(400, 100));
        doc.append_new(
            body,
            Element::new("div")
                .with_class("bar")
                .with_style("background", "#111111")
                .at(0, 40)
                .sized(400, 6),
        );
        doc.append_new(
            body,
            Element::new("div")
                .with_class("tooltip")
                .with_text("hover only")
                .sized(50, 10),
        );
        (doc, wrapper)
    }

    #[test]
    fn background_rect_comes_first_and_covers_the_scene() {
        let (doc, wrapper) = doc_with_wrapper();
        let scene = build_scene(&doc, wrapper);
        assert_eq!(scene.width, 400 + 48 * 2);
        match &scene.commands[0] {
            PaintCommand::SolidRect { x: 0, y: 0, width, height, rgba } => {
                assert_eq!(*width, scene.width);
                assert_eq!(*height, scene.height);
                assert_eq!(*rgba, (255, 255, 255, 255));
            }
            other => panic!("expected background rect, got {:?}", other),
        }
    }

    #[test]
    fn override_sheet_decides_painted_colors_and_hides_tooltips() {
        let (mut doc, wrapper) = doc_with_wrapper();
        let mut sheet = Stylesheet::new("png-export-light-theme");
        sheet.push(
            Rule::new(vec![Selector::class_part("bar").within("png-export-wrapper")])
                .set("background", "#ddd"),
        );
        sheet.push(
            Rule::new(vec![Selector::class_part("tooltip").within("png-export-wrapper")])
                .set("display", "none"),
        );
        doc.styles.insert(sheet);

        let scene = build_scene(&doc, wrapper);
        let has_bar = scene.commands.iter().any(|c| {
            matches!(c, PaintCommand::SolidRect { rgba, .. } if *rgba == (221, 221, 221, 255))
        });
        let has_tooltip_text = scene.commands.iter().any(|c| {
            matches!(c, PaintCommand::Text { text, .. } if text == "hover only")
        });
        assert!(has_bar);
        assert!(!has_tooltip_text);
    }
}
