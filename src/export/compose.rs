//! Export composition: semantic color snapshot, the header/legend wrapper,
//! and the scoped light-theme override sheet.
//!
//! Everything built here is new and lives only inside the wrapper; the sole
//! live node the composition ever contains is the reparented capture target.

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::export::{CAPTURE_TARGET_ID, OVERRIDE_STYLE_ID, WRAPPER_ID};
use crate::panel::{Document, Element};
use crate::style::{Rule, Selector, Stylesheet};
use crate::theme::{VAR_BLUE_TEAM, VAR_FLAG_POLE, VAR_RED_TEAM, VAR_TIMELINE_BAR};
use crate::TimelineConfig;

/// Title used when the caller supplies no config
pub const DEFAULT_EXPORT_TITLE: &str = "Red Team Timeline";

/// Fallbacks used when a custom property is unset in the live environment
pub const FALLBACK_RED_TEAM: &str = "#e74c3c";
pub const FALLBACK_BLUE_TEAM: &str = "#3498db";
pub const FALLBACK_TIMELINE_BAR: &str = "#333333";
pub const FALLBACK_FLAG_POLE: &str = "#222222";

/// The colors effectively applied at capture time, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticColorSet {
    pub red_team: String,
    pub blue_team: String,
    pub timeline_bar: String,
    pub flag_pole: String,
}

/// Read the currently effective semantic colors from the document root.
/// Unset or blank entries fall back to the documented constants. Read-only.
pub fn snapshot_colors(doc: &Document) -> SemanticColorSet {
    let root = doc.root_id();
    let read = |var: &str, fallback: &str| -> String {
        match doc.effective_style(root, var) {
            Some(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => fallback.to_string(),
        }
    };
    SemanticColorSet {
        red_team: read(VAR_RED_TEAM, FALLBACK_RED_TEAM),
        blue_team: read(VAR_BLUE_TEAM, FALLBACK_BLUE_TEAM),
        timeline_bar: read(VAR_TIMELINE_BAR, FALLBACK_TIMELINE_BAR),
        flag_pole: read(VAR_FLAG_POLE, FALLBACK_FLAG_POLE),
    }
}

/// The orphan nodes making up the export wrapper. The body (the capture
/// target) is reparented in by the capture session, between header and
/// legend.
#[derive(Debug, Clone, Copy)]
pub struct Composition {
    pub wrapper: ego_tree::NodeId,
    pub header: ego_tree::NodeId,
    pub legend: ego_tree::NodeId,
}

fn parse_iso(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_string()))
}

/// `"Jan 1, 2024"` style
pub fn format_human(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Build wrapper, header and legend as orphans. `content_width` is the
/// capture target's unclipped width, used to size the generated blocks.
pub fn build_composition(
    doc: &mut Document,
    config: Option<&TimelineConfig>,
    colors: &SemanticColorSet,
    content_width: u32,
) -> Result<Composition> {
    let wrapper = doc.create(
        Element::new("div")
            .with_id(WRAPPER_ID)
            .with_style("background", "#ffffff")
            .with_style("padding", "40px 48px 32px")
            .with_style("display", "inline-block")
            .with_style("min-width", "100%")
            .with_style(
                "font-family",
                "Inter, 'Segoe UI', system-ui, -apple-system, sans-serif",
            ),
    );

    // Header: title line, plus a date range line when config is present
    let with_dates = config.is_some();
    let header_height = if with_dates { 74 } else { 48 };
    let header = doc.create(
        Element::new("div")
            .with_class("exportHeader")
            .sized(content_width, header_height)
            .with_style("margin-bottom", "24px")
            .with_style("padding-bottom", "16px")
            .with_style("border-bottom", "2px solid #e0e0e0"),
    );

    let title = config.map(|c| c.title.as_str()).unwrap_or(DEFAULT_EXPORT_TITLE);
    let title_line = doc.create(
        Element::new("div")
            .with_class("exportTitle")
            .with_text(title)
            .sized(content_width.min(600), 30)
            .with_style("font-size", "22px")
            .with_style("font-weight", "700")
            .with_style("color", "#1a1a2e")
            .with_style("margin-bottom", "6px"),
    );
    doc.append(header, title_line);

    if let Some(config) = config {
        let start = parse_iso(&config.start_date)?;
        let end = parse_iso(&config.end_date)?;
        let range = format!("{} — {}", format_human(start), format_human(end));
        let date_line = doc.create(
            Element::new("div")
                .with_class("exportDates")
                .with_text(&range)
                .at(0, 36)
                .sized(content_width.min(300), 20)
                .with_style("font-size", "14px")
                .with_style("color", "#555"),
        );
        doc.append(header, date_line);
    }
    doc.append(wrapper, header);

    // Legend: exactly two entries, red team then blue team
    let legend = doc.create(
        Element::new("div")
            .with_class("exportLegend")
            .sized(content_width, 36)
            .with_style("margin-top", "20px")
            .with_style("padding-top", "16px")
            .with_style("border-top", "1px solid #e0e0e0")
            .with_style("font-size", "13px")
            .with_style("color", "#444"),
    );
    append_legend_item(doc, legend, 0, &colors.red_team, "Red Team");
    append_legend_item(doc, legend, 160, &colors.blue_team, "Blue Team");

    Ok(Composition { wrapper, header, legend })
}

fn append_legend_item(doc: &mut Document, legend: ego_tree::NodeId, x: i32, color: &str, label: &str) {
    let item = doc.create(
        Element::new("div")
            .with_class("legendItem")
            .at(x, 17)
            .sized(140, 16),
    );
    let flag = doc.create(
        Element::new("div")
            .with_class("legendFlag")
            .at(0, 3)
            .sized(12, 10)
            .with_style("background", color)
            .with_style("clip-path", "polygon(0 0, 100% 50%, 0 100%)"),
    );
    let text = doc.create(
        Element::new("span")
            .with_class("legendLabel")
            .with_text(label)
            .at(18, 0)
            .sized(120, 16)
            .with_style("color", color)
            .with_style("font-weight", "600"),
    );
    doc.append(item, flag);
    doc.append(item, text);
    doc.append(legend, item);
}

/// The scoped light-theme override sheet. Every selector requires the
/// wrapper id on an ancestor, so nothing outside the wrapper can match.
pub fn light_theme_overrides(colors: &SemanticColorSet) -> Stylesheet {
    let w = WRAPPER_ID;
    let scoped = |sel: Selector| sel.within(w);
    let mut sheet = Stylesheet::new(OVERRIDE_STYLE_ID);

    sheet.push(Rule::new(vec![scoped(Selector::id(CAPTURE_TARGET_ID))]).set("background", "#ffffff"));
    sheet.push(Rule::new(vec![scoped(Selector::class_part("bar"))]).set("background", "#ddd"));
    sheet.push(
        Rule::new(vec![scoped(
            Selector::class_part("tick")
                .excluding("Label")
                .excluding("Container")
                .excluding("day"),
        )])
        .set("background", "#bbb"),
    );
    sheet.push(
        Rule::new(vec![scoped(Selector::class_part("dayTick").excluding("Label"))])
            .set("background", "#ccc")
            .set("opacity", "0.5"),
    );
    sheet.push(
        Rule::new(vec![
            scoped(Selector::class_part("tickLabel")),
            scoped(Selector::class_part("weekDates")),
        ])
        .set("color", "#666"),
    );
    sheet.push(Rule::new(vec![scoped(Selector::class_part("weekName"))]).set("color", "#333"));
    sheet.push(
        Rule::new(vec![
            scoped(Selector::class_part("dateLabelStart")),
            scoped(Selector::class_part("dateLabelEnd")),
        ])
        .set("color", "#333"),
    );
    sheet.push(Rule::new(vec![scoped(Selector::class_part("dayTickLabel"))]).set("color", "#999"));
    sheet.push(Rule::new(vec![scoped(Selector::class_part("eventLabel"))]).set("background", "#ffffff"));
    sheet.push(
        Rule::new(vec![scoped(Selector::class_part("eventLabelRed"))]).set("color", &colors.red_team),
    );
    sheet.push(
        Rule::new(vec![scoped(Selector::class_part("eventLabelBlue"))]).set("color", &colors.blue_team),
    );
    sheet.push(
        Rule::new(vec![
            scoped(Selector::class_part("flagPoleRed")),
            scoped(Selector::class_part("flagPoleBlue")),
        ])
        .set("background", &colors.flag_pole),
    );
    sheet.push(
        Rule::new(vec![scoped(Selector::class_part("flagHeadRed"))]).set("background", &colors.red_team),
    );
    sheet.push(
        Rule::new(vec![scoped(Selector::class_part("flagHeadBlue"))]).set("background", &colors.blue_team),
    );
    // Freeze motion so every event is fully visible during capture
    sheet.push(
        Rule::new(vec![scoped(Selector::any())])
            .set("animation", "none")
            .set("transition", "none"),
    );
    // Interactive-only decorations have no place in a static image
    sheet.push(Rule::new(vec![scoped(Selector::class_part("tooltip"))]).set("display", "none"));
    sheet.push(
        Rule::new(vec![scoped(Selector::class_part("overflowBadgeRed"))])
            .set(
                "background",
                &format!("color-mix(in srgb, {} 15%, transparent)", colors.red_team),
            )
            .set("color", &colors.red_team)
            .set(
                "border-color",
                &format!("color-mix(in srgb, {} 40%, transparent)", colors.red_team),
            ),
    );
    sheet.push(
        Rule::new(vec![scoped(Selector::class_part("overflowBadgeBlue"))])
            .set(
                "background",
                &format!("color-mix(in srgb, {} 15%, transparent)", colors.blue_team),
            )
            .set("color", &colors.blue_team)
            .set(
                "border-color",
                &format!("color-mix(in srgb, {} 40%, transparent)", colors.blue_team),
            ),
    );

    sheet
}
