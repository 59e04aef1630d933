//! Live presentation tree for the timeline panel.
//!
//! The tree is an [`ego_tree`] arena of [`Element`] values plus a
//! document-level [`StyleRegistry`]. Nodes are addressed by [`NodeId`] and
//! can be detached and reinserted at a recorded position, which is exactly
//! the checkout/checkin discipline the PNG export pipeline needs when it
//! temporarily moves the capture target into its export wrapper.

use ego_tree::{NodeId, Tree};
use log::warn;

use crate::style::StyleRegistry;
use crate::{AppState, Team};

/// One element in the presentation tree: tag, identity, classes, inline
/// styles, optional text, and a simple box (offset relative to the parent
/// plus an intrinsic size) assigned by whoever built the subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub text: Option<String>,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    style: Vec<(String, String)>,
    attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Element {
            tag: tag.to_string(),
            id: None,
            classes: Vec::new(),
            text: None,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            style: Vec::new(),
            attrs: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn sized(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_style(mut self, prop: &str, value: &str) -> Self {
        self.set_style(prop, value);
        self
    }

    /// The space-joined class attribute, as substring selectors see it
    pub fn class_attr(&self) -> String {
        self.classes.join(" ")
    }

    /// Read an inline style property
    pub fn style(&self, prop: &str) -> Option<&str> {
        self.style
            .iter()
            .rev()
            .find(|(p, _)| p == prop)
            .map(|(_, v)| v.as_str())
    }

    /// Set an inline style property, replacing any previous value
    pub fn set_style(&mut self, prop: &str, value: &str) {
        if let Some(entry) = self.style.iter_mut().find(|(p, _)| p == prop) {
            entry.1 = value.to_string();
        } else {
            self.style.push((prop.to_string(), value.to_string()));
        }
    }

    /// Remove an inline style property ("unset")
    pub fn remove_style(&mut self, prop: &str) {
        self.style.retain(|(p, _)| p != prop);
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.attrs.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value.to_string();
        } else {
            self.attrs.push((name.to_string(), value.to_string()));
        }
    }
}

/// The live document: element tree plus the injected-stylesheet registry
#[derive(Debug)]
pub struct Document {
    tree: Tree<Element>,
    pub styles: StyleRegistry,
}

impl Document {
    /// Create a document with an empty root element (the analogue of the
    /// document root that carries theme custom properties).
    pub fn new() -> Self {
        Document {
            tree: Tree::new(Element::new("root")),
            styles: StyleRegistry::new(),
        }
    }

    pub fn root_id(&self) -> NodeId {
        self.tree.root().id()
    }

    /// Create a detached (orphan) element and return its id
    pub fn create(&mut self, el: Element) -> NodeId {
        self.tree.orphan(el).id()
    }

    /// Append `child` as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        if let Some(mut p) = self.tree.get_mut(parent) {
            p.append_id(child);
        }
    }

    /// Convenience: create an element and append it in one step
    pub fn append_new(&mut self, parent: NodeId, el: Element) -> NodeId {
        let id = self.create(el);
        self.append(parent, id);
        id
    }

    /// Insert `node` as the previous sibling of `anchor`
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) {
        if let Some(mut a) = self.tree.get_mut(anchor) {
            a.insert_id_before(node);
        }
    }

    /// Detach `node` from its parent. The node and its subtree stay
    /// addressable by id and can be reinserted later.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(mut n) = self.tree.get_mut(node) {
            n.detach();
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.get(node)?.parent().map(|n| n.id())
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.tree.get(node)?.next_sibling().map(|n| n.id())
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree
            .get(node)
            .map(|n| n.children().map(|c| c.id()).collect())
            .unwrap_or_default()
    }

    pub fn element(&self, node: NodeId) -> &Element {
        self.tree
            .get(node)
            .map(|n| n.value())
            .expect("node id belongs to this document")
    }

    /// Mutate an element in place. Returns `None` when the id is unknown.
    pub fn update<R>(&mut self, node: NodeId, f: impl FnOnce(&mut Element) -> R) -> Option<R> {
        self.tree.get_mut(node).map(|mut n| f(n.value()))
    }

    /// Find an element by id attribute, searching only the live tree
    /// (orphaned subtrees are not visible here).
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .root()
            .descendants()
            .find(|n| n.value().id.as_deref() == Some(id))
            .map(|n| n.id())
    }

    /// Is `node` a strict descendant of `ancestor`?
    pub fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        self.tree
            .get(node)
            .map(|n| n.ancestors().any(|a| a.id() == ancestor))
            .unwrap_or(false)
    }

    /// Resolve the effective value of a style property for `node`.
    ///
    /// Registry sheets are authored as `!important`, so a matching sheet
    /// declaration (last one wins, in sheet order) beats the inline style.
    /// Selector `within_id` scoping is enforced here against the node's
    /// ancestor chain.
    pub fn effective_style(&self, node: NodeId, prop: &str) -> Option<String> {
        let node_ref = self.tree.get(node)?;
        let el = node_ref.value();

        let mut from_sheets: Option<&str> = None;
        for sheet in self.styles.sheets() {
            for rule in &sheet.rules {
                let matched = rule.selectors.iter().any(|sel| {
                    sel.matches_subject(el)
                        && match &sel.within_id {
                            None => true,
                            Some(scope) => node_ref
                                .ancestors()
                                .any(|a| a.value().id.as_deref() == Some(scope.as_str())),
                        }
                });
                if matched {
                    if let Some(v) = rule.value_of(prop) {
                        from_sheets = Some(v);
                    }
                }
            }
        }

        from_sheets
            .map(|v| v.to_string())
            .or_else(|| el.style(prop).map(|v| v.to_string()))
    }

    /// Full unclipped extent of a subtree: the union of every descendant's
    /// box, in the coordinate space of `node` (the scrollWidth/scrollHeight
    /// analogue).
    pub fn scroll_extent(&self, node: NodeId) -> (u32, u32) {
        fn walk(doc: &Document, node: NodeId) -> (u32, u32) {
            let el = doc.element(node);
            let mut w = el.width;
            let mut h = el.height;
            for child in doc.children(node) {
                let cel = doc.element(child);
                let (cw, ch) = walk(doc, child);
                w = w.max((cel.x.max(0) as u32).saturating_add(cw));
                h = h.max((cel.y.max(0) as u32).saturating_add(ch));
            }
            (w, h)
        }
        walk(self, node)
    }

    /// Deterministic signature of the live tree: structure, identity,
    /// boxes, inline styles and text. Used to assert exact restoration.
    pub fn structure_signature(&self) -> String {
        fn walk(doc: &Document, node: NodeId, depth: usize, out: &mut String) {
            let el = doc.element(node);
            out.push_str(&format!(
                "{:indent$}<{} id={:?} class={:?} box=({},{},{},{}) style={:?} text={:?}>\n",
                "",
                el.tag,
                el.id,
                el.class_attr(),
                el.x,
                el.y,
                el.width,
                el.height,
                el.style,
                el.text,
                indent = depth * 2
            ));
            for child in doc.children(node) {
                walk(doc, child, depth + 1, out);
            }
        }
        let mut out = String::new();
        walk(self, self.root_id(), 0, &mut out);
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Timeline panel builder (collaborator to the export pipeline)
// ---------------------------------------------------------------------------

/// Horizontal pixels per timeline day
const PX_PER_DAY: i64 = 24;
/// Minimum capture width before the timeline starts to overflow its scroller
const MIN_TIMELINE_WIDTH: u32 = 960;
const TIMELINE_HEIGHT: u32 = 240;

/// Build the full application panel for an [`AppState`]: toolbar, scroll
/// container and the `#timeline-capture` subtree carrying the class
/// vocabulary the export override sheet targets.
///
/// Event placement is intentionally simple (linear by date); the export
/// pipeline only cares that the subtree exists and overflows realistically.
pub fn build_app_panel(state: &AppState) -> Document {
    use chrono::NaiveDate;

    let mut doc = Document::new();
    let root = doc.root_id();

    let body = doc.append_new(root, Element::new("body").with_class("app"));
    doc.append_new(body, Element::new("div").with_class("toolbar").sized(0, 48));
    let scroller = doc.append_new(
        body,
        Element::new("div").with_class("timelineScroll").at(0, 48),
    );

    let start = NaiveDate::parse_from_str(&state.config.start_date, "%Y-%m-%d");
    let end = NaiveDate::parse_from_str(&state.config.end_date, "%Y-%m-%d");
    let (start, days) = match (start, end) {
        (Ok(s), Ok(e)) if e >= s => (s, (e - s).num_days() + 1),
        _ => {
            warn!(
                "timeline config dates unparseable ({} / {}), using a bare panel",
                state.config.start_date, state.config.end_date
            );
            (NaiveDate::default(), 1)
        }
    };
    let width = ((days * PX_PER_DAY) as u32).max(MIN_TIMELINE_WIDTH);

    let capture = doc.append_new(
        scroller,
        Element::new("div")
            .with_id("timeline-capture")
            .with_class("timeline")
            .sized(width, TIMELINE_HEIGHT),
    );

    // Horizontal bar with start/end date labels
    doc.append_new(
        capture,
        Element::new("div").with_class("bar").at(0, 140).sized(width, 6),
    );
    doc.append_new(
        capture,
        Element::new("div")
            .with_class("dateLabelStart")
            .with_text(&state.config.start_date)
            .at(0, 150)
            .sized(80, 14),
    );
    doc.append_new(
        capture,
        Element::new("div")
            .with_class("dateLabelEnd")
            .with_text(&state.config.end_date)
            .at(width as i32 - 80, 150)
            .sized(80, 14),
    );

    // Week ticks with labels, day ticks in between
    for day in 0..days {
        let x = (day * PX_PER_DAY) as i32;
        if day % 7 == 0 {
            let tick = doc.append_new(
                capture,
                Element::new("div").with_class("tick").at(x, 120).sized(2, 46),
            );
            doc.append_new(
                tick,
                Element::new("div")
                    .with_class("weekName")
                    .with_text(&format!("W{}", day / 7 + 1))
                    .at(2, 0)
                    .sized(40, 14),
            );
            doc.append_new(
                tick,
                Element::new("div")
                    .with_class("tickLabel weekDates")
                    .with_text(&(start + chrono::Days::new(day as u64)).format("%m-%d").to_string())
                    .at(2, 16)
                    .sized(40, 12),
            );
        } else {
            let tick = doc.append_new(
                capture,
                Element::new("div").with_class("dayTick").at(x, 132).sized(1, 20),
            );
            doc.append_new(
                tick,
                Element::new("div")
                    .with_class("dayTickLabel")
                    .with_text(&format!("{}", day % 7 + 1))
                    .at(1, 22)
                    .sized(10, 10),
            );
        }
    }

    // One flag group per event
    for event in &state.events {
        let date = match NaiveDate::parse_from_str(&event.date, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                warn!("skipping event `{}` with invalid date `{}`", event.id, event.date);
                continue;
            }
        };
        let x = ((date - start).num_days() * PX_PER_DAY) as i32;
        let team = match event.team {
            Team::Red => "Red",
            Team::Blue => "Blue",
        };

        let flag = doc.append_new(
            capture,
            Element::new("div").with_class("flag").at(x, 60).sized(140, 80),
        );
        doc.append_new(
            flag,
            Element::new("div")
                .with_class(&format!("flagPole{team}"))
                .sized(2, 80),
        );
        doc.append_new(
            flag,
            Element::new("div")
                .with_class(&format!("flagHead{team}"))
                .at(2, 0)
                .sized(12, 10),
        );
        let label = doc.append_new(
            flag,
            Element::new("div")
                .with_class("eventLabel")
                .with_class(&format!("eventLabel{team}"))
                .with_text(&event.description)
                .at(16, 0)
                .sized(120, 14),
        );
        doc.append_new(
            label,
            Element::new("div")
                .with_class("tooltip")
                .with_text(&event.date)
                .at(0, 16)
                .sized(120, 14),
        );
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Rule, Selector, Stylesheet};
    use crate::{TimelineConfig, TimelineEvent};

    fn state() -> AppState {
        AppState {
            config: TimelineConfig {
                title: "Exercise".to_string(),
                start_date: "2024-01-01".to_string(),
                end_date: "2024-01-28".to_string(),
            },
            events: vec![TimelineEvent {
                id: "e1".to_string(),
                date: "2024-01-10".to_string(),
                team: Team::Red,
                description: "Initial access".to_string(),
            }],
        }
    }

    #[test]
    fn detach_and_reinsert_restores_signature() {
        let mut doc = build_app_panel(&state());
        let before = doc.structure_signature();

        let capture = doc.by_id("timeline-capture").expect("capture");
        let parent = doc.parent(capture).expect("parent");
        let next = doc.next_sibling(capture);

        doc.detach(capture);
        assert!(doc.by_id("timeline-capture").is_none());

        match next {
            Some(sib) => doc.insert_before(sib, capture),
            None => doc.append(parent, capture),
        }
        assert_eq!(doc.structure_signature(), before);
    }

    #[test]
    fn by_id_ignores_orphans() {
        let mut doc = Document::new();
        let orphan = doc.create(Element::new("div").with_id("ghost"));
        assert!(doc.by_id("ghost").is_none());
        let root = doc.root_id();
        doc.append(root, orphan);
        assert_eq!(doc.by_id("ghost"), Some(orphan));
    }

    #[test]
    fn scroll_extent_covers_overflowing_children() {
        let doc = build_app_panel(&state());
        let capture = doc.by_id("timeline-capture").expect("capture");
        let (w, h) = doc.scroll_extent(capture);
        assert!(w >= MIN_TIMELINE_WIDTH);
        assert!(h >= TIMELINE_HEIGHT);
    }

    #[test]
    fn sheet_declarations_beat_inline_styles_within_scope() {
        let mut doc = Document::new();
        let root = doc.root_id();
        let wrapper = doc.append_new(root, Element::new("div").with_id("wrap"));
        let inside = doc.append_new(
            wrapper,
            Element::new("div")
                .with_class("bar")
                .with_style("background", "#000000"),
        );
        let outside = doc.append_new(
            root,
            Element::new("div")
                .with_class("bar")
                .with_style("background", "#000000"),
        );

        let mut sheet = Stylesheet::new("override");
        sheet.push(Rule::new(vec![Selector::class_part("bar").within("wrap")]).set("background", "#ddd"));
        doc.styles.insert(sheet);

        assert_eq!(doc.effective_style(inside, "background").as_deref(), Some("#ddd"));
        assert_eq!(doc.effective_style(outside, "background").as_deref(), Some("#000000"));
    }
}
