//! Capture session: layout expansion, reparenting and guaranteed
//! restoration of the live tree.
//!
//! The session is a guard. `begin` records the original inline sizing and
//! expands the target (Idle -> Expanded); `compose` builds the wrapper,
//! installs the override sheet and reparents the target into it
//! (Expanded -> Composed). Restoration runs exactly once, from `finish` on
//! the normal path or from `Drop` if the session is abandoned mid-flight,
//! so no error between begin and finish can leave the tree mutated.

use ego_tree::NodeId;
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::export::compose::{build_composition, light_theme_overrides, SemanticColorSet};
use crate::export::{CAPTURE_TARGET_ID, OVERRIDE_STYLE_ID, WRAPPER_ID};
use crate::panel::Document;
use crate::TimelineConfig;

/// Inline sizing recorded before expansion. `None` means the property was
/// unset, and restoration removes it again.
#[derive(Debug)]
struct SavedLayout {
    container: Option<NodeId>,
    container_overflow: Option<String>,
    container_width: Option<String>,
    target_min_width: Option<String>,
    target_width: Option<String>,
}

/// Original position of the capture target, for exact reinsertion
#[derive(Debug, Clone, Copy)]
struct Anchor {
    parent: NodeId,
    next_sibling: Option<NodeId>,
}

pub struct CaptureSession<'a> {
    doc: &'a mut Document,
    target: NodeId,
    target_extent: (u32, u32),
    saved: SavedLayout,
    anchor: Option<Anchor>,
    wrapper: Option<NodeId>,
    finished: bool,
}

impl<'a> CaptureSession<'a> {
    /// Idle -> Expanded: record original sizing, then unclip the container
    /// and widen container and target to the target's full scroll extent.
    pub fn begin(doc: &'a mut Document, target: NodeId) -> Self {
        let container = doc.parent(target);
        let read = |doc: &Document, node: NodeId, prop: &str| {
            doc.element(node).style(prop).map(|v| v.to_string())
        };

        let saved = SavedLayout {
            container,
            container_overflow: container.and_then(|c| read(doc, c, "overflow")),
            container_width: container.and_then(|c| read(doc, c, "width")),
            target_min_width: read(doc, target, "min-width"),
            target_width: read(doc, target, "width"),
        };

        let target_extent = doc.scroll_extent(target);
        let width_px = format!("{}px", target_extent.0);
        if let Some(container) = container {
            doc.update(container, |el| {
                el.set_style("overflow", "visible");
                el.set_style("width", &width_px);
            });
        }
        doc.update(target, |el| {
            el.set_style("min-width", &width_px);
            el.set_style("width", &width_px);
        });
        debug!("expanded capture target to {}x{}", target_extent.0, target_extent.1);

        CaptureSession {
            doc,
            target,
            target_extent,
            saved,
            anchor: None,
            wrapper: None,
            finished: false,
        }
    }

    pub fn doc(&self) -> &Document {
        &*self.doc
    }

    pub fn target_extent(&self) -> (u32, u32) {
        self.target_extent
    }

    /// Expanded -> Composed: build the wrapper, install the override sheet,
    /// move the target into the wrapper and put the wrapper in the target's
    /// former place. Returns the wrapper id.
    pub fn compose(
        &mut self,
        config: Option<&TimelineConfig>,
        colors: &SemanticColorSet,
    ) -> Result<NodeId> {
        let comp = build_composition(self.doc, config, colors, self.target_extent.0)?;
        self.doc.styles.insert(light_theme_overrides(colors));
        // The sheet is installed from here on; restoration removes it even
        // if reparenting below fails.
        self.wrapper = Some(comp.wrapper);

        let parent = self
            .doc
            .parent(self.target)
            .ok_or_else(|| Error::Other("capture target has no parent".to_string()))?;
        let next_sibling = self.doc.next_sibling(self.target);
        self.anchor = Some(Anchor { parent, next_sibling });

        self.doc.detach(self.target);
        self.doc.append(comp.wrapper, self.target);
        self.doc.append(comp.wrapper, comp.legend);

        match next_sibling {
            Some(sib) => self.doc.insert_before(sib, comp.wrapper),
            None => self.doc.append(parent, comp.wrapper),
        }

        Ok(comp.wrapper)
    }

    /// Composed/Expanded -> Idle. Idempotent; also invoked from `Drop`.
    fn restore_now(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        if let Some(wrapper) = self.wrapper {
            if let Some(anchor) = self.anchor {
                self.doc.detach(self.target);
                match anchor.next_sibling {
                    Some(sib) => self.doc.insert_before(sib, self.target),
                    None => self.doc.append(anchor.parent, self.target),
                }
            }
            self.doc.detach(wrapper);
        }
        self.doc.styles.remove(OVERRIDE_STYLE_ID);

        let restore = |doc: &mut Document, node: NodeId, prop: &str, value: &Option<String>| {
            doc.update(node, |el| match value {
                Some(v) => el.set_style(prop, v),
                None => el.remove_style(prop),
            });
        };
        if let Some(container) = self.saved.container {
            restore(self.doc, container, "overflow", &self.saved.container_overflow);
            restore(self.doc, container, "width", &self.saved.container_width);
        }
        restore(self.doc, self.target, "min-width", &self.saved.target_min_width);
        restore(self.doc, self.target, "width", &self.saved.target_width);
        debug!("capture session restored live tree");
    }

    /// Run restoration and release the borrow on the document
    pub fn finish(mut self) {
        self.restore_now();
    }
}

impl Drop for CaptureSession<'_> {
    fn drop(&mut self) {
        self.restore_now();
    }
}

/// Remove artifacts of an earlier invocation that never completed
/// restoration: the override sheet and the wrapper, reattaching any capture
/// target found inside the wrapper at the wrapper's position. Runs on every
/// invocation before any new work, so the system self-heals across runs.
/// Returns true when something stale was found.
pub fn sweep_stale_artifacts(doc: &mut Document) -> bool {
    let mut swept = doc.styles.remove(OVERRIDE_STYLE_ID);

    if let Some(wrapper) = doc.by_id(WRAPPER_ID) {
        if let Some(target) = doc.by_id(CAPTURE_TARGET_ID) {
            if doc.is_descendant(target, wrapper) {
                doc.detach(target);
                doc.insert_before(wrapper, target);
            }
        }
        doc.detach(wrapper);
        swept = true;
    }

    if swept {
        warn!("removed stale export artifacts left by an earlier invocation");
    }
    swept
}
