//! Scoped stylesheet model for the live presentation tree.
//!
//! Rules are deliberately tiny compared to real CSS: a selector matches an
//! element by exact id, by substrings of its class attribute, or universally,
//! and may additionally require a named ancestor (`within_id`). The export
//! pipeline relies on that ancestor scoping to keep its override sheet from
//! leaking into the live tree outside the wrapper.

use crate::panel::Element;

/// A single selector. All populated constraints must hold for a match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    /// Element id that must appear on a strict ancestor
    pub within_id: Option<String>,
    /// Exact element id
    pub id: Option<String>,
    /// Substrings that must all occur in the class attribute
    pub class_contains: Vec<String>,
    /// Substrings that must not occur in the class attribute
    pub class_excludes: Vec<String>,
    /// Matches any element (subject to `within_id`)
    pub universal: bool,
}

impl Selector {
    /// Selector matching an element with the exact id
    pub fn id(id: &str) -> Self {
        Selector { id: Some(id.to_string()), ..Default::default() }
    }

    /// Selector matching elements whose class attribute contains `part`
    /// (the `[class*="part"]` form)
    pub fn class_part(part: &str) -> Self {
        Selector { class_contains: vec![part.to_string()], ..Default::default() }
    }

    /// Selector matching every element
    pub fn any() -> Self {
        Selector { universal: true, ..Default::default() }
    }

    /// Require a strict ancestor carrying the given element id
    pub fn within(mut self, ancestor_id: &str) -> Self {
        self.within_id = Some(ancestor_id.to_string());
        self
    }

    /// Add a `:not([class*="part"])` constraint
    pub fn excluding(mut self, part: &str) -> Self {
        self.class_excludes.push(part.to_string());
        self
    }

    /// Check the element itself (ancestor scoping is the document's job,
    /// see [`crate::panel::Document::effective_style`]).
    pub fn matches_subject(&self, el: &Element) -> bool {
        if self.universal {
            return true;
        }
        if let Some(id) = &self.id {
            return el.id.as_deref() == Some(id.as_str());
        }
        if self.class_contains.is_empty() {
            return false;
        }
        let attr = el.class_attr();
        self.class_contains.iter().all(|p| attr.contains(p.as_str()))
            && !self.class_excludes.iter().any(|p| attr.contains(p.as_str()))
    }
}

/// A rule: one or more comma-alternative selectors plus declarations.
/// Declarations installed through the registry behave as `!important`,
/// so they win over inline styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selectors: Vec<Selector>,
    pub decls: Vec<(String, String)>,
}

impl Rule {
    pub fn new(selectors: Vec<Selector>) -> Self {
        Rule { selectors, decls: Vec::new() }
    }

    pub fn set(mut self, prop: &str, value: &str) -> Self {
        self.decls.push((prop.to_string(), value.to_string()));
        self
    }

    pub fn value_of(&self, prop: &str) -> Option<&str> {
        self.decls
            .iter()
            .rev()
            .find(|(p, _)| p == prop)
            .map(|(_, v)| v.as_str())
    }
}

/// A uniquely identified stylesheet, e.g. the export light-theme override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    pub id: String,
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    pub fn new(id: &str) -> Self {
        Stylesheet { id: id.to_string(), rules: Vec::new() }
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }
}

/// Document-level registry of injected stylesheets, keyed by sheet id
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    sheets: Vec<Stylesheet>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a sheet. A sheet with the same id is replaced in place, so a
    /// given id exists at most once.
    pub fn insert(&mut self, sheet: Stylesheet) {
        if let Some(existing) = self.sheets.iter_mut().find(|s| s.id == sheet.id) {
            *existing = sheet;
        } else {
            self.sheets.push(sheet);
        }
    }

    /// Remove a sheet by id. Returns true when something was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.sheets.len();
        self.sheets.retain(|s| s.id != id);
        self.sheets.len() != before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sheets.iter().any(|s| s.id == id)
    }

    pub fn sheets(&self) -> impl Iterator<Item = &Stylesheet> {
        self.sheets.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
