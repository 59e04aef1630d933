//! Theme mode and semantic color state.
//!
//! The four semantic colors are published to the document root as CSS custom
//! properties, which is where the export pipeline's style snapshot reader
//! picks them up. Persisting the preference across runs is a caller concern.

use crate::panel::Document;
use crate::CustomColors;
use serde::{Deserialize, Serialize};

/// Custom property names, one per semantic color
pub const VAR_RED_TEAM: &str = "--color-red-team";
pub const VAR_BLUE_TEAM: &str = "--color-blue-team";
pub const VAR_TIMELINE_BAR: &str = "--color-timeline-bar";
pub const VAR_FLAG_POLE: &str = "--color-flag-pole";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Dark,
    Light,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }
}

/// Per-mode defaults. The team colors are mode-independent; the structural
/// colors (bar, pole) flip with the mode.
pub fn defaults_for(mode: ThemeMode) -> CustomColors {
    match mode {
        ThemeMode::Dark => CustomColors::default(),
        ThemeMode::Light => CustomColors {
            timeline_bar: "#cccccc".to_string(),
            flag_pole: "#444444".to_string(),
            ..CustomColors::default()
        },
    }
}

/// Current theme mode plus the in-use color set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeState {
    pub mode: ThemeMode,
    pub colors: CustomColors,
}

impl ThemeState {
    /// Dark mode with that mode's defaults
    pub fn new() -> Self {
        ThemeState {
            mode: ThemeMode::Dark,
            colors: defaults_for(ThemeMode::Dark),
        }
    }

    /// Switch modes, carrying colors over with one adjustment: any color
    /// still equal to the old mode's default is swapped to the new mode's
    /// default. This cannot tell "left at default" apart from "deliberately
    /// chose a color equal to the default", so it is an approximation, not
    /// a guaranteed-correct policy.
    pub fn set_mode(&mut self, mode: ThemeMode) {
        if mode == self.mode {
            return;
        }
        let old = defaults_for(self.mode);
        let new = defaults_for(mode);
        let swap = |current: &mut String, old_default: &str, new_default: &str| {
            if current == old_default {
                *current = new_default.to_string();
            }
        };
        swap(&mut self.colors.red_team, &old.red_team, &new.red_team);
        swap(&mut self.colors.blue_team, &old.blue_team, &new.blue_team);
        swap(&mut self.colors.timeline_bar, &old.timeline_bar, &new.timeline_bar);
        swap(&mut self.colors.flag_pole, &old.flag_pole, &new.flag_pole);
        self.mode = mode;
    }

    pub fn toggle(&mut self) {
        let next = match self.mode {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        };
        self.set_mode(next);
    }

    pub fn set_colors(&mut self, colors: CustomColors) {
        self.colors = colors;
    }

    pub fn reset_colors(&mut self) {
        self.colors = defaults_for(self.mode);
    }

    /// Publish the theme onto the document root: `data-theme`, color-scheme
    /// and the four custom properties.
    pub fn apply_to(&self, doc: &mut Document) {
        let root = doc.root_id();
        let mode = self.mode.as_str().to_string();
        let colors = self.colors.clone();
        doc.update(root, |el| {
            el.set_attr("data-theme", &mode);
            el.set_style("color-scheme", &mode);
            el.set_style(VAR_RED_TEAM, &colors.red_team);
            el.set_style(VAR_BLUE_TEAM, &colors.blue_team);
            el.set_style(VAR_TIMELINE_BAR, &colors.timeline_bar);
            el.set_style(VAR_FLAG_POLE, &colors.flag_pole);
        });
    }
}

impl Default for ThemeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_swaps_colors_still_at_default() {
        let mut theme = ThemeState::new();
        theme.set_mode(ThemeMode::Light);
        assert_eq!(theme.colors.timeline_bar, "#cccccc");
        assert_eq!(theme.colors.flag_pole, "#444444");
        // Team colors share defaults across modes
        assert_eq!(theme.colors.red_team, "#e74c3c");
    }

    #[test]
    fn toggling_keeps_user_chosen_colors() {
        let mut theme = ThemeState::new();
        theme.colors.timeline_bar = "#123456".to_string();
        theme.set_mode(ThemeMode::Light);
        assert_eq!(theme.colors.timeline_bar, "#123456");
        assert_eq!(theme.colors.flag_pole, "#444444");
    }

    #[test]
    fn apply_writes_custom_properties_to_root() {
        let mut doc = Document::new();
        let theme = ThemeState::new();
        theme.apply_to(&mut doc);
        let root = doc.root_id();
        assert_eq!(doc.element(root).style(VAR_RED_TEAM), Some("#e74c3c"));
        assert_eq!(doc.element(root).attr("data-theme"), Some("dark"));
    }
}
