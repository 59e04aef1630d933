//! Redtimeline
//!
//! A red/blue team exercise timeline panel with two portable export paths:
//! a structured JSON export of the underlying state and a flattened PNG
//! snapshot of the currently rendered panel.
//!
//! The PNG path is the interesting one: it temporarily expands the live
//! presentation tree so off-screen content becomes visible, assembles an
//! export-only composition (header + reparented timeline + legend), forces
//! light print-safe styling through a scoped override stylesheet, rasterizes
//! the result asynchronously, and then restores the live tree exactly —
//! on every exit path, including after a crashed earlier invocation.
//!
//! # Example
//!
//! ```no_run
//! use redtimeline::export::{export_to_png, ExportOptions};
//! use redtimeline::rendering::raster::SoftwareRasterizer;
//! use redtimeline::{panel, theme::ThemeState, AppState};
//!
//! # #[tokio::main]
//! # async fn main() -> redtimeline::Result<()> {
//! let state: AppState = serde_json::from_str(r#"{
//!     "config": {"title": "Q1 Review", "startDate": "2024-01-01", "endDate": "2024-03-31"},
//!     "events": []
//! }"#).unwrap();
//!
//! let mut doc = panel::build_app_panel(&state);
//! ThemeState::new().apply_to(&mut doc);
//!
//! let path = export_to_png(
//!     &mut doc,
//!     Some(&state.config),
//!     &SoftwareRasterizer,
//!     &ExportOptions::default(),
//! )
//! .await?;
//! println!("wrote {}", path.display());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

// Live presentation tree: element arena, inline styles, stylesheet registry
pub mod panel;
pub mod style;

// Theme mode + semantic color configuration applied to the document root
pub mod theme;

// PNG snapshot pipeline (expansion, composition, overrides, restoration)
pub mod export;

// Scene layout / paint / raster backends for the composed wrapper
pub mod rendering;

// Structured JSON export/import (shares no state with the snapshot pipeline)
pub mod file_export;

// Toast-style user notifications
pub mod notify;

/// Which team an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Red,
    Blue,
}

/// One dated event on the timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,
    /// ISO-8601 date (`YYYY-MM-DD`)
    pub date: String,
    pub team: Team,
    pub description: String,
}

/// Timeline-wide configuration shown in the export header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineConfig {
    pub start_date: String,
    pub end_date: String,
    pub title: String,
}

/// The full serializable application state (config + events)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub config: TimelineConfig,
    pub events: Vec<TimelineEvent>,
}

/// The semantic color configuration driving timeline styling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomColors {
    pub red_team: String,
    pub blue_team: String,
    pub timeline_bar: String,
    pub flag_pole: String,
}

impl Default for CustomColors {
    fn default() -> Self {
        Self {
            red_team: "#e74c3c".to_string(),
            blue_team: "#3498db".to_string(),
            timeline_bar: "#333333".to_string(),
            flag_pole: "#222222".to_string(),
        }
    }
}
