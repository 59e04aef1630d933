//! Structured JSON export/import of the application state.
//!
//! This path serializes the real state (config + events); it shares nothing
//! with the PNG snapshot pipeline beyond the filename convention.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;

use crate::error::{Error, Result};
use crate::export::FILENAME_PREFIX;
use crate::AppState;

/// `redteam-timeline-YYYY-MM-DD.json`
pub fn json_filename(date: NaiveDate) -> String {
    format!("{}-{}.json", FILENAME_PREFIX, date.format("%Y-%m-%d"))
}

/// Write the state as pretty-printed JSON into `out_dir`
pub fn export_state(state: &AppState, out_dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(state)
        .map_err(|e| Error::Other(format!("failed to serialize state: {e}")))?;
    let path = out_dir.join(json_filename(date));
    fs::write(&path, json)?;
    info!("exported timeline state to {}", path.display());
    Ok(path)
}

/// Read and validate a previously exported state file
pub fn import_state(path: &Path) -> Result<AppState> {
    let raw = fs::read_to_string(path)?;
    let state: AppState =
        serde_json::from_str(&raw).map_err(|e| Error::Import(format!("not a timeline file: {e}")))?;
    validate(&state)?;
    Ok(state)
}

fn validate(state: &AppState) -> Result<()> {
    let parse = |s: &str, what: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| Error::Import(format!("{what} `{s}` is not an ISO date")))
    };
    let start = parse(&state.config.start_date, "start date")?;
    let end = parse(&state.config.end_date, "end date")?;
    if end < start {
        return Err(Error::Import(format!(
            "end date {} precedes start date {}",
            state.config.end_date, state.config.start_date
        )));
    }
    for event in &state.events {
        parse(&event.date, "event date")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Team, TimelineConfig, TimelineEvent};

    fn state() -> AppState {
        AppState {
            config: TimelineConfig {
                title: "Exercise".to_string(),
                start_date: "2024-01-01".to_string(),
                end_date: "2024-02-01".to_string(),
            },
            events: vec![TimelineEvent {
                id: "e1".to_string(),
                date: "2024-01-10".to_string(),
                team: Team::Blue,
                description: "Containment".to_string(),
            }],
        }
    }

    #[test]
    fn export_then_import_preserves_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).expect("date");
        let path = export_state(&state(), dir.path(), date).expect("export");
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("redteam-timeline-2024-06-15.json")
        );
        let imported = import_state(&path).expect("import");
        assert_eq!(imported, state());
    }

    #[test]
    fn import_rejects_inverted_date_range() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut bad = state();
        bad.config.end_date = "2023-01-01".to_string();
        let path = dir.path().join("bad.json");
        fs::write(&path, serde_json::to_string(&bad).expect("json")).expect("write");

        let err = import_state(&path).unwrap_err();
        assert!(matches!(err, Error::Import(_)));
    }

    #[test]
    fn import_rejects_non_timeline_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("other.json");
        fs::write(&path, r#"{"hello": "world"}"#).expect("write");
        let err = import_state(&path).unwrap_err();
        assert!(matches!(err, Error::Import(_)));
    }
}
