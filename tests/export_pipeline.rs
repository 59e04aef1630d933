use chrono::NaiveDate;
use futures::future::{self, FutureExt};

use redtimeline::error::Error;
use redtimeline::export::{
    export_to_png, snapshot_colors, CaptureSession, ExportOptions, CAPTURE_TARGET_ID, WRAPPER_ID,
};
use redtimeline::panel::{build_app_panel, Document, Element};
use redtimeline::rendering::layout::Scene;
use redtimeline::rendering::raster::{RasterOptions, Rasterizer, SoftwareRasterizer};
use redtimeline::rendering::Screenshot;
use redtimeline::theme::ThemeState;
use redtimeline::{AppState, Team, TimelineConfig, TimelineEvent};

fn sample_state() -> AppState {
    AppState {
        config: TimelineConfig {
            title: "Q1 Review".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2024-03-31".to_string(),
        },
        events: vec![
            TimelineEvent {
                id: "e1".to_string(),
                date: "2024-01-15".to_string(),
                team: Team::Red,
                description: "Initial access".to_string(),
            },
            TimelineEvent {
                id: "e2".to_string(),
                date: "2024-02-02".to_string(),
                team: Team::Blue,
                description: "Containment".to_string(),
            },
        ],
    }
}

fn live_doc() -> Document {
    let mut doc = build_app_panel(&sample_state());
    ThemeState::new().apply_to(&mut doc);
    doc
}

fn opts(dir: &tempfile::TempDir) -> ExportOptions {
    ExportOptions {
        out_dir: dir.path().to_path_buf(),
        date: Some(NaiveDate::from_ymd_opt(2024, 6, 15).expect("date")),
        ..Default::default()
    }
}

/// Rasterizer double that always rejects the scene
struct FailingRasterizer;

impl Rasterizer for FailingRasterizer {
    fn rasterize(
        &self,
        _scene: Scene,
        _opts: RasterOptions,
    ) -> future::BoxFuture<'static, redtimeline::Result<Screenshot>> {
        future::ready(Err(Error::Rasterization("backend refused the scene".to_string()))).boxed()
    }
}

fn count_capture_targets(doc: &Document) -> usize {
    doc.structure_signature()
        .matches("id=Some(\"timeline-capture\")")
        .count()
}

#[tokio::test]
async fn successful_export_restores_the_live_tree_exactly() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut doc = live_doc();
    let state = sample_state();
    let before = doc.structure_signature();

    let path = export_to_png(&mut doc, Some(&state.config), &SoftwareRasterizer, &opts(&dir))
        .await
        .expect("export");

    assert_eq!(doc.structure_signature(), before);
    assert!(doc.styles.is_empty());
    assert!(path.exists());

    let bytes = std::fs::read(&path).expect("read png");
    assert_eq!(&bytes[0..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn filename_uses_the_fixed_prefix_and_date() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut doc = live_doc();

    let path = export_to_png(&mut doc, None, &SoftwareRasterizer, &opts(&dir))
        .await
        .expect("export");

    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("redteam-timeline-2024-06-15.png")
    );
}

#[tokio::test]
async fn rasterizer_failure_still_restores_and_emits_no_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut doc = live_doc();
    let state = sample_state();
    let before = doc.structure_signature();

    let err = export_to_png(&mut doc, Some(&state.config), &FailingRasterizer, &opts(&dir))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Rasterization(_)));
    assert_eq!(doc.structure_signature(), before);
    assert!(doc.styles.is_empty());
    assert_eq!(
        std::fs::read_dir(dir.path()).expect("dir").count(),
        0,
        "no partial download may be emitted"
    );
}

#[tokio::test]
async fn missing_target_fails_before_any_mutation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut doc = Document::new();
    let root = doc.root_id();
    doc.append_new(root, Element::new("body").with_class("app"));
    let before = doc.structure_signature();

    let err = export_to_png(&mut doc, None, &SoftwareRasterizer, &opts(&dir))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TargetNotFound(_)));
    assert_eq!(doc.structure_signature(), before);
    assert_eq!(std::fs::read_dir(dir.path()).expect("dir").count(), 0);
}

#[tokio::test]
async fn stale_artifacts_from_a_crashed_run_are_healed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut doc = live_doc();
    let state = sample_state();
    let target = doc.by_id(CAPTURE_TARGET_ID).expect("target");
    let original_parent = doc.parent(target).expect("parent");

    // Crash mid-capture: the session never restores
    {
        let mut session = CaptureSession::begin(&mut doc, target);
        let colors = snapshot_colors(session.doc());
        session.compose(Some(&state.config), &colors).expect("compose");
        std::mem::forget(session);
    }
    assert!(doc.by_id(WRAPPER_ID).is_some());
    assert!(!doc.styles.is_empty());

    // The next invocation sweeps, then completes normally
    export_to_png(&mut doc, Some(&state.config), &SoftwareRasterizer, &opts(&dir))
        .await
        .expect("export after crash");

    assert!(doc.by_id(WRAPPER_ID).is_none());
    assert!(doc.styles.is_empty());
    assert_eq!(count_capture_targets(&doc), 1);
    let target = doc.by_id(CAPTURE_TARGET_ID).expect("target");
    assert_eq!(doc.parent(target), Some(original_parent));
}

#[tokio::test]
async fn no_override_styling_leaks_outside_the_wrapper() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut doc = live_doc();

    // The timeline bar is repainted to #ddd while the override sheet is
    // installed; once the pipeline settles nothing may still resolve.
    let capture = doc.by_id(CAPTURE_TARGET_ID).expect("target");
    let bar = doc
        .children(capture)
        .into_iter()
        .find(|n| doc.element(*n).class_attr().contains("bar"))
        .expect("bar");
    assert_eq!(doc.effective_style(bar, "background"), None);

    export_to_png(&mut doc, None, &SoftwareRasterizer, &opts(&dir))
        .await
        .expect("export");

    assert_eq!(doc.effective_style(bar, "background"), None);
    assert!(doc.styles.is_empty());
}

#[tokio::test]
async fn alternating_failures_and_successes_stay_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut doc = live_doc();
    let state = sample_state();
    let before = doc.structure_signature();

    for round in 0..3 {
        let result = if round == 1 {
            export_to_png(&mut doc, Some(&state.config), &FailingRasterizer, &opts(&dir)).await
        } else {
            export_to_png(&mut doc, Some(&state.config), &SoftwareRasterizer, &opts(&dir)).await
        };
        assert_eq!(result.is_err(), round == 1);
        assert_eq!(doc.structure_signature(), before, "round {round} mutated the tree");
    }
}
