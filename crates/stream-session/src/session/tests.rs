use std::time::{Duration, Instant};

use serde_json::json;
use stream_common::{BridgeError, FLOW_KEY};
use stream_webview::testing::{DetachMode, FakeBrowser};

use super::*;

const URL: &str = "http://localhost:8082/apps/StreamWidget.html";
const DEFAULT: &str = "{\"default\":true}";

fn settings() -> SessionSettings {
    SessionSettings {
        widget_url: URL.into(),
        initial_size: Size::new(800, 100),
        detach_timeout: Duration::from_millis(200),
    }
}

fn session(mode: DetachMode) -> (StreamSession, FakeBrowser) {
    let fake = FakeBrowser::new(mode);
    let session = StreamSession::new(
        fake.factory(),
        StateSync::new(DEFAULT),
        settings(),
        EventBus::default(),
    );
    (session, fake)
}

fn launch(session: &mut StreamSession, data: Value) {
    let Value::Object(map) = data else {
        panic!("launch data must be an object");
    };
    session.set_launch_data(&map).unwrap();
}

fn zoom_posts(fake: &FakeBrowser) -> Vec<f64> {
    fake.posts()
        .into_iter()
        .filter(|p| p.kind == "zoom")
        .filter_map(|p| p.payload.as_f64())
        .collect()
}

// -----------------------------------------------------------------
// Launch data
// -----------------------------------------------------------------

#[test]
fn launch_data_loads_widget_with_host_flow() {
    let (mut s, fake) = session(DetachMode::Immediate);
    launch(&mut s, json!({"flowchart": "{\"nodes\":[1]}"}));

    let attaches = fake.attaches();
    assert_eq!(attaches.len(), 1);
    assert_eq!(attaches[0].url, URL);
    assert_eq!(attaches[0].flow, "{\"nodes\":[1]}");
    assert_eq!(attaches[0].bounds, Size::new(800, 100));
    assert_eq!(s.state().get(FLOW_KEY), Some(&json!("{\"nodes\":[1]}")));
}

#[test]
fn missing_flow_uses_default() {
    let (mut s, fake) = session(DetachMode::Immediate);
    launch(&mut s, json!({}));
    assert_eq!(fake.attaches()[0].flow, DEFAULT);
    assert_eq!(s.flow(), DEFAULT);
}

#[test]
fn readonly_reaches_content_without_changing_flow() {
    let (mut s, fake) = session(DetachMode::Immediate);
    launch(&mut s, json!({"readonly": true, "noTitle": true, "flowchart": "F"}));
    let options = fake.attaches()[0].options;
    assert!(options.read_only);
    assert!(options.hide_title);
    assert!(s.config().read_only);
    assert_eq!(s.flow(), "F");
}

// -----------------------------------------------------------------
// Reload ordering
// -----------------------------------------------------------------

#[test]
fn reload_waits_for_previous_detach() {
    let (mut s, fake) = session(DetachMode::Delayed(Duration::from_millis(30)));
    launch(&mut s, json!({"flowchart": "A"}));
    let first = s.browser().generation();
    launch(&mut s, json!({"flowchart": "B"}));

    assert_eq!(fake.detached(), vec![first]);
    assert_eq!(fake.attaches().len(), 2);
    assert_eq!(fake.attaches()[1].flow, "B");
}

#[test]
fn stuck_detach_only_delays_reload() {
    let (mut s, fake) = session(DetachMode::Never);
    launch(&mut s, json!({"flowchart": "A"}));

    let start = Instant::now();
    launch(&mut s, json!({"flowchart": "B"}));
    assert!(start.elapsed() >= Duration::from_millis(200));
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(fake.attaches().len(), 2);
    assert!(fake.detached().is_empty());
}

#[test]
fn edits_from_previous_document_are_ignored() {
    let (mut s, fake) = session(DetachMode::Immediate);
    launch(&mut s, json!({"flowchart": "A"}));
    let old_sink = fake.last_sink().unwrap();
    launch(&mut s, json!({"flowchart": "B"}));

    old_sink.push_ipc(json!({"kind": "flow_changed", "payload": "stale"}).to_string());
    s.pump();
    assert_eq!(s.flow(), "B");
}

// -----------------------------------------------------------------
// Edits and state
// -----------------------------------------------------------------

#[test]
fn edits_flow_into_persisted_state() {
    let (mut s, fake) = session(DetachMode::Immediate);
    launch(&mut s, json!({"flowchart": "A"}));
    fake.content_sends("flow_changed", json!("{\"edited\":true}"));
    assert!(s.pump().is_empty());
    assert_eq!(s.state().get(FLOW_KEY), Some(&json!("{\"edited\":true}")));
}

#[test]
fn stop_then_start_reattaches_with_edited_flow() {
    let (mut s, fake) = session(DetachMode::Immediate);
    launch(&mut s, json!({"flowchart": "A", "readonly": true}));
    fake.content_sends("flow_changed", json!("A2"));
    s.pump();

    s.stop().unwrap();
    assert!(!s.browser().is_attached());
    s.start().unwrap();
    s.start().unwrap();

    let attaches = fake.attaches();
    assert_eq!(attaches.len(), 2);
    assert_eq!(attaches[1].flow, "A2");
    assert!(attaches[1].options.read_only);
}

// -----------------------------------------------------------------
// Viewport
// -----------------------------------------------------------------

#[test]
fn host_resize_posts_zoom() {
    let (mut s, fake) = session(DetachMode::Immediate);
    launch(&mut s, json!({"hasWidth": true, "width": 800}));
    s.on_host_resize(Size::new(400, 100));

    assert_eq!(zoom_posts(&fake), vec![0.5]);
    assert_eq!(fake.bounds().last(), Some(&Size::new(400, 100)));

    // Degenerate and repeated sizes change nothing.
    s.on_host_resize(Size::new(0, 100));
    s.on_host_resize(Size::new(400, 100));
    assert_eq!(zoom_posts(&fake), vec![0.5]);
}

#[test]
fn page_load_applies_current_zoom() {
    let (mut s, fake) = session(DetachMode::Immediate);
    launch(&mut s, json!({"hasWidth": true, "width": 400}));
    fake.content_loaded();
    s.pump();
    assert_eq!(zoom_posts(&fake), vec![2.0]);
}

#[test]
fn first_measurement_sets_baseline_and_zoom() {
    let (mut s, fake) = session(DetachMode::Immediate);
    launch(&mut s, json!({}));
    fake.content_sends("measured", json!({"width": 1600, "height": 50}));
    s.pump();
    assert_eq!(s.viewport().baseline_width, 1600);
    assert_eq!(zoom_posts(&fake), vec![0.5]);
}

#[test]
fn growth_publishes_one_resize_request() {
    let (mut s, fake) = session(DetachMode::Immediate);
    launch(&mut s, json!({"hasWidth": true, "width": 800, "pasAanH": true}));
    s.on_host_resize(Size::new(400, 100));
    let mut rx = s.subscribe();

    fake.content_sends("measured", json!({"width": 800, "height": 300}));
    fake.content_sends("measured", json!({"width": 800, "height": 300}));
    assert_eq!(s.pump(), vec![HostEvent::Resize { height: 150 }]);
    assert_eq!(rx.try_recv().ok(), Some(HostEvent::Resize { height: 150 }));
    assert!(rx.try_recv().is_err());

    // The host applied it; nothing further is requested.
    s.on_host_resize(Size::new(400, 150));
    fake.content_sends("measured", json!({"width": 800, "height": 300}));
    assert!(s.pump().is_empty());
}

#[test]
fn no_resize_request_without_auto_height() {
    let (mut s, fake) = session(DetachMode::Immediate);
    launch(&mut s, json!({"hasWidth": true, "width": 800}));
    fake.content_sends("measured", json!({"width": 800, "height": 900}));
    assert!(s.pump().is_empty());
}

#[test]
fn failed_measurement_keeps_viewport() {
    let (mut s, fake) = session(DetachMode::Immediate);
    launch(&mut s, json!({"hasWidth": true, "width": 800, "pasAanH": true}));
    fake.content_sends("measured", json!({"width": 800, "height": 90.2}));
    s.pump();
    let before = *s.viewport();
    assert_eq!(before.rendered_height, 91);

    fake.content_sends("measured", json!({"error": "no svg element"}));
    assert!(s.pump().is_empty());
    assert_eq!(*s.viewport(), before);
}

// -----------------------------------------------------------------
// Flow files
// -----------------------------------------------------------------

#[test]
fn export_then_import_round_trips_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let (mut s, fake) = session(DetachMode::Immediate);
    launch(&mut s, json!({"flowchart": "{\"title\":\"één\"}"}));

    let out = dir.path().join("export.json");
    s.export_flow(&out).unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "{\"title\":\"één\"}");

    let input = dir.path().join("import.json");
    std::fs::write(&input, "{\"imported\":1}").unwrap();
    s.import_flow(&input).unwrap();
    assert_eq!(fake.attaches().len(), 2);
    assert_eq!(fake.attaches()[1].flow, "{\"imported\":1}");
    assert_eq!(s.flow(), "{\"imported\":1}");
}

#[test]
fn import_of_missing_file_keeps_current_document() {
    let dir = tempfile::tempdir().unwrap();
    let (mut s, fake) = session(DetachMode::Immediate);
    launch(&mut s, json!({"flowchart": "A"}));
    let result = s.import_flow(&dir.path().join("missing.json"));
    assert!(matches!(result, Err(StreamError::Io(_))));
    assert_eq!(fake.attaches().len(), 1);
    assert!(s.browser().is_attached());
    assert_eq!(s.flow(), "A");
}

// -----------------------------------------------------------------
// Construction and teardown
// -----------------------------------------------------------------

#[test]
fn from_config_reads_default_flow_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flow.json");
    std::fs::write(&path, "{\"custom\":1}").unwrap();

    let mut config = StreamConfig::default();
    config.content.default_flow_path = Some(path);
    config.viewport.initial_width = 640;

    let fake = FakeBrowser::new(DetachMode::Immediate);
    let mut s = StreamSession::from_config(fake.factory(), &config, EventBus::default()).unwrap();
    launch(&mut s, json!({}));
    assert_eq!(fake.attaches()[0].flow, "{\"custom\":1}");
    assert_eq!(fake.attaches()[0].bounds, Size::new(640, 400));
    assert_eq!(fake.attaches()[0].url, config.widget_url());
}

#[test]
fn destroyed_session_rejects_launch_data() {
    let (mut s, fake) = session(DetachMode::Immediate);
    launch(&mut s, json!({"flowchart": "A"}));
    s.destroy();

    assert_eq!(fake.detached().len(), 1);
    let result = s.set_launch_data(&Map::new());
    assert!(matches!(
        result,
        Err(StreamError::Bridge(BridgeError::UseAfterDestroy("load")))
    ));
    assert_eq!(s.flow(), "A");
}
