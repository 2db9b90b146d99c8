//! End-to-end flows: document source through the text layer service into
//! the highlight engine, the way a viewer host wires them.

use std::thread;
use std::time::{Duration, Instant};

use citemark::highlight::Query;
use citemark::test_utils::{DragScript, FakeDocument, GridLayout, RecordingPainter};
use citemark::text_layer::{RunId, TextLayerEvent, TextLayerService};
use citemark::{EngineConfig, HighlightEngine, TextArena};

type Engine = HighlightEngine<GridLayout, RecordingPainter>;

fn viewer_of(pages: &[&[&str]]) -> (TextLayerService, Engine, GridLayout, RecordingPainter) {
    let arena = TextArena::new();
    let config = EngineConfig::default();

    let service = TextLayerService::new(FakeDocument::new(pages), arena.clone(), &config);
    let layout = GridLayout::new(pages);
    let painter = RecordingPainter::new();
    let engine = HighlightEngine::new(arena, layout.clone(), painter.clone(), config);

    (service, engine, layout, painter)
}

/// Drain service events into the engine until `count` pages are ready.
fn pump_ready(service: &mut TextLayerService, engine: &mut Engine, count: usize) {
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut seen = 0;

    while seen < count {
        assert!(Instant::now() < deadline, "timed out waiting for page text");
        for event in service.poll_events() {
            match event {
                TextLayerEvent::Ready { page, .. } => {
                    engine.on_text_layer_ready(page);
                    seen += 1;
                }
                TextLayerEvent::Failed { page, .. } => engine.on_text_layer_failed(page),
            }
        }
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn query_set_before_text_arrives_highlights_once_ready() {
    let pages: &[&[&str]] = &[
        &["The quick ", "brown fox"],
        &["jumps over "],
        &["the lazy dog"],
    ];
    let (mut service, mut engine, _, painter) = viewer_of(pages);

    engine.set_page_window(0, 2);
    engine.set_query(Some(Query::fuzzy("lazy")));
    assert!(engine.boxes_for(2).is_empty());

    for page in 0..3 {
        service.ensure_page(page);
    }
    pump_ready(&mut service, &mut engine, 3);

    let boxes = engine.boxes_for(2);
    assert_eq!(boxes.len(), 1);
    assert_eq!(boxes[0].rect.left, 42.0);
    assert_eq!(boxes[0].rect.top, 10.0);
    assert_eq!(boxes[0].rect.width, 32.0);

    let (page, bb) = engine.bounding_box().unwrap();
    assert_eq!(page, 2);
    assert_eq!((bb.left, bb.top, bb.right, bb.bottom), (42.0, 10.0, 74.0, 22.0));

    assert!(painter.painted_pages().contains(&2));
}

#[test]
fn drag_selection_becomes_the_next_search() {
    let pages: &[&[&str]] = &[&["The quick ", "brown fox"]];
    let (mut service, mut engine, layout, _) = viewer_of(pages);

    engine.set_page_window(0, 0);
    service.ensure_page(0);
    pump_ready(&mut service, &mut engine, 1);

    let run_top = RunId::new(0, 0);
    let run_bottom = RunId::new(0, 1);

    let emitted = DragScript::new()
        .press(layout.char_center(run_top, 4))
        .drag_to(layout.char_center(run_bottom, 4))
        .release()
        .run(&mut engine);

    assert_eq!(emitted, Some(Query::fuzzy("quick brown")));
    assert!(!engine.is_dragging());

    // The host adopts the emission as the active query.
    engine.set_query(emitted);
    assert_eq!(engine.boxes_for(0).len(), 2);
}

#[test]
fn scrolling_away_evicts_and_clears_out_of_band_matches() {
    let pages: Vec<Vec<&str>> = (0..6)
        .map(|n| match n {
            0 => vec!["mark zero here"],
            _ => vec!["filler line"],
        })
        .collect();
    let slices: Vec<&[&str]> = pages.iter().map(Vec::as_slice).collect();
    let (mut service, mut engine, _, _) = viewer_of(&slices);

    engine.set_page_window(0, 2);
    for page in 0..3 {
        service.ensure_page(page);
    }
    pump_ready(&mut service, &mut engine, 3);

    engine.set_query(Some(Query::fuzzy("mark zero")));
    assert!(!engine.boxes_for(0).is_empty());

    // Scroll to the far end: the window slides to 3..=5 and the band
    // around page 5 evicts everything behind it.
    engine.set_page_window(3, 5);
    engine.set_current_page(5);
    for page in 0..3 {
        service.release_page(page);
    }
    for page in 3..6 {
        service.ensure_page(page);
    }
    pump_ready(&mut service, &mut engine, 3);

    assert!(engine.boxes_for(0).is_empty());
    assert_eq!(service.arena().len(), 3);
    assert!(service.arena().get(0).is_none());
    assert!(service.arena().get(4).is_some());
}

#[test]
fn failed_pages_leave_existing_highlights_alone() {
    let pages: &[&[&str]] = &[&["The quick brown fox"]];
    let (mut service, mut engine, _, _) = viewer_of(pages);

    engine.set_page_window(0, 0);
    service.ensure_page(0);
    pump_ready(&mut service, &mut engine, 1);

    engine.set_query(Some(Query::fuzzy("quick")));
    let before = engine.boxes_for(0).to_vec();
    assert!(!before.is_empty());

    // Request a page the source cannot produce.
    service.ensure_page(9);
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        assert!(Instant::now() < deadline, "timed out waiting for failure");
        let events = service.poll_events();
        if let Some(TextLayerEvent::Failed { page, .. }) = events.first() {
            engine.on_text_layer_failed(*page);
            break;
        }
        thread::sleep(Duration::from_millis(1));
    }

    assert_eq!(engine.boxes_for(0), before.as_slice());
}

#[test]
fn exact_queries_match_case_and_skip_the_fuzzy_pattern() {
    let pages: &[&[&str]] = &[&["the quick ", "Quick fox"]];
    let (mut service, mut engine, _, _) = viewer_of(pages);

    engine.set_page_window(0, 0);
    service.ensure_page(0);
    pump_ready(&mut service, &mut engine, 1);

    // Fuzzy matching is case-insensitive and lands on the first run.
    engine.set_query(Some(Query::fuzzy("quick")));
    assert_eq!(engine.boxes_for(0)[0].rect.left, 42.0);

    // Exact matching is literal and lands on the capitalized second run.
    engine.set_query(Some(Query::exact("Quick")));
    let boxes = engine.boxes_for(0);
    assert_eq!(boxes.len(), 1);
    assert_eq!(boxes[0].rect.left, 10.0);
    assert_eq!(boxes[0].rect.top, 22.0);
    assert_eq!(boxes[0].rect.width, 40.0);
}
