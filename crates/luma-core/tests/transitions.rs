//! Scene Transition Tests
//!
//! Single transitions: the animated path, state classes, style selection and
//! the instant-swap fallbacks.

mod common;

use common::{Board, Fault, FaultySurface, FRAME};
use luma_core::systems::stylesheet::{DURATION_VAR, EASING_VAR, STYLESHEET_ID};
use luma_core::{
    ConfigUpdate, EngineError, SceneTransitionEngine, Surface, SurfaceError, TransitionOutcome,
    TransitionStyle,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn assert_elapsed(elapsed: Duration, expected: Duration) {
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(50),
        "expected ~{:?}, got {:?}",
        expected,
        elapsed
    );
}

#[tokio::test(start_paused = true)]
async fn animated_transition_swaps_scenes() {
    let board = Board::new(&["lobby", "menu"]);
    let lobby = board.mount(0);
    let menu = board.scenes[1];
    let engine = board.engine();

    let start = Instant::now();
    let outcome = engine
        .request_transition(Some(lobby), menu, None)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        TransitionOutcome::Animated {
            style: TransitionStyle::Fade,
            duration: Duration::from_millis(1000),
        }
    );
    assert_elapsed(start.elapsed(), FRAME + Duration::from_millis(1000));
    board.assert_only(menu);

    let status = engine.status();
    assert!(!status.is_transitioning);
    assert_eq!(status.active_style, None);
    assert_eq!(status.queue_length, 0);
}

#[tokio::test(start_paused = true)]
async fn containers_carry_state_classes_mid_flight() {
    let board = Board::new(&["weather", "stocks"]);
    let weather = board.mount(0);
    let stocks = board.scenes[1];
    let engine = board.engine();

    let handle = engine.request_transition(Some(weather), stocks, Some("slide-left"));
    tokio::time::sleep(Duration::from_millis(500)).await;

    let children = board.live_children();
    assert_eq!(children.len(), 2, "{}", board.surface.markup(board.live));
    assert!(!board.surface.contains(board.live, weather));

    {
        let graph = board.surface.graph();
        let exit = graph.get_node(children[0]).unwrap();
        assert!(exit.has_class("luma-transition-container"));
        assert!(exit.has_class("luma-slide-left-exit"));
        assert!(exit.has_class("luma-slide-left-exit-active"));
        // The exit side animates a copy, never the real scene.
        assert_eq!(exit.children.len(), 1);
        assert_ne!(exit.children[0], weather);
        assert_eq!(graph.to_markup(exit.children[0]), graph.to_markup(weather));

        let enter = graph.get_node(children[1]).unwrap();
        assert!(enter.has_class("luma-slide-left-enter"));
        assert!(enter.has_class("luma-slide-left-enter-active"));
        assert_eq!(enter.children, vec![stocks]);

        let live = graph.get_node(board.live).unwrap();
        assert_eq!(live.style_vars.get(DURATION_VAR).map(String::as_str), Some("1000ms"));
        assert_eq!(live.style_vars.get(EASING_VAR).map(String::as_str), Some("ease-in-out"));
    }

    let status = engine.status();
    assert!(status.is_transitioning);
    assert_eq!(status.active_style, Some(TransitionStyle::SlideLeft));
    let progress = status.progress.unwrap();
    assert!(progress > 0.0 && progress < 1.0, "progress {}", progress);

    let active = engine.active().unwrap();
    assert_eq!(active.source_container, Some(children[0]));
    assert_eq!(active.destination_container, Some(children[1]));

    handle.await.unwrap();
    board.assert_only(stocks);
    assert_eq!(board.surface.stats().layout_flushes, 1);
    assert!(board.surface.stats().frames >= 1);
}

#[tokio::test(start_paused = true)]
async fn ephemeral_nodes_are_released() {
    let board = Board::new(&["a", "b"]);
    let a = board.mount(0);
    let b = board.scenes[1];
    let engine = board.engine();
    let before = board.surface.graph().len();

    engine.request_transition(Some(a), b, Some("mosaic")).await.unwrap();

    assert_eq!(board.surface.graph().len(), before);
    // The caller still owns the old scene; it is detached, not destroyed.
    assert!(board.surface.graph().get_node(a).is_some());
    assert_eq!(board.surface.graph().get_node(a).unwrap().parent, None);
}

#[tokio::test(start_paused = true)]
async fn transition_without_source_only_enters() {
    let board = Board::new(&["welcome"]);
    let welcome = board.scenes[0];
    let engine = board.engine();

    let handle = engine.request_transition(None, welcome, Some("zoom"));
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(board.live_children().len(), 1);
    assert_eq!(engine.active().unwrap().source_container, None);

    handle.await.unwrap();
    board.assert_only(welcome);
}

#[tokio::test(start_paused = true)]
async fn style_override_applies_to_one_run() {
    let board = Board::new(&["a", "b", "c"]);
    let a = board.mount(0);
    let (b, c) = (board.scenes[1], board.scenes[2]);
    let engine = board.engine();

    let first = engine.request_transition(Some(a), b, Some("cube")).await.unwrap();
    let second = engine.request_transition(Some(b), c, None).await.unwrap();

    assert!(matches!(first, TransitionOutcome::Animated { style: TransitionStyle::Cube, .. }));
    assert!(matches!(second, TransitionOutcome::Animated { style: TransitionStyle::Fade, .. }));
    assert_eq!(engine.config().default_style, TransitionStyle::Fade);
}

#[tokio::test(start_paused = true)]
async fn unknown_style_fails_fast() {
    let board = Board::new(&["a", "b"]);
    let a = board.mount(0);
    let b = board.scenes[1];
    let engine = board.engine();

    let result = engine.request_transition(Some(a), b, Some("wipe")).await;
    match result {
        Err(EngineError::UnknownStyle(name)) => assert_eq!(name, "wipe"),
        other => panic!("expected UnknownStyle, got {:?}", other),
    }
    board.assert_only(a);
    assert!(!engine.status().is_transitioning);

    assert!(matches!(
        engine.configure(&ConfigUpdate::new().style("sparkle")),
        Err(EngineError::UnknownStyle(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn every_catalog_style_runs() {
    let board = Board::new(&["a", "b"]);
    let (a, b) = (board.scenes[0], board.scenes[1]);
    board.mount(0);
    let engine = board.engine();
    engine.configure(&ConfigUpdate::new().duration_ms(100)).unwrap();

    let mut current = (a, b);
    for style in engine.list_available_styles() {
        let outcome = engine
            .request_transition(Some(current.0), current.1, Some(style))
            .await
            .unwrap();
        assert!(outcome.is_animated(), "{} -> {:?}", style, outcome);
        board.assert_only(current.1);
        current = (current.1, current.0);
    }
}

#[tokio::test(start_paused = true)]
async fn failure_mid_animation_falls_back_to_instant_swap() {
    let board = Board::new(&["a", "b"]);
    let a = board.mount(0);
    let b = board.scenes[1];
    let before = board.surface.graph().len();

    let surface = Arc::new(FaultySurface::new(board.surface.clone(), Fault::AddClass));
    let engine = SceneTransitionEngine::new(surface.clone(), board.live).unwrap();

    let outcome = engine.request_transition(Some(a), b, None).await.unwrap();
    match outcome {
        TransitionOutcome::Fallback { reason } => assert!(reason.contains("injected")),
        other => panic!("expected fallback, got {:?}", other),
    }
    board.assert_only(b);
    assert_eq!(board.surface.graph().len(), before);

    // The engine is back to idle and animates normally once the surface recovers.
    assert!(!engine.status().is_transitioning);
    surface.heal();
    let outcome = engine.request_transition(Some(b), a, None).await.unwrap();
    assert!(outcome.is_animated());
    board.assert_only(a);
}

#[tokio::test(start_paused = true)]
async fn failure_before_first_frame_swaps_without_waiting() {
    for fault in [Fault::Snapshot, Fault::SetStyleVar, Fault::FlushLayout] {
        let board = Board::new(&["a", "b"]);
        let a = board.mount(0);
        let b = board.scenes[1];
        let surface = Arc::new(FaultySurface::new(board.surface.clone(), fault));
        let engine = SceneTransitionEngine::new(surface, board.live).unwrap();

        let start = Instant::now();
        let outcome = engine.request_transition(Some(a), b, None).await.unwrap();
        assert!(
            matches!(outcome, TransitionOutcome::Fallback { .. }),
            "{:?}: {:?}",
            fault,
            outcome
        );
        assert!(start.elapsed() < FRAME, "{:?} waited {:?}", fault, start.elapsed());
        board.assert_only(b);
    }
}

#[tokio::test(start_paused = true)]
async fn missing_destination_reports_surface_error() {
    let board = Board::new(&["a"]);
    let a = board.mount(0);
    let engine = board.engine();

    let before = board.surface.graph().len();

    let result = engine.request_transition(Some(a), 9_999, None).await;
    assert!(matches!(
        result,
        Err(EngineError::Surface(SurfaceError::NodeNotFound(9_999)))
    ));
    // The current scene stays on screen and nothing is left in the arena.
    board.assert_only(a);
    assert_eq!(board.surface.graph().len(), before);
    assert!(!engine.status().is_transitioning);
}

#[tokio::test(start_paused = true)]
async fn destination_lost_mid_flight_keeps_source_on_screen() {
    let board = Board::new(&["a", "b"]);
    let a = board.mount(0);
    let b = board.scenes[1];
    let engine = board.engine();

    let handle = engine.request_transition(Some(a), b, Some("fade"));
    tokio::time::sleep(FRAME + Duration::from_millis(100)).await;
    assert!(engine.status().is_transitioning);
    board.surface.destroy(b).unwrap();

    let result = handle.await;
    assert!(matches!(
        result,
        Err(EngineError::Surface(SurfaceError::NodeNotFound(id))) if id == b
    ));
    board.assert_only(a);
}

#[tokio::test(start_paused = true)]
async fn backend_failure_releases_source_snapshot() {
    let board = Board::new(&["a", "b"]);
    let a = board.mount(0);
    let b = board.scenes[1];
    let before = board.surface.graph().len();

    let surface = Arc::new(FaultySurface::new(board.surface.clone(), Fault::CreateElement));
    let engine = SceneTransitionEngine::new(surface, board.live).unwrap();

    let outcome = engine.request_transition(Some(a), b, None).await.unwrap();
    match outcome {
        TransitionOutcome::Fallback { reason } => {
            assert_eq!(reason, "injected CreateElement failure")
        }
        other => panic!("expected fallback, got {:?}", other),
    }
    board.assert_only(b);
    assert_eq!(board.surface.graph().len(), before);
}

#[tokio::test(start_paused = true)]
async fn disabled_engine_swaps_instantly() {
    let board = Board::new(&["x", "y"]);
    let x = board.mount(0);
    let y = board.scenes[1];
    let engine = board.engine();
    let before = board.surface.graph().len();

    assert_eq!(engine.disable(), 0);

    let start = Instant::now();
    let outcome = engine.request_transition(Some(x), y, None).await.unwrap();
    assert_eq!(outcome, TransitionOutcome::Instant);
    assert_eq!(start.elapsed(), Duration::ZERO);
    board.assert_only(y);

    // No containers were ever created.
    assert_eq!(board.surface.graph().len(), before);
    assert_eq!(board.surface.stats().layout_flushes, 0);
    assert!(!engine.status().enabled);

    engine.enable().unwrap();
    let outcome = engine.request_transition(Some(y), x, None).await.unwrap();
    assert!(outcome.is_animated());
}

#[tokio::test(start_paused = true)]
async fn stylesheet_is_injected_once_per_surface() {
    let board = Board::new(&[]);
    let first = board.engine();
    let second = board.engine();

    assert!(board.surface.has_stylesheet(STYLESHEET_ID));
    assert_eq!(board.surface.stats().stylesheet_inserts, 1);
    assert_eq!(first.list_available_styles(), second.list_available_styles());
}
