//! # Scene Transition Engine
//!
//! Swaps the scene shown in a live container for another one, animating the
//! handoff with a style from the catalog.
//!
//! Requests are serialized: while one transition is animating, new requests
//! wait in a FIFO queue and are executed one after another by a single driver
//! task. A failure anywhere in the animation degrades to an instant swap, so
//! the destination always ends up live.

use crate::animation::EasingType;
use crate::config::{self, ConfigUpdate, EngineConfig};
use crate::errors::{EngineError, EngineResult, SurfaceResult};
use crate::scene::SceneNode;
use crate::surface::Surface;
use crate::systems::stylesheet::{self, CONTAINER_CLASS, DURATION_VAR, EASING_VAR};
use crate::systems::transitions::{self, TransitionPhase, TransitionStyle};
use crate::types::{EngineStatus, NodeId, TransitionOutcome};
use serde::Serialize;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Capacity of the lifecycle event channel. Slow subscribers see `Lagged`.
const EVENT_CAPACITY: usize = 64;

/// A request to replace `source` with `destination` in the live container.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionRequest {
    /// The scene currently shown, if any.
    pub source: Option<NodeId>,
    /// The scene to show.
    pub destination: NodeId,
    /// Style override; `None` uses the engine default at execution time.
    pub style: Option<TransitionStyle>,
}

/// Lifecycle notifications published by the engine.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TransitionEvent {
    Started { id: u64, style: TransitionStyle },
    Finished { id: u64, outcome: TransitionOutcome },
    Rejected { id: u64 },
}

/// The transition currently animating. At most one exists per engine.
#[derive(Clone, Debug)]
pub struct ActiveTransition {
    pub id: u64,
    pub style: TransitionStyle,
    pub duration: Duration,
    pub easing: EasingType,
    /// Ephemeral wrapper around the source snapshot.
    pub source_container: Option<NodeId>,
    /// Ephemeral wrapper around the real destination.
    pub destination_container: Option<NodeId>,
    /// When the active state classes were applied.
    pub animating_since: Option<Instant>,
}

impl ActiveTransition {
    /// Eased progress in `0.0..=1.0`, once the active classes are applied.
    pub fn progress(&self) -> Option<f32> {
        let since = self.animating_since?;
        let linear = if self.duration.is_zero() {
            1.0
        } else {
            (since.elapsed().as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        };
        Some(self.easing.eval(linear))
    }
}

/// Resolves once the request has been carried out (or rejected).
///
/// Dropping a handle does not cancel the transition.
#[must_use = "a TransitionHandle does nothing unless awaited"]
pub struct TransitionHandle {
    id: u64,
    rx: oneshot::Receiver<EngineResult<TransitionOutcome>>,
}

impl TransitionHandle {
    fn ready(id: u64, result: EngineResult<TransitionOutcome>) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self { id, rx }
    }

    /// Sequence number assigned at submission.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Future for TransitionHandle {
    type Output = EngineResult<TransitionOutcome>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(EngineError::Dropped)))
    }
}

struct QueuedTransition {
    id: u64,
    request: TransitionRequest,
    reply: oneshot::Sender<EngineResult<TransitionOutcome>>,
}

/// Everything an execution needs, captured when it leaves the queue.
struct Run {
    id: u64,
    request: TransitionRequest,
    reply: oneshot::Sender<EngineResult<TransitionOutcome>>,
    style: TransitionStyle,
    duration: Duration,
    easing: EasingType,
    surface: Arc<dyn Surface>,
}

struct EngineState {
    config: EngineConfig,
    queue: VecDeque<QueuedTransition>,
    active: Option<ActiveTransition>,
    /// Released on teardown.
    surface: Option<Arc<dyn Surface>>,
    torn_down: bool,
}

struct Shared {
    live: NodeId,
    state: Mutex<EngineState>,
    next_id: AtomicU64,
    events: broadcast::Sender<TransitionEvent>,
}

/// Animated, queued scene swaps on a [`Surface`].
///
/// Cloning yields another handle to the same engine.
///
/// Transitions are driven by a Tokio task, so [`request_transition`](Self::request_transition)
/// must be called from within a Tokio runtime. A `current_thread` runtime
/// gives the single-threaded, cooperative behaviour of a browser event loop.
#[derive(Clone)]
pub struct SceneTransitionEngine {
    shared: Arc<Shared>,
}

impl SceneTransitionEngine {
    /// Creates an engine with the default configuration.
    pub fn new(surface: Arc<dyn Surface>, live_container: NodeId) -> EngineResult<Self> {
        Self::with_config(surface, live_container, EngineConfig::default())
    }

    /// Creates an engine and injects the transition stylesheet into `surface`
    /// if no other engine has done so yet.
    pub fn with_config(
        surface: Arc<dyn Surface>,
        live_container: NodeId,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        config.validate()?;
        stylesheet::ensure_stylesheet(surface.as_ref())?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        info!(
            live_container,
            style = %config.default_style,
            duration_ms = config.duration_ms,
            "Scene transition engine ready"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                live: live_container,
                state: Mutex::new(EngineState {
                    config,
                    queue: VecDeque::new(),
                    active: None,
                    surface: Some(surface),
                    torn_down: false,
                }),
                next_id: AtomicU64::new(1),
                events,
            }),
        })
    }

    /// The node whose children the engine swaps.
    pub fn live_container(&self) -> NodeId {
        self.shared.live
    }

    /// Merges `update` into the configuration.
    ///
    /// Running transitions keep the settings they started with. Turning
    /// `enabled` off through here has the same effect as [`disable`](Self::disable).
    pub fn configure(&self, update: &ConfigUpdate) -> EngineResult<()> {
        let (was_enabled, now_enabled) = {
            let mut state = self.shared.lock();
            if state.torn_down {
                return Err(EngineError::TornDown);
            }
            let next = state.config.merged(update)?;
            let was_enabled = state.config.enabled;
            debug!(?update, "Configuration updated");
            state.config = next;
            (was_enabled, state.config.enabled)
        };

        if was_enabled && !now_enabled {
            self.disable();
        }
        Ok(())
    }

    /// Applies one of the built-in presets (see [`config::PRESETS`]).
    pub fn apply_preset(&self, name: &str) -> EngineResult<()> {
        let preset = config::preset(name)?;
        info!(preset = preset.name, "Applying preset");
        self.configure(&preset.to_update())
    }

    /// Returns a copy of the current configuration.
    pub fn config(&self) -> EngineConfig {
        self.shared.lock().config.clone()
    }

    /// Identifiers of every built-in style, in catalog order.
    pub fn list_available_styles(&self) -> Vec<&'static str> {
        transitions::available_styles()
    }

    /// Requests a transition, naming the style as a string.
    ///
    /// An unknown style name fails fast: the handle resolves to
    /// [`EngineError::UnknownStyle`] and the surface is left untouched.
    pub fn request_transition(
        &self,
        source: Option<NodeId>,
        destination: NodeId,
        style: Option<&str>,
    ) -> TransitionHandle {
        match style.map(str::parse::<TransitionStyle>).transpose() {
            Ok(style) => self.submit(TransitionRequest {
                source,
                destination,
                style,
            }),
            Err(err) => {
                let id = self.shared.allocate_id();
                warn!(id, error = %err, "Rejected transition request");
                TransitionHandle::ready(id, Err(err))
            }
        }
    }

    /// Submits a transition request.
    ///
    /// When transitions are disabled the scenes are swapped immediately. When
    /// a transition is already running, the request joins the queue. Otherwise
    /// it starts right away.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime while a transition needs to start.
    pub fn submit(&self, request: TransitionRequest) -> TransitionHandle {
        let id = self.shared.allocate_id();
        let mut state = self.shared.lock();

        if state.torn_down {
            return TransitionHandle::ready(id, Err(EngineError::TornDown));
        }
        let Some(surface) = state.surface.clone() else {
            return TransitionHandle::ready(id, Err(EngineError::TornDown));
        };

        if !state.config.enabled {
            drop(state);
            debug!(id, destination = request.destination, "Transitions disabled, swapping instantly");
            let result = swap_instant(surface.as_ref(), self.shared.live, request.source, request.destination)
                .map(|_| TransitionOutcome::Instant)
                .map_err(EngineError::from);
            if let Ok(outcome) = &result {
                self.shared.publish(TransitionEvent::Finished {
                    id,
                    outcome: outcome.clone(),
                });
            }
            return TransitionHandle::ready(id, result);
        }

        let (reply, rx) = oneshot::channel();
        let entry = QueuedTransition { id, request, reply };

        if state.active.is_some() {
            state.queue.push_back(entry);
            debug!(id, queue_length = state.queue.len(), "Transition queued");
            return TransitionHandle { id, rx };
        }

        let run = state.begin(entry, surface);
        drop(state);
        self.shared.publish(TransitionEvent::Started { id, style: run.style });
        tokio::spawn(drive(self.shared.clone(), run));
        TransitionHandle { id, rx }
    }

    /// Turns transitions off and rejects every request still waiting in the
    /// queue with [`EngineError::Disabled`]. A running transition finishes normally.
    ///
    /// Returns the number of rejected requests.
    pub fn disable(&self) -> usize {
        let drained: Vec<QueuedTransition> = {
            let mut state = self.shared.lock();
            state.config.enabled = false;
            state.queue.drain(..).collect()
        };

        let count = drained.len();
        for entry in drained {
            warn!(id = entry.id, "Queued transition rejected: transitions disabled");
            self.shared.publish(TransitionEvent::Rejected { id: entry.id });
            let _ = entry.reply.send(Err(EngineError::Disabled));
        }
        info!(rejected = count, "Transitions disabled");
        count
    }

    /// Turns transitions back on. Queued and running requests are unaffected.
    pub fn enable(&self) -> EngineResult<()> {
        let mut state = self.shared.lock();
        if state.torn_down {
            return Err(EngineError::TornDown);
        }
        state.config.enabled = true;
        info!("Transitions enabled");
        Ok(())
    }

    /// Returns a snapshot of the engine's state.
    pub fn status(&self) -> EngineStatus {
        let state = self.shared.lock();
        EngineStatus {
            is_transitioning: state.active.is_some(),
            active_style: state.active.as_ref().map(|a| a.style),
            progress: state.active.as_ref().and_then(|a| a.progress()),
            queue_length: state.queue.len(),
            enabled: state.config.enabled,
            default_style: state.config.default_style,
            duration_ms: state.config.duration_ms,
            easing: state.config.easing,
        }
    }

    /// Returns the transition currently animating, if any.
    pub fn active(&self) -> Option<ActiveTransition> {
        self.shared.lock().active.clone()
    }

    /// Subscribes to lifecycle events for requests submitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.shared.events.subscribe()
    }

    /// Disables the engine, rejecting queued requests, and releases the
    /// surface. Every later call fails with [`EngineError::TornDown`].
    ///
    /// A transition that is already running still completes.
    pub fn teardown(&self) {
        self.disable();
        let mut state = self.shared.lock();
        state.torn_down = true;
        state.surface = None;
        info!("Scene transition engine torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.shared.lock().torn_down
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn publish(&self, event: TransitionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn update_active(&self, f: impl FnOnce(&mut ActiveTransition)) {
        if let Some(active) = self.lock().active.as_mut() {
            f(active);
        }
    }
}

impl EngineState {
    /// Marks the engine busy with `entry`, capturing the settings it runs with.
    fn begin(&mut self, entry: QueuedTransition, surface: Arc<dyn Surface>) -> Run {
        let style = entry.request.style.unwrap_or(self.config.default_style);
        let duration = self.config.duration();
        let easing = self.config.easing;

        self.active = Some(ActiveTransition {
            id: entry.id,
            style,
            duration,
            easing,
            source_container: None,
            destination_container: None,
            animating_since: None,
        });

        Run {
            id: entry.id,
            request: entry.request,
            reply: entry.reply,
            style,
            duration,
            easing,
            surface,
        }
    }
}

/// Executes `run`, then keeps popping the queue until it is empty.
async fn drive(shared: Arc<Shared>, first: Run) {
    let mut run = first;
    loop {
        let result = execute(&shared, &run).await;

        let next = {
            let mut state = shared.lock();
            state.active = None;
            match (state.queue.pop_front(), state.surface.clone()) {
                (Some(entry), Some(surface)) => Some(state.begin(entry, surface)),
                (Some(entry), None) => {
                    let _ = entry.reply.send(Err(EngineError::TornDown));
                    None
                }
                (None, _) => None,
            }
        };

        if let Ok(outcome) = &result {
            shared.publish(TransitionEvent::Finished {
                id: run.id,
                outcome: outcome.clone(),
            });
        }
        let _ = run.reply.send(result);

        match next {
            Some(next) => {
                shared.publish(TransitionEvent::Started {
                    id: next.id,
                    style: next.style,
                });
                run = next;
            }
            None => break,
        }
    }
}

#[instrument(
    name = "transition",
    skip_all,
    fields(id = run.id, style = %run.style, duration_ms = run.duration.as_millis() as u64)
)]
async fn execute(shared: &Shared, run: &Run) -> EngineResult<TransitionOutcome> {
    info!(
        source = ?run.request.source,
        destination = run.request.destination,
        "Transition started"
    );

    let mut containers = Containers::default();
    match animate(shared, run, &mut containers).await {
        Ok(()) => {
            info!("Transition complete");
            Ok(TransitionOutcome::Animated {
                style: run.style,
                duration: run.duration,
            })
        }
        Err(err) => {
            error!(error = %err, "Transition failed, swapping without animation");
            let surface = run.surface.as_ref();
            let swapped = swap_instant(surface, shared.live, run.request.source, run.request.destination);
            containers.discard(surface, run.request.destination);
            match swapped {
                Ok(()) => Ok(TransitionOutcome::Fallback {
                    reason: err.to_string(),
                }),
                Err(swap_err) => {
                    error!(error = %swap_err, "Fallback swap failed");
                    restore_source(surface, shared.live, run.request.source);
                    Err(swap_err.into())
                }
            }
        }
    }
}

/// Ephemeral nodes created for one execution.
#[derive(Default)]
struct Containers {
    snapshot: Option<NodeId>,
    exit: Option<NodeId>,
    enter: Option<NodeId>,
}

impl Containers {
    /// Destroys the snapshot and the wrappers, sparing any wrapper that still
    /// holds `destination`.
    fn discard(&mut self, surface: &dyn Surface, destination: NodeId) {
        // The snapshot goes first so it is released even if it never made it
        // into the exit wrapper.
        if let Some(snapshot) = self.snapshot.take() {
            if let Err(err) = surface.destroy(snapshot) {
                warn!(snapshot, error = %err, "Failed to discard source snapshot");
            }
        }
        for wrapper in [self.exit.take(), self.enter.take()].into_iter().flatten() {
            if surface.contains(wrapper, destination) {
                warn!(wrapper, destination, "Leaving wrapper that still holds the destination");
                continue;
            }
            if let Err(err) = surface.destroy(wrapper) {
                warn!(wrapper, error = %err, "Failed to discard transition container");
            }
        }
    }
}

async fn animate(shared: &Shared, run: &Run, containers: &mut Containers) -> SurfaceResult<()> {
    let surface = run.surface.as_ref();
    let live = shared.live;
    let style = run.style;
    let destination = run.request.destination;

    // Build both sides off-screen first, so a bad destination fails while the
    // source is still live.
    if let Some(source) = run.request.source {
        let snapshot = surface.snapshot(source)?;
        containers.snapshot = Some(snapshot);
        let exit = surface.create_element(
            SceneNode::new("div")
                .with_class(CONTAINER_CLASS)
                .with_class(style.class(TransitionPhase::Exit)),
        )?;
        containers.exit = Some(exit);
        surface.append_child(exit, snapshot)?;
    }

    let enter = surface.create_element(
        SceneNode::new("div")
            .with_class(CONTAINER_CLASS)
            .with_class(style.class(TransitionPhase::Enter)),
    )?;
    containers.enter = Some(enter);
    surface.append_child(enter, destination)?;

    // Exit side animates the detached copy while the real source leaves the container.
    if let (Some(source), Some(exit)) = (run.request.source, containers.exit) {
        if surface.contains(live, source) {
            surface.remove_child(live, source)?;
        }
        surface.append_child(live, exit)?;
    }
    surface.append_child(live, enter)?;
    shared.update_active(|active| {
        active.source_container = containers.exit;
        active.destination_container = containers.enter;
    });
    debug!(exit = ?containers.exit, enter, "Transition containers mounted");

    surface.set_style_var(live, DURATION_VAR, &format!("{}ms", run.duration.as_millis()))?;
    surface.set_style_var(live, EASING_VAR, &run.easing.to_css())?;

    // The initial state has to be committed before the active one, or nothing animates.
    surface.flush_layout(live)?;
    surface.next_frame().await;

    if let Some(exit) = containers.exit {
        surface.add_class(exit, &style.class(TransitionPhase::ExitActive))?;
    }
    surface.add_class(enter, &style.class(TransitionPhase::EnterActive))?;
    shared.update_active(|active| active.animating_since = Some(Instant::now()));

    // The configured duration is authoritative; no completion event is awaited.
    tokio::time::sleep(run.duration).await;

    surface.append_child(live, destination)?;
    containers.discard(surface, destination);
    Ok(())
}

/// Appends `destination` to the live container, then removes `source` if present.
///
/// The source stays mounted when `destination` cannot be appended.
fn swap_instant(
    surface: &dyn Surface,
    live: NodeId,
    source: Option<NodeId>,
    destination: NodeId,
) -> SurfaceResult<()> {
    surface.append_child(live, destination)?;
    if let Some(source) = source {
        if source != destination && surface.contains(live, source) {
            surface.remove_child(live, source)?;
        }
    }
    Ok(())
}

/// Puts `source` back into the live container after a failed fallback, so the
/// screen is not left blank.
fn restore_source(surface: &dyn Surface, live: NodeId, source: Option<NodeId>) {
    let Some(source) = source else {
        return;
    };
    if surface.contains(live, source) {
        return;
    }
    match surface.append_child(live, source) {
        Ok(()) => warn!(source, "Restored source scene after failed swap"),
        Err(err) => error!(source, error = %err, "Failed to restore source scene"),
    }
}
