// engine.rs: Central poll loop orchestrating fetch -> parse -> select -> publish

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use crate::client::{FetchError, TrackInfo, TrackSource};
use crate::display::StatusDisplay;
use crate::lyrics::{parse_lyric_document, select_active_line};

/// Inbound control messages for the engine run loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// External playback-state transition (MPRIS PlaybackStatus, or any
    /// other trigger the host wires up).
    PlaybackChanged(bool),
    /// The poll-interval setting changed; restart the cadence if running.
    IntervalChanged(Duration),
    Shutdown,
}

/// Mutable per-session state, reset to defaults on stop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerSessionState {
    pub is_playing: bool,
    pub track_id: String,
    pub track_name: String,
    pub last_progress: f64,
    pub active_lyric: String,
}

/// Observer for fetch failures the engine otherwise swallows. The original
/// behavior stops the engine on any failed fetch without surfacing the
/// error anywhere; the hook keeps that observable for tests and operators.
pub type ErrorHook = Box<dyn FnMut(&FetchError) + Send>;

/// Owns the poll cadence and session state. Publishes the current
/// `"{name} - {lyric}"` line through the injected [`StatusDisplay`].
pub struct Engine<S, D> {
    source: S,
    display: D,
    session: PlayerSessionState,
    interval: Duration,
    running: bool,
    tick_in_flight: bool,
    error_hook: Option<ErrorHook>,
}

impl<S: TrackSource, D: StatusDisplay> Engine<S, D> {
    pub fn new(source: S, display: D, interval: Duration) -> Self {
        Self {
            source,
            display,
            session: PlayerSessionState::default(),
            interval,
            running: false,
            tick_in_flight: false,
            error_hook: None,
        }
    }

    pub fn set_error_hook(&mut self, hook: ErrorHook) {
        self.error_hook = Some(hook);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn session(&self) -> &PlayerSessionState {
        &self.session
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Stopped -> Running: show the display and poll once immediately.
    /// Returns whether a transition happened so the run loop knows to arm
    /// a fresh ticker; calling while Running is a no-op.
    pub async fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.session = PlayerSessionState {
            is_playing: true,
            ..PlayerSessionState::default()
        };
        self.display.show();
        self.tick().await;
        true
    }

    /// Running -> Stopped: clear and hide the display, reset session state.
    /// Idempotent.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.session = PlayerSessionState::default();
        self.display.set_text("");
        self.display.hide();
    }

    /// Apply a new poll interval. While Running this is stop-then-start so
    /// the immediate tick re-establishes the display under the new cadence.
    /// Returns whether the caller needs to re-arm its ticker.
    pub async fn set_interval(&mut self, interval: Duration) -> bool {
        self.interval = interval;
        if !self.running {
            return false;
        }
        self.stop();
        self.start().await;
        true
    }

    /// One poll pass. A failed fetch is a stop condition, not a transient
    /// error: the engine goes silent until the next external playback or
    /// interval event restarts it.
    pub async fn tick(&mut self) {
        if !self.running || self.tick_in_flight {
            return;
        }
        self.tick_in_flight = true;
        let outcome = self.poll_once().await;
        self.tick_in_flight = false;
        if let Err(err) = outcome {
            tracing::debug!(target: "lyricbar::engine", "tick failed, stopping: {err}");
            if let Some(hook) = self.error_hook.as_mut() {
                hook(&err);
            }
            self.stop();
        }
    }

    async fn poll_once(&mut self) -> Result<(), FetchError> {
        let info = self.source.fetch_track_info().await?;
        if !self.progress_changed(&info) {
            // Sole work-avoidance gate: same progress means no lyric
            // refetch and no display write this tick.
            return Ok(());
        }
        self.session.last_progress = info.progress;
        self.session.track_name = info.name.clone();
        self.session.track_id = info.id.clone();

        let raw = self.source.fetch_lyric_text(&info.id).await?;
        let entries = parse_lyric_document(&raw);
        self.session.active_lyric = select_active_line(&entries, info.progress);

        // A stop that raced this tick's fetches must not be resurrected.
        if !self.running {
            return Ok(());
        }
        let line = format!("{} - {}", self.session.track_name, self.session.active_lyric);
        self.display.set_text(&line);
        Ok(())
    }

    fn progress_changed(&self, info: &TrackInfo) -> bool {
        // Not a monotonicity check: a seek or replay moving progress
        // backwards still counts as a change.
        (info.progress - self.session.last_progress).abs() > f64::EPSILON
    }
}

fn armed_ticker(period: Duration) -> Interval {
    // start() already polled once; the first interval firing is one period out.
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

/// Engine run loop: commands and timer ticks multiplexed on one task, so a
/// tick always runs to completion before the next select arm fires and
/// ticks can never overlap. Returns the engine on shutdown so callers (and
/// tests) can inspect final state.
pub async fn run<S: TrackSource, D: StatusDisplay>(
    mut engine: Engine<S, D>,
    mut commands: mpsc::Receiver<Command>,
) -> Engine<S, D> {
    let mut ticker = armed_ticker(engine.interval);
    loop {
        tokio::select! {
            cmd = commands.recv() => match cmd {
                None | Some(Command::Shutdown) => {
                    engine.stop();
                    break;
                }
                Some(Command::PlaybackChanged(true)) => {
                    if engine.start().await {
                        ticker = armed_ticker(engine.interval);
                    }
                }
                Some(Command::PlaybackChanged(false)) => engine.stop(),
                Some(Command::IntervalChanged(interval)) => {
                    if engine.set_interval(interval).await {
                        ticker = armed_ticker(interval);
                    }
                }
            },
            _ = ticker.tick(), if engine.is_running() => engine.tick().await,
        }
    }
    engine
}
