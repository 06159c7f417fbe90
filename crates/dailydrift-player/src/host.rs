//! Runs a `StoryPlayback` on its own tokio task.
//!
//! The host owns the state machine, the timer tasks it asked for, the media
//! surface, and the adjacent-set navigator. Inputs arrive over a channel,
//! state leaves through a `watch` snapshot. Shutting down or dropping the
//! handle aborts every outstanding timer and detaches the keyboard listener.

use std::sync::Arc;

use dailydrift_core::clock::Clock;
use dailydrift_core::error::DomainError;
use dailydrift_stories::domain::input::{Intent, Key, swipe_intent, tap_intent};
use dailydrift_stories::domain::playback::{
    Boundaries, PlaybackEffect, PlaybackSnapshot, StoryPlayback, TimerId,
};
use dailydrift_stories::domain::story::Story;
use dailydrift_stories::domain::timing::PlaybackConfig;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::clock::TokioClock;
use crate::keyboard::{KeyboardHub, ListenerGuard};
use crate::surface::{AdjacentSets, MediaSurface};
use crate::timers::TimerTable;

/// Something the viewer or the media element did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerInput {
    /// A resolved intent, e.g. from on-screen controls.
    Intent(Intent),
    /// A key press delivered directly rather than through a hub.
    Key(Key),
    /// A completed horizontal drag.
    Swipe {
        /// Pointer x at touch start.
        start_x: f64,
        /// Pointer x at touch end.
        end_x: f64,
    },
    /// A tap on the player area.
    Tap {
        /// Tap x relative to the player's left edge.
        x: f64,
        /// Player width.
        width: f64,
    },
    /// A video reported its intrinsic duration.
    MediaLoaded {
        /// Story the element was showing.
        index: usize,
        /// Reported duration in seconds.
        seconds: f64,
    },
    /// A video reached its natural end.
    MediaEnded {
        /// Story the element was showing.
        index: usize,
    },
}

/// Everything needed to mount a player.
pub struct PlayerSetup {
    /// Stories to play, in order. Must not be empty.
    pub stories: Vec<Story>,
    /// Timing and gesture tuning.
    pub config: PlaybackConfig,
    /// Time source for elapsed-time accounting.
    pub clock: Arc<dyn Clock>,
    /// Element that renders the current story.
    pub surface: Box<dyn MediaSurface>,
    /// Navigator for neighbouring story sets.
    pub adjacent: Box<dyn AdjacentSets>,
}

impl PlayerSetup {
    /// Default tuning on a [`TokioClock`].
    #[must_use]
    pub fn new(
        stories: Vec<Story>,
        surface: Box<dyn MediaSurface>,
        adjacent: Box<dyn AdjacentSets>,
    ) -> Self {
        Self {
            stories,
            config: PlaybackConfig::default(),
            clock: Arc::new(TokioClock::new()),
            surface,
            adjacent,
        }
    }
}

/// Handle to a mounted player.
pub struct PlayerHandle {
    inputs: UnboundedSender<PlayerInput>,
    snapshot: watch::Receiver<PlaybackSnapshot>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PlayerHandle {
    /// Mounts a player on a new task and starts playback.
    ///
    /// When `keyboard` is given, the player listens to it until it is torn
    /// down.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `setup.stories` is empty.
    pub fn spawn(setup: PlayerSetup, keyboard: Option<&KeyboardHub>) -> Result<Self, DomainError> {
        let boundaries = Boundaries {
            has_next: setup.adjacent.has_next(),
            has_prev: setup.adjacent.has_prev(),
        };
        let playback = StoryPlayback::new(setup.stories, boundaries, setup.config)?;

        let (inputs_tx, inputs) = mpsc::unbounded_channel();
        let (keys_tx, keys) = mpsc::unbounded_channel();
        let (fired_tx, fired) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot) = watch::channel(playback.snapshot());
        let (shutdown_tx, shutdown) = oneshot::channel();
        let listener = keyboard.map(|hub| hub.attach(keys_tx));

        let host = Host {
            playback,
            config: setup.config,
            clock: setup.clock,
            surface: setup.surface,
            adjacent: setup.adjacent,
            timers: TimerTable::default(),
            fired: fired_tx,
            snapshot: snapshot_tx,
        };
        let channels = Channels {
            inputs,
            keys,
            fired,
            shutdown,
        };
        let task = tokio::spawn(host.run(channels, listener));
        info!(boundaries = ?boundaries, "player mounted");

        Ok(Self {
            inputs: inputs_tx,
            snapshot,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Queues an input. Returns `false` if the player has stopped.
    pub fn send(&self, input: PlayerInput) -> bool {
        self.inputs.send(input).is_ok()
    }

    /// Latest published state.
    #[must_use]
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver that observes every published state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshot.clone()
    }

    /// Tears the player down and waits for its task to finish.
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PlayerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct Channels {
    inputs: UnboundedReceiver<PlayerInput>,
    keys: UnboundedReceiver<Key>,
    fired: UnboundedReceiver<TimerId>,
    shutdown: oneshot::Receiver<()>,
}

struct Host {
    playback: StoryPlayback,
    config: PlaybackConfig,
    clock: Arc<dyn Clock>,
    surface: Box<dyn MediaSurface>,
    adjacent: Box<dyn AdjacentSets>,
    timers: TimerTable,
    fired: UnboundedSender<TimerId>,
    snapshot: watch::Sender<PlaybackSnapshot>,
}

impl Host {
    async fn run(mut self, mut channels: Channels, _listener: Option<ListenerGuard>) {
        self.playback.start(self.clock.as_ref());
        self.flush();

        loop {
            tokio::select! {
                biased;
                _ = &mut channels.shutdown => break,
                Some(timer) = channels.fired.recv() => {
                    if self.timers.fired(timer) {
                        self.playback.timer_fired(timer, self.clock.as_ref());
                    }
                }
                Some(input) = channels.inputs.recv() => self.handle(input),
                Some(key) = channels.keys.recv() => self.handle(PlayerInput::Key(key)),
                else => break,
            }
            self.flush();
        }

        self.playback.dispose();
        self.flush();
        debug!(outstanding_timers = self.timers.len(), "player stopped");
    }

    fn handle(&mut self, input: PlayerInput) {
        let clock = self.clock.as_ref();
        let intent = match input {
            PlayerInput::Intent(intent) => Some(intent),
            PlayerInput::Key(key) => key.intent(),
            PlayerInput::Swipe { start_x, end_x } => {
                swipe_intent(start_x, end_x, self.config.swipe_threshold)
            }
            PlayerInput::Tap { x, width } => Some(tap_intent(x, width)),
            PlayerInput::MediaLoaded { index, seconds } => {
                self.playback.media_loaded(index, seconds, clock);
                None
            }
            PlayerInput::MediaEnded { index } => {
                self.playback.media_ended(index, clock);
                None
            }
        };
        if let Some(intent) = intent {
            self.playback.apply(intent, clock);
        }
    }

    fn flush(&mut self) {
        for effect in self.playback.take_effects() {
            match effect {
                PlaybackEffect::ShowStory { index } => {
                    if let Some(story) = self.playback.stories().get(index) {
                        self.surface.show(index, story);
                    }
                }
                PlaybackEffect::ScheduleAdvance { timer, after } => {
                    self.timers.schedule_once(timer, after, self.fired.clone());
                }
                PlaybackEffect::ScheduleTick { timer, every } => {
                    self.timers.schedule_every(timer, every, self.fired.clone());
                }
                PlaybackEffect::CancelTimer(timer) => self.timers.cancel(timer),
                PlaybackEffect::PlayMedia => {
                    if let Err(error) = self.surface.play() {
                        debug!(%error, "media play rejected");
                    }
                }
                PlaybackEffect::PauseMedia => self.surface.pause(),
                PlaybackEffect::SetMuted(muted) => self.surface.set_muted(muted),
                PlaybackEffect::AdvancePastEnd => {
                    info!("handing off to the next story set");
                    self.adjacent.advance_past_end();
                }
                PlaybackEffect::RetreatPastStart => {
                    info!("handing off to the previous story set");
                    self.adjacent.retreat_past_start();
                }
            }
        }
        self.snapshot.send_replace(self.playback.snapshot());
    }
}
