//! The auto-advance story player.
//!
//! `StoryPlayback` is a sans-IO state machine. It owns the current index,
//! play/pause and mute flags, and the per-story countdown, but it never
//! touches a real timer or media element. Every operation queues
//! [`PlaybackEffect`]s that a host drains with
//! [`StoryPlayback::take_effects`] and applies in order. Timer fires come
//! back in through [`StoryPlayback::timer_fired`] tagged with the
//! [`TimerId`] the player allocated.
//!
//! At most one advance timer and one progress tick are outstanding at any
//! time. Every path that changes the index or the play state cancels both
//! before doing anything else.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dailydrift_core::clock::Clock;
use dailydrift_core::error::DomainError;
use serde::Serialize;
use tracing::debug;

use super::input::Intent;
use super::story::{Story, StoryKind};
use super::timing::{PlaybackConfig, ResolvedDuration};

/// Identifier of a timer the player asked its host to schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Instructions queued by the player for its host.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEffect {
    /// Render the story at `index` on the media surface.
    ShowStory {
        /// Index of the story to render.
        index: usize,
    },
    /// Fire `timer` once after `after` has elapsed.
    ScheduleAdvance {
        /// Timer to report back through `timer_fired`.
        timer: TimerId,
        /// Delay before firing.
        after: Duration,
    },
    /// Fire `timer` repeatedly every `every` until cancelled.
    ScheduleTick {
        /// Timer to report back through `timer_fired`.
        timer: TimerId,
        /// Period of the tick.
        every: Duration,
    },
    /// Cancel a previously scheduled timer.
    CancelTimer(TimerId),
    /// Start or resume the active video. Rejections must be ignored.
    PlayMedia,
    /// Pause the active video.
    PauseMedia,
    /// Apply the mute flag to the active video.
    SetMuted(bool),
    /// Hand off to the next story set.
    AdvancePastEnd,
    /// Hand off to the previous story set.
    RetreatPastStart,
}

/// Whether adjacent story sets exist to hand off to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Boundaries {
    /// A following set exists.
    pub has_next: bool,
    /// A preceding set exists.
    pub has_prev: bool,
}

/// Observable state of the player.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    /// Index of the current story.
    pub index: usize,
    /// Number of stories in the set.
    pub total: usize,
    /// Progress through the current story, `0.0..=100.0`.
    pub progress: f64,
    /// Whether playback is running.
    pub playing: bool,
    /// Whether audio is muted.
    pub muted: bool,
    /// Whether the current video is still waiting for its duration.
    pub awaiting_media: bool,
}

/// Countdown state of the current story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timing {
    /// Video duration not known yet; nothing counts down.
    Pending,
    /// Countdown running since `started_at`.
    Active {
        window: Duration,
        started_at: DateTime<Utc>,
    },
    /// Countdown suspended after `elapsed` of `window`.
    Frozen { window: Duration, elapsed: Duration },
    /// Window used up with nowhere to go.
    Expired,
}

#[derive(Debug, Default)]
struct Timers {
    advance: Option<TimerId>,
    tick: Option<TimerId>,
}

/// The story player state machine.
#[derive(Debug)]
pub struct StoryPlayback {
    stories: Vec<Story>,
    boundaries: Boundaries,
    config: PlaybackConfig,
    index: usize,
    playing: bool,
    muted: bool,
    progress: f64,
    timing: Timing,
    timers: Timers,
    last_timer: u64,
    started: bool,
    disposed: bool,
    effects: Vec<PlaybackEffect>,
}

impl StoryPlayback {
    /// Creates a player for `stories`, paused at nothing until
    /// [`start`](Self::start) is called.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `stories` is empty.
    pub fn new(
        stories: Vec<Story>,
        boundaries: Boundaries,
        config: PlaybackConfig,
    ) -> Result<Self, DomainError> {
        if stories.is_empty() {
            return Err(DomainError::Validation(
                "a story set needs at least one story to play".to_owned(),
            ));
        }
        Ok(Self {
            stories,
            boundaries,
            config,
            index: 0,
            playing: true,
            muted: true,
            progress: 0.0,
            timing: Timing::Pending,
            timers: Timers::default(),
            last_timer: 0,
            started: false,
            disposed: false,
            effects: Vec::new(),
        })
    }

    /// Enters the first story and starts playing.
    pub fn start(&mut self, clock: &dyn Clock) {
        if self.started || self.disposed {
            return;
        }
        self.started = true;
        self.enter_story(0, clock);
    }

    /// Cancels every outstanding timer. The player ignores all further
    /// input afterwards.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.cancel_timers();
        self.disposed = true;
        debug!("story playback disposed");
    }

    /// Drains queued effects in the order they were produced.
    pub fn take_effects(&mut self) -> Vec<PlaybackEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Returns the effects queued since the last drain.
    #[must_use]
    pub fn pending_effects(&self) -> &[PlaybackEffect] {
        &self.effects
    }

    /// Index of the current story.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The story currently shown.
    #[must_use]
    pub fn current_story(&self) -> &Story {
        &self.stories[self.index]
    }

    /// All stories in play order.
    #[must_use]
    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    /// Progress through the current story, `0.0..=100.0`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Whether playback is running.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether audio is muted.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Observable state.
    #[must_use]
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            index: self.index,
            total: self.stories.len(),
            progress: self.progress,
            playing: self.playing,
            muted: self.muted,
            awaiting_media: self.timing == Timing::Pending,
        }
    }

    /// Applies a user intent.
    pub fn apply(&mut self, intent: Intent, clock: &dyn Clock) {
        match intent {
            Intent::Next => self.next(clock),
            Intent::Prev => self.prev(clock),
            Intent::TogglePlayback => self.toggle_playback(clock),
            Intent::ToggleMute => self.toggle_mute(),
        }
    }

    /// Moves to the next story, or hands off to the next set from the
    /// last story. A no-op on the last story when no next set exists.
    pub fn next(&mut self, clock: &dyn Clock) {
        if !self.is_live() {
            return;
        }
        if self.index + 1 < self.stories.len() {
            self.enter_story(self.index + 1, clock);
        } else if self.boundaries.has_next {
            self.hand_off(PlaybackEffect::AdvancePastEnd);
        }
    }

    /// Moves to the previous story, or hands off to the previous set from
    /// the first story. A no-op on the first story when no previous set
    /// exists.
    pub fn prev(&mut self, clock: &dyn Clock) {
        if !self.is_live() {
            return;
        }
        if self.index > 0 {
            self.enter_story(self.index - 1, clock);
        } else if self.boundaries.has_prev {
            self.hand_off(PlaybackEffect::RetreatPastStart);
        }
    }

    /// Pauses a playing player or resumes a paused one.
    ///
    /// Resuming continues from the elapsed position: the advance fires
    /// after the remaining part of the window, not a fresh one.
    pub fn toggle_playback(&mut self, clock: &dyn Clock) {
        if !self.is_live() {
            return;
        }
        if self.playing {
            self.pause(clock);
        } else {
            self.resume(clock);
        }
    }

    /// Flips the mute flag and syncs it to the active video.
    pub fn toggle_mute(&mut self) {
        if !self.is_live() {
            return;
        }
        self.muted = !self.muted;
        if self.current_is_video() {
            self.effects.push(PlaybackEffect::SetMuted(self.muted));
        }
        debug!(muted = self.muted, "mute toggled");
    }

    /// Reports that the video for story `index` knows its duration.
    ///
    /// Metadata for a story other than the current one is ignored. An
    /// unusable duration falls back to the story's nominal duration.
    pub fn media_loaded(&mut self, index: usize, seconds: f64, clock: &dyn Clock) {
        if !self.is_live() || index != self.index || !self.current_is_video() {
            return;
        }
        if self.timing != Timing::Pending {
            return;
        }
        let window = self
            .config
            .intrinsic_window(seconds)
            .unwrap_or_else(|| self.config.nominal_window(f64::from(self.current_story().duration)));
        debug!(index, window_ms = window.as_millis(), "video metadata loaded");
        if self.playing {
            self.start_countdown(window, Duration::ZERO, clock);
        } else {
            self.timing = Timing::Frozen {
                window,
                elapsed: Duration::ZERO,
            };
        }
    }

    /// Reports that the video for story `index` played to its end.
    pub fn media_ended(&mut self, index: usize, clock: &dyn Clock) {
        if !self.is_live() || index != self.index || !self.current_is_video() {
            return;
        }
        self.next(clock);
    }

    /// Reports that a scheduled timer fired. Fires for timers that are no
    /// longer outstanding are ignored.
    pub fn timer_fired(&mut self, timer: TimerId, clock: &dyn Clock) {
        if !self.is_live() {
            return;
        }
        if self.timers.advance == Some(timer) {
            self.timers.advance = None;
            self.expire(clock);
        } else if self.timers.tick == Some(timer) {
            self.refresh_progress(clock);
        }
    }

    fn is_live(&self) -> bool {
        self.started && !self.disposed
    }

    fn current_is_video(&self) -> bool {
        self.current_story().kind == StoryKind::Video
    }

    fn enter_story(&mut self, index: usize, clock: &dyn Clock) {
        self.cancel_timers();
        self.index = index;
        self.progress = 0.0;
        self.timing = Timing::Pending;
        self.effects.push(PlaybackEffect::ShowStory { index });
        debug!(index, total = self.stories.len(), "entered story");

        if self.current_is_video() {
            self.effects.push(PlaybackEffect::SetMuted(self.muted));
            if self.playing {
                self.effects.push(PlaybackEffect::PlayMedia);
            }
        }

        match self.config.resolve(self.current_story(), None) {
            ResolvedDuration::Pending => {}
            ResolvedDuration::Known(window) if self.playing => {
                self.start_countdown(window, Duration::ZERO, clock);
            }
            ResolvedDuration::Known(window) => {
                self.timing = Timing::Frozen {
                    window,
                    elapsed: Duration::ZERO,
                };
            }
        }
    }

    fn pause(&mut self, clock: &dyn Clock) {
        self.cancel_timers();
        self.playing = false;
        if let Timing::Active { window, started_at } = self.timing {
            let elapsed = elapsed_since(started_at, clock).min(window);
            self.progress = percent(elapsed, window);
            self.timing = Timing::Frozen { window, elapsed };
        }
        if self.current_is_video() {
            self.effects.push(PlaybackEffect::PauseMedia);
        }
        debug!(index = self.index, progress = self.progress, "paused");
    }

    fn resume(&mut self, clock: &dyn Clock) {
        self.playing = true;
        if self.current_is_video() {
            self.effects.push(PlaybackEffect::SetMuted(self.muted));
            self.effects.push(PlaybackEffect::PlayMedia);
        }
        if let Timing::Frozen { window, elapsed } = self.timing {
            self.start_countdown(window, elapsed, clock);
        }
        debug!(index = self.index, progress = self.progress, "resumed");
    }

    fn start_countdown(&mut self, window: Duration, elapsed: Duration, clock: &dyn Clock) {
        self.cancel_timers();
        let offset = TimeDelta::from_std(elapsed).unwrap_or_else(|_| TimeDelta::zero());
        self.timing = Timing::Active {
            window,
            started_at: clock.now() - offset,
        };
        self.progress = percent(elapsed, window);

        let advance = self.allocate_timer();
        let tick = self.allocate_timer();
        self.timers = Timers {
            advance: Some(advance),
            tick: Some(tick),
        };
        self.effects.push(PlaybackEffect::ScheduleAdvance {
            timer: advance,
            after: window.saturating_sub(elapsed),
        });
        self.effects.push(PlaybackEffect::ScheduleTick {
            timer: tick,
            every: self.config.tick_interval,
        });
    }

    fn expire(&mut self, clock: &dyn Clock) {
        if self.index + 1 < self.stories.len() {
            self.enter_story(self.index + 1, clock);
            return;
        }
        self.cancel_timers();
        self.progress = 100.0;
        self.timing = Timing::Expired;
        if self.boundaries.has_next {
            self.effects.push(PlaybackEffect::AdvancePastEnd);
        }
        debug!(index = self.index, "final story expired");
    }

    fn hand_off(&mut self, effect: PlaybackEffect) {
        self.cancel_timers();
        self.timing = Timing::Expired;
        debug!(?effect, "handing off to adjacent story set");
        self.effects.push(effect);
    }

    fn refresh_progress(&mut self, clock: &dyn Clock) {
        if let Timing::Active { window, started_at } = self.timing {
            self.progress = percent(elapsed_since(started_at, clock), window);
        }
    }

    fn cancel_timers(&mut self) {
        if let Some(timer) = self.timers.advance.take() {
            self.effects.push(PlaybackEffect::CancelTimer(timer));
        }
        if let Some(timer) = self.timers.tick.take() {
            self.effects.push(PlaybackEffect::CancelTimer(timer));
        }
    }

    fn allocate_timer(&mut self) -> TimerId {
        self.last_timer += 1;
        TimerId(self.last_timer)
    }
}

fn elapsed_since(started_at: DateTime<Utc>, clock: &dyn Clock) -> Duration {
    (clock.now() - started_at).to_std().unwrap_or_default()
}

fn percent(elapsed: Duration, window: Duration) -> f64 {
    if window.is_zero() {
        return 100.0;
    }
    (elapsed.as_secs_f64() / window.as_secs_f64() * 100.0).clamp(0.0, 100.0)
}
