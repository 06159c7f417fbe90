//! Virtual-time host for driving `StoryPlayback` in integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::time::Duration;

use dailydrift_core::clock::Clock;
use dailydrift_stories::domain::playback::{Boundaries, PlaybackEffect, StoryPlayback, TimerId};
use dailydrift_stories::domain::story::{Story, StoryKind};
use dailydrift_stories::domain::timing::PlaybackConfig;
use dailydrift_test_support::ManualClock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due_ms: u64,
    period_ms: Option<u64>,
}

/// Applies player effects against a simulated timeline.
pub struct VirtualHost {
    pub playback: StoryPlayback,
    pub clock: ManualClock,
    now_ms: u64,
    timers: BTreeMap<TimerId, Scheduled>,
    /// `(virtual ms, index)` for every story shown after the first.
    pub transitions: Vec<(u64, usize)>,
    pub advanced_past_end: usize,
    pub retreated_past_start: usize,
    pub media: Vec<PlaybackEffect>,
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap()
}

impl VirtualHost {
    pub fn start(stories: Vec<Story>, boundaries: Boundaries) -> Self {
        let playback = StoryPlayback::new(stories, boundaries, PlaybackConfig::default()).unwrap();
        let mut host = Self {
            playback,
            clock: ManualClock::starting_now(),
            now_ms: 0,
            timers: BTreeMap::new(),
            transitions: Vec::new(),
            advanced_past_end: 0,
            retreated_past_start: 0,
            media: Vec::new(),
        };
        host.playback.start(&host.clock);
        host.drain();
        // The initial ShowStory is not a transition.
        host.transitions.clear();
        host
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn outstanding_timers(&self) -> usize {
        self.timers.len()
    }

    /// Runs the timeline forward to `target_ms`, firing timers in order.
    pub fn run_until(&mut self, target_ms: u64) {
        loop {
            let next = self
                .timers
                .iter()
                .filter(|(_, s)| s.due_ms <= target_ms)
                .min_by_key(|(id, s)| (s.due_ms, **id))
                .map(|(id, s)| (*id, *s));
            let Some((id, scheduled)) = next else { break };

            self.move_clock_to(scheduled.due_ms);
            match scheduled.period_ms {
                Some(period) => {
                    self.timers.insert(
                        id,
                        Scheduled {
                            due_ms: scheduled.due_ms + period,
                            period_ms: Some(period),
                        },
                    );
                }
                None => {
                    self.timers.remove(&id);
                }
            }
            self.playback.timer_fired(id, &self.clock);
            self.drain();
        }
        self.move_clock_to(target_ms);
    }

    /// Runs the timeline forward by `delta_ms`.
    pub fn run_for(&mut self, delta_ms: u64) {
        self.run_until(self.now_ms + delta_ms);
    }

    /// Applies a player operation at the current instant.
    pub fn act(&mut self, op: impl FnOnce(&mut StoryPlayback, &dyn Clock)) {
        op(&mut self.playback, &self.clock);
        self.drain();
    }

    fn move_clock_to(&mut self, ms: u64) {
        if ms > self.now_ms {
            self.clock
                .advance_ms(i64::try_from(ms - self.now_ms).unwrap());
            self.now_ms = ms;
        }
    }

    fn drain(&mut self) {
        for effect in self.playback.take_effects() {
            match effect {
                PlaybackEffect::ScheduleAdvance { timer, after } => {
                    self.timers.insert(
                        timer,
                        Scheduled {
                            due_ms: self.now_ms + millis(after),
                            period_ms: None,
                        },
                    );
                }
                PlaybackEffect::ScheduleTick { timer, every } => {
                    self.timers.insert(
                        timer,
                        Scheduled {
                            due_ms: self.now_ms + millis(every),
                            period_ms: Some(millis(every)),
                        },
                    );
                }
                PlaybackEffect::CancelTimer(timer) => {
                    self.timers.remove(&timer);
                }
                PlaybackEffect::ShowStory { index } => self.transitions.push((self.now_ms, index)),
                PlaybackEffect::AdvancePastEnd => self.advanced_past_end += 1,
                PlaybackEffect::RetreatPastStart => self.retreated_past_start += 1,
                other => self.media.push(other),
            }
        }
    }
}

pub fn image(duration: i32) -> Story {
    Story {
        id: Uuid::new_v4(),
        media_url: "https://cdn.example.com/image.jpg".to_owned(),
        kind: StoryKind::Image,
        caption: None,
        duration,
    }
}

pub fn video(duration: i32) -> Story {
    Story {
        id: Uuid::new_v4(),
        media_url: "https://cdn.example.com/clip.mp4".to_owned(),
        kind: StoryKind::Video,
        caption: Some("clip".to_owned()),
        duration,
    }
}
