//! Timer tasks scheduled on behalf of the playback state machine.

use std::collections::HashMap;
use std::time::Duration;

use dailydrift_stories::domain::playback::TimerId;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

struct Scheduled {
    task: JoinHandle<()>,
    repeating: bool,
}

/// Live timer tasks keyed by the id the player allocated.
///
/// Dropping the table aborts every task still in it.
#[derive(Default)]
pub(crate) struct TimerTable {
    tasks: HashMap<TimerId, Scheduled>,
}

impl TimerTable {
    /// Sends `id` on `fired` once, after `after`.
    pub(crate) fn schedule_once(
        &mut self,
        id: TimerId,
        after: Duration,
        fired: UnboundedSender<TimerId>,
    ) {
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = fired.send(id);
        });
        self.insert(id, task, false);
    }

    /// Sends `id` on `fired` every `every` until cancelled.
    pub(crate) fn schedule_every(
        &mut self,
        id: TimerId,
        every: Duration,
        fired: UnboundedSender<TimerId>,
    ) {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + every, every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if fired.send(id).is_err() {
                    break;
                }
            }
        });
        self.insert(id, task, true);
    }

    /// Aborts `id` if it is still scheduled.
    pub(crate) fn cancel(&mut self, id: TimerId) {
        if let Some(scheduled) = self.tasks.remove(&id) {
            scheduled.task.abort();
        }
    }

    /// Records that `id` fired. Returns `false` if the timer was already
    /// cancelled and the fire should be dropped.
    pub(crate) fn fired(&mut self, id: TimerId) -> bool {
        match self.tasks.get(&id) {
            Some(scheduled) if scheduled.repeating => true,
            Some(_) => {
                self.tasks.remove(&id);
                true
            }
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    fn insert(&mut self, id: TimerId, task: JoinHandle<()>, repeating: bool) {
        if let Some(previous) = self.tasks.insert(id, Scheduled { task, repeating }) {
            previous.task.abort();
        }
    }
}

impl Drop for TimerTable {
    fn drop(&mut self) {
        for (_, scheduled) in self.tasks.drain() {
            scheduled.task.abort();
        }
    }
}
