//! PromotionCountdown - one-second ticker for the promotion banner.
//!
//! ## Behavior
//!
//! | Event | When |
//! |-------|------|
//! | `Tick` | Immediately on start, then once per second while time remains |
//! | `Expired` | When the remaining time reaches zero; the ticker then stops |
//!
//! Starting a new countdown stops the previous one first, so at most one
//! ticker runs per page. The receiver closes when the ticker stops.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::domain::promotion::format_countdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    Tick { remaining_seconds: u64 },
    Expired,
}

impl CountdownEvent {
    /// `MM:SS` text for a tick.
    pub fn text(&self) -> Option<String> {
        match self {
            CountdownEvent::Tick { remaining_seconds } => Some(format_countdown(*remaining_seconds)),
            CountdownEvent::Expired => None,
        }
    }
}

struct Running {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

#[derive(Default)]
pub struct PromotionCountdown {
    running: Option<Running>,
}

impl PromotionCountdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts ticking down from `remaining_seconds`, replacing any running
    /// countdown.
    pub fn start(&mut self, remaining_seconds: u64) -> mpsc::UnboundedReceiver<CountdownEvent> {
        self.stop();

        let (events, receiver) = mpsc::unbounded_channel();
        let (stop, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run(remaining_seconds, events, stop_rx));
        tracing::debug!(remaining_seconds, "Promotion countdown started");

        self.running = Some(Running { stop, task });
        receiver
    }

    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.stop.send(true);
            running.task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.as_ref().is_some_and(|r| !r.task.is_finished())
    }
}

impl Drop for PromotionCountdown {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    mut remaining: u64,
    events: mpsc::UnboundedSender<CountdownEvent>,
    mut stop: watch::Receiver<bool>,
) {
    let mut interval = time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = stop.changed() => {
                if *stop.borrow() {
                    return;
                }
            }

            _ = interval.tick() => {
                if remaining == 0 {
                    let _ = events.send(CountdownEvent::Expired);
                    tracing::debug!("Promotion countdown expired");
                    return;
                }
                if events.send(CountdownEvent::Tick { remaining_seconds: remaining }).is_err() {
                    return;
                }
                remaining -= 1;
            }
        }
    }
}
