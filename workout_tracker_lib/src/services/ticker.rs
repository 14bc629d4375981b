use std::time::Duration;

use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle, time::interval};

use crate::event::EngineEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickId(pub u64);

/// Periodic clock feeding [`EngineEvent::Tick`]s to the engine.
pub trait TickSource {
    fn start(&mut self) -> TickId;
    fn stop(&mut self, id: TickId);
}

/// Ticker whose ticks are produced by the caller, for replays and tests.
#[derive(Debug, Default)]
pub struct ManualTicker {
    next_id: u64,
    live: Option<TickId>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> Option<TickId> {
        self.live
    }
}

impl TickSource for ManualTicker {
    fn start(&mut self) -> TickId {
        self.next_id += 1;
        let id = TickId(self.next_id);
        self.live = Some(id);
        id
    }

    fn stop(&mut self, id: TickId) {
        if self.live == Some(id) {
            self.live = None;
        }
    }
}

/// Ticker running on the tokio runtime, one tick per `period`.
///
/// Must be started from within a runtime.
pub struct TokioTicker {
    next_id: u64,
    period: Duration,
    events: UnboundedSender<EngineEvent>,
    task: Option<(TickId, JoinHandle<()>)>,
}

impl TokioTicker {
    pub fn new(events: UnboundedSender<EngineEvent>) -> Self {
        Self::with_period(events, Duration::from_secs(1))
    }

    pub fn with_period(events: UnboundedSender<EngineEvent>, period: Duration) -> Self {
        Self {
            next_id: 0,
            period,
            events,
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl TickSource for TokioTicker {
    fn start(&mut self) -> TickId {
        if let Some((_, handle)) = self.task.take() {
            handle.abort();
        }

        self.next_id += 1;
        let id = TickId(self.next_id);
        let events = self.events.clone();
        let period = self.period;

        let handle = tokio::spawn(async move {
            let mut ticks = interval(period);
            // The first tick completes immediately.
            ticks.tick().await;
            loop {
                ticks.tick().await;
                if events.send(EngineEvent::Tick(id)).is_err() {
                    break;
                }
            }
        });

        self.task = Some((id, handle));
        id
    }

    fn stop(&mut self, id: TickId) {
        if matches!(self.task, Some((live, _)) if live == id) {
            if let Some((_, handle)) = self.task.take() {
                handle.abort();
            }
        }
    }
}

impl Drop for TokioTicker {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.task.take() {
            handle.abort();
        }
    }
}
