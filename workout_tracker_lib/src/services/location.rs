use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::sync::mpsc::UnboundedSender;

use crate::{error::LocationError, event::EngineEvent, geo_sample::GeoSample};

/// Handle of one live subscription to a location source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

/// Whether the environment can deliver positions at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Available,
    Unavailable,
}

/// Options passed along with every subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub high_accuracy: bool,
    /// Oldest cached fix the source may hand out. Zero asks for fresh fixes only.
    pub maximum_age_ms: u64,
    /// How long the source may go without a fix before it reports a timeout.
    pub timeout_ms: u64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            maximum_age_ms: 0,
            timeout_ms: 15_000,
        }
    }
}

pub trait LocationSource {
    fn capability(&self) -> Capability;

    /// Starts delivering fixes, tagged with the returned id.
    fn watch(&mut self, options: &WatchOptions) -> Result<WatchId, LocationError>;

    /// Stops a subscription. Fixes already in flight may still show up
    /// carrying the old id.
    fn clear_watch(&mut self, id: WatchId);
}

const NO_WATCH: u64 = 0;

/// Location source backed by an event channel.
///
/// Whoever owns the matching [`LocationFeed`] pushes device fixes into it;
/// they reach the engine as [`EngineEvent::Sample`] while a watch is live
/// and are dropped otherwise.
pub struct ChannelLocationSource {
    next_id: u64,
    live: Arc<AtomicU64>,
}

#[derive(Clone)]
pub struct LocationFeed {
    live: Arc<AtomicU64>,
    events: UnboundedSender<EngineEvent>,
}

impl ChannelLocationSource {
    pub fn new(events: UnboundedSender<EngineEvent>) -> (Self, LocationFeed) {
        let live = Arc::new(AtomicU64::new(NO_WATCH));
        let source = Self {
            next_id: NO_WATCH,
            live: live.clone(),
        };
        (source, LocationFeed { live, events })
    }

    pub fn live_watch(&self) -> Option<WatchId> {
        match self.live.load(Ordering::Acquire) {
            NO_WATCH => None,
            id => Some(WatchId(id)),
        }
    }
}

impl LocationSource for ChannelLocationSource {
    fn capability(&self) -> Capability {
        Capability::Available
    }

    fn watch(&mut self, options: &WatchOptions) -> Result<WatchId, LocationError> {
        self.next_id += 1;
        self.live.store(self.next_id, Ordering::Release);
        tracing::debug!("Watch {} opened with {:?}", self.next_id, options);
        Ok(WatchId(self.next_id))
    }

    fn clear_watch(&mut self, id: WatchId) {
        // Only clear if nothing newer replaced it.
        let _ = self
            .live
            .compare_exchange(id.0, NO_WATCH, Ordering::AcqRel, Ordering::Acquire);
        tracing::debug!("Watch {} cleared", id.0);
    }
}

impl LocationFeed {
    /// Forwards a fix. Returns false when no watch is live or the engine side is gone.
    pub fn push(&self, sample: GeoSample) -> bool {
        match self.live.load(Ordering::Acquire) {
            NO_WATCH => false,
            id => self.events.send(EngineEvent::Sample(WatchId(id), sample)).is_ok(),
        }
    }

    pub fn fail(&self, error: LocationError) -> bool {
        match self.live.load(Ordering::Acquire) {
            NO_WATCH => false,
            id => self.events.send(EngineEvent::LocationError(WatchId(id), error)).is_ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn feed_only_forwards_while_watching() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (mut source, feed) = ChannelLocationSource::new(tx);
        let sample = GeoSample::new(48.0, 2.0, None, 0);

        assert!(!feed.push(sample));

        let id = source.watch(&WatchOptions::default()).unwrap();
        assert_eq!(source.live_watch(), Some(id));
        assert!(feed.push(sample));
        assert!(matches!(rx.try_recv(), Ok(EngineEvent::Sample(w, _)) if w == id));

        source.clear_watch(id);
        assert_eq!(source.live_watch(), None);
        assert!(!feed.push(sample));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn clearing_a_stale_watch_keeps_the_new_one() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let (mut source, _feed) = ChannelLocationSource::new(tx);
        let old = source.watch(&WatchOptions::default()).unwrap();
        let new = source.watch(&WatchOptions::default()).unwrap();
        source.clear_watch(old);
        assert_eq!(source.live_watch(), Some(new));
    }
}
