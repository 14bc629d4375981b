//! The session state machine.
//!
//! ```text
//! Idle --start--> Active --pause--> Paused --resume--> Active
//!                   |                  |
//!                   +-----stop---------+--> Finished --start--> Active
//! ```
//!
//! `reset` returns to `Idle` from anywhere. Samples and ticks are only
//! applied while `Active`; while `Paused` the ticker keeps running but its
//! ticks do nothing, and no location watch is live.

use crate::{
    error::{LocationError, TrackerError},
    event::EngineEvent,
    filter::{accept, FilterConfig, Verdict},
    geo_sample::GeoSample,
    pace::{average_pace_sec_per_km, instantaneous_pace_sec_per_km},
    record::{SavedSession, SessionMeta, SessionRecord},
    session::{SessionMetrics, SessionSnapshot, SessionState},
    services::{
        Capability, Clock, LocationSource, SessionStore, SystemClock, TickId, TickSource, WakeLock, WatchId,
        WatchOptions,
    },
};

pub struct SessionEngine<L, T, W, S, C = SystemClock> {
    state: SessionState,
    metrics: SessionMetrics,
    config: FilterConfig,

    location: L,
    ticker: T,
    wake_lock: W,
    store: S,
    clock: C,

    watch: Option<WatchId>,
    tick: Option<TickId>,
    wake_lock_held: bool,
    /// Frozen record of the finished session until a save succeeds.
    unsaved: Option<SessionRecord>,
}

impl<L, T, W, S> SessionEngine<L, T, W, S>
where
    L: LocationSource,
    T: TickSource,
    W: WakeLock,
    S: SessionStore,
{
    pub fn new(location: L, ticker: T, wake_lock: W, store: S) -> Self {
        Self {
            state: SessionState::Idle,
            metrics: SessionMetrics::default(),
            config: FilterConfig::default(),
            location,
            ticker,
            wake_lock,
            store,
            clock: SystemClock,
            watch: None,
            tick: None,
            wake_lock_held: false,
            unsaved: None,
        }
    }
}

impl<L, T, W, S, C> SessionEngine<L, T, W, S, C>
where
    L: LocationSource,
    T: TickSource,
    W: WakeLock,
    S: SessionStore,
    C: Clock,
{
    /// Swaps the time source stamping `started_at` and `finished_at`.
    pub fn with_clock<K: Clock>(self, clock: K) -> SessionEngine<L, T, W, S, K> {
        SessionEngine {
            state: self.state,
            metrics: self.metrics,
            config: self.config,
            location: self.location,
            ticker: self.ticker,
            wake_lock: self.wake_lock,
            store: self.store,
            clock,
            watch: self.watch,
            tick: self.tick,
            wake_lock_held: self.wake_lock_held,
            unsaved: self.unsaved,
        }
    }

    pub fn with_filter_config(mut self, config: FilterConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the filter thresholds. Refused while a session is running.
    pub fn set_filter_config(&mut self, config: FilterConfig) -> Result<(), TrackerError> {
        if self.is_running() {
            return Err(TrackerError::InvalidTransition {
                state: self.state,
                action: "change the filter config",
            });
        }
        self.config = config;
        Ok(())
    }

    pub fn filter_config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn wake_lock(&self) -> &W {
        &self.wake_lock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Active | SessionState::Paused)
    }

    /// Begins a fresh session, discarding whatever the previous one left behind.
    pub async fn start(&mut self) -> Result<(), TrackerError> {
        if self.is_running() {
            return Err(TrackerError::InvalidTransition {
                state: self.state,
                action: "start",
            });
        }

        if self.location.capability() == Capability::Unavailable {
            tracing::warn!("Refusing to start: no location capability");
            return Err(TrackerError::UnsupportedEnvironment);
        }

        self.release_resources();
        self.metrics = SessionMetrics::default();
        self.unsaved = None;

        self.state = SessionState::Active;
        self.metrics.started_at = Some(self.clock.now());

        self.acquire_wake_lock().await;
        self.start_ticker();
        if let Err(err) = self.start_watch() {
            tracing::error!("Failed to subscribe to location updates: {}", err);
            self.reset();
            return Err(err.into());
        }

        tracing::info!("Session started at {:?}", self.metrics.started_at);
        Ok(())
    }

    /// One second of wall time went by.
    pub fn tick(&mut self) {
        if self.state == SessionState::Active {
            self.metrics.elapsed_active_s += 1;
        }
    }

    /// Runs a raw fix through the filter. Returns `None` if the session
    /// is not active and the fix was ignored.
    pub fn on_sample(&mut self, sample: GeoSample) -> Option<Verdict> {
        if self.state != SessionState::Active {
            tracing::debug!("Ignoring sample while {}", self.state);
            return None;
        }

        let verdict = accept(&sample, self.metrics.last_point(), &self.config);
        match verdict {
            Verdict::Accepted { distance_m } => {
                self.metrics.distance.add(distance_m);
                self.metrics.trajectory.push(sample.into());
                self.metrics.last_location_error = None;
            }
            Verdict::Rejected(reason) => {
                self.metrics.rejected_samples += 1;
                tracing::debug!("Rejected sample at {}: {}", sample.timestamp_ms, reason);
            }
        }

        Some(verdict)
    }

    /// The location source reported a problem. Tracking goes on; the
    /// error is kept for diagnostics until the next accepted fix.
    pub fn on_location_error(&mut self, error: LocationError) {
        if !self.is_running() {
            return;
        }

        match &error {
            LocationError::Timeout => tracing::warn!("Location source: {}", error),
            _ => tracing::error!("Location source: {}", error),
        }
        self.metrics.last_location_error = Some(error);
    }

    /// Dispatches an event, dropping anything from a subscription that is no longer live.
    pub fn handle(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Sample(watch, sample) => {
                if self.watch == Some(watch) {
                    self.on_sample(sample);
                } else {
                    tracing::debug!("Dropping sample from stale watch {}", watch.0);
                }
            }
            EngineEvent::LocationError(watch, error) => {
                if self.watch == Some(watch) {
                    self.on_location_error(error);
                } else {
                    tracing::debug!("Dropping error from stale watch {}: {}", watch.0, error);
                }
            }
            EngineEvent::Tick(id) => {
                if self.tick == Some(id) {
                    self.tick();
                }
            }
        }
    }

    pub fn pause(&mut self) -> Result<(), TrackerError> {
        if self.state != SessionState::Active {
            return Err(TrackerError::InvalidTransition {
                state: self.state,
                action: "pause",
            });
        }

        self.stop_watch();
        self.state = SessionState::Paused;
        tracing::debug!("Session paused after {} s", self.metrics.elapsed_active_s);
        Ok(())
    }

    pub async fn resume(&mut self) -> Result<(), TrackerError> {
        if self.state != SessionState::Paused {
            return Err(TrackerError::InvalidTransition {
                state: self.state,
                action: "resume",
            });
        }

        self.acquire_wake_lock().await;
        self.start_watch()?;
        self.state = SessionState::Active;
        tracing::debug!("Session resumed");
        Ok(())
    }

    /// Ends the session and hands its record to the store.
    ///
    /// If the store fails, the session stays `Finished` with its record
    /// frozen, and calling this again retries the save. The `meta` of a
    /// retry is ignored in favor of the frozen record.
    pub async fn stop_and_save(&mut self, meta: SessionMeta) -> Result<SavedSession, TrackerError> {
        match self.state {
            SessionState::Active | SessionState::Paused => {
                self.release_resources();
                let finished_at = self.clock.now();
                self.metrics.finished_at = Some(finished_at);
                self.state = SessionState::Finished;
                self.unsaved = Some(self.build_record(meta));
                tracing::info!(
                    "Session finished: {} s, {} m, {} points",
                    self.metrics.elapsed_active_s,
                    self.metrics.distance.rounded_m(),
                    self.metrics.trajectory.len()
                );
            }
            SessionState::Finished if self.unsaved.is_some() => {
                tracing::info!("Retrying save of finished session");
            }
            state => {
                return Err(TrackerError::InvalidTransition { state, action: "stop" });
            }
        }

        let Some(record) = self.unsaved.clone() else {
            return Err(TrackerError::InvalidTransition {
                state: self.state,
                action: "stop",
            });
        };

        match self.store.save(&record).await {
            Ok(id) => {
                tracing::info!("Session saved with id {}", id.id);
                self.unsaved = None;
                Ok(SavedSession { id, record })
            }
            Err(err) => {
                tracing::warn!("Failed to save session: {}", err);
                Err(err)
            }
        }
    }

    /// Drops everything and goes back to `Idle`. Safe to call at any time.
    pub fn reset(&mut self) {
        self.release_resources();
        self.metrics = SessionMetrics::default();
        self.unsaved = None;
        self.state = SessionState::Idle;
    }

    pub fn avg_pace_sec_per_km(&self) -> u32 {
        average_pace_sec_per_km(self.metrics.elapsed_active_s, self.metrics.distance_m())
    }

    pub fn inst_pace_sec_per_km(&self) -> u32 {
        instantaneous_pace_sec_per_km(&self.metrics.trajectory, self.config.pace_smoothing_window_s)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            started_at: self.metrics.started_at,
            finished_at: self.metrics.finished_at,
            elapsed_s: self.metrics.elapsed_active_s,
            distance_m: self.metrics.distance.rounded_m(),
            avg_pace_sec_per_km: self.avg_pace_sec_per_km(),
            inst_pace_sec_per_km: self.inst_pace_sec_per_km(),
            points: self.metrics.trajectory.len(),
            rejected: self.metrics.rejected_samples,
            last_location_error: self.metrics.last_location_error.as_ref().map(|e| e.to_string()),
        }
    }

    fn build_record(&self, meta: SessionMeta) -> SessionRecord {
        let finished_at = self.metrics.finished_at.unwrap_or_else(|| self.clock.now());
        SessionRecord {
            user_id: meta.user_id,
            season_order: meta.season_order,
            week_number: meta.week_number,
            session_number: meta.session_number,
            started_at: self.metrics.started_at.unwrap_or(finished_at),
            finished_at,
            duration_seconds: self.metrics.elapsed_active_s,
            distance_meters: self.metrics.distance.rounded_m(),
            average_pace_sec_per_km: self.avg_pace_sec_per_km(),
            trajectory: self.metrics.trajectory.clone(),
        }
    }

    fn start_watch(&mut self) -> Result<(), LocationError> {
        self.stop_watch();
        let id = self.location.watch(&WatchOptions::default())?;
        self.watch = Some(id);
        Ok(())
    }

    fn stop_watch(&mut self) {
        if let Some(id) = self.watch.take() {
            self.location.clear_watch(id);
        }
    }

    fn start_ticker(&mut self) {
        self.stop_ticker();
        self.tick = Some(self.ticker.start());
    }

    fn stop_ticker(&mut self) {
        if let Some(id) = self.tick.take() {
            self.ticker.stop(id);
        }
    }

    async fn acquire_wake_lock(&mut self) {
        if self.wake_lock_held {
            self.wake_lock.release();
            self.wake_lock_held = false;
        }

        match self.wake_lock.acquire().await {
            Ok(()) => self.wake_lock_held = true,
            Err(err) => tracing::warn!("Wake lock not acquired, continuing without: {}", err),
        }
    }

    fn release_wake_lock(&mut self) {
        if self.wake_lock_held {
            self.wake_lock.release();
            self.wake_lock_held = false;
        }
    }

    fn release_resources(&mut self) {
        self.stop_watch();
        self.stop_ticker();
        self.release_wake_lock();
    }
}
