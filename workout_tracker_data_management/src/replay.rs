use tokio::sync::mpsc;
use workout_tracker_lib::{
    services::{ChannelLocationSource, ManualTicker, NoopWakeLock, SessionStore},
    EngineEvent, FilterConfig, GeoSample, SavedSession, SessionEngine, SessionMeta, TrackerError,
};

pub struct ReplaySummary {
    pub saved: SavedSession,
    pub fed: usize,
    pub rejected: u64,
    pub inst_pace_at_end: u32,
}

/// Plays recorded fixes through a live session as if they arrived in real time.
///
/// One tick is sent for every whole second elapsed since the first fix, so
/// the active time matches the span of the recording.
pub async fn replay<S: SessionStore>(
    samples: &[GeoSample],
    config: FilterConfig,
    meta: SessionMeta,
    store: S,
) -> Result<ReplaySummary, TrackerError> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (location, feed) = ChannelLocationSource::new(tx.clone());

    let mut engine = SessionEngine::new(location, ManualTicker::new(), NoopWakeLock, store).with_filter_config(config);
    engine.start().await?;

    let first_ms = samples.first().map(|s| s.timestamp_ms).unwrap_or_default();
    let mut ticks_sent = 0;
    let mut fed = 0;

    for sample in samples {
        let due = (sample.timestamp_ms - first_ms).max(0) / 1000;
        if let Some(tick) = engine.ticker().live() {
            while ticks_sent < due {
                if tx.send(EngineEvent::Tick(tick)).is_err() {
                    break;
                }
                ticks_sent += 1;
            }
        }

        if feed.push(*sample) {
            fed += 1;
        }

        while let Ok(event) = rx.try_recv() {
            engine.handle(event);
        }
    }

    let rejected = engine.metrics().rejected_samples;
    let inst_pace_at_end = engine.inst_pace_sec_per_km();
    tracing::debug!("Replay done: {:?}", engine.snapshot());

    let saved = engine.stop_and_save(meta).await?;

    Ok(ReplaySummary {
        saved,
        fed,
        rejected,
        inst_pace_at_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use workout_tracker_lib::services::MemorySessionStore;

    const METER: f64 = 1.0 / 111_194.93;

    fn meta() -> SessionMeta {
        SessionMeta {
            user_id: 1,
            season_order: 1,
            week_number: 1,
            session_number: 1,
        }
    }

    #[tokio::test]
    async fn steady_run_with_noise() {
        // 4 m/s north, one fix every 2 s, plus a jittery duplicate and an outlier
        let t0 = 1_714_546_800_000;
        let mut samples: Vec<GeoSample> = (0..31)
            .map(|i| GeoSample::new(48.0 + i as f64 * 8.0 * METER, 2.0, None, t0 + i * 2000))
            .collect();
        samples.insert(5, GeoSample::new(48.0 + 33.0 * METER, 2.0, None, t0 + 8500));
        samples.insert(12, GeoSample::new(49.0, 2.0, None, t0 + 21_000));

        let summary = replay(&samples, FilterConfig::default(), meta(), MemorySessionStore::new())
            .await
            .unwrap();
        let record = &summary.saved.record;

        assert_eq!(summary.fed, 33);
        assert_eq!(summary.rejected, 2);
        assert_eq!(record.trajectory.len(), 31);
        assert_eq!(record.distance_meters, 240);
        assert_eq!(record.duration_seconds, 60);
        assert_eq!(record.average_pace_sec_per_km, 250);
        assert_eq!(summary.inst_pace_at_end, 250);
    }

    #[tokio::test]
    async fn empty_recording_saves_empty_session() {
        let summary = replay(&[], FilterConfig::default(), meta(), MemorySessionStore::new())
            .await
            .unwrap();
        assert_eq!(summary.saved.record.trajectory.len(), 0);
        assert_eq!(summary.saved.record.duration_seconds, 0);
        assert_eq!(summary.saved.record.average_pace_sec_per_km, 0);
    }
}
