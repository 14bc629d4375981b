use crate::{
    error::LocationError,
    geo_sample::GeoSample,
    services::{TickId, WatchId},
};

/// Everything that reaches the engine from its asynchronous producers,
/// tagged with the subscription it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Sample(WatchId, GeoSample),
    LocationError(WatchId, LocationError),
    Tick(TickId),
}
