//! Live tracking of a running session from raw, noisy position fixes.
//!
//! Fixes go through [`filter::accept`], accepted ones extend the
//! trajectory and the [`distance::DistanceAccumulator`], and
//! [`pace`] turns the result into average and smoothed paces. The
//! [`engine::SessionEngine`] owns all of it and drives the external
//! collaborators found in [`services`].

pub mod distance;
pub mod engine;
pub mod error;
pub mod event;
pub mod filter;
pub mod format;
pub mod geo_sample;
pub mod pace;
pub mod record;
pub mod services;
pub mod session;
pub mod track_point;

pub use engine::SessionEngine;
pub use error::{LocationError, TrackerError};
pub use event::EngineEvent;
pub use filter::{FilterConfig, RejectReason, Verdict};
pub use geo_sample::GeoSample;
pub use record::{SavedSession, SessionMeta, SessionRecord, StoredSessionId};
pub use session::{SessionSnapshot, SessionState};
pub use track_point::TrackPoint;
