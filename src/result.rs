//! The common output of every adapter.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{
    AirSample, ApState, ControlSample, Event, GpsFix, HealthSample, ImuSample, NavState,
};

/// Stream names, in the order they are reported
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Imu,
    Gps,
    Air,
    Filter,
    FilterPost,
    Pilot,
    Act,
    Ap,
    Health,
    Event,
}

impl StreamKind {
    pub const ALL: [StreamKind; 10] = [
        StreamKind::Imu,
        StreamKind::Gps,
        StreamKind::Air,
        StreamKind::Filter,
        StreamKind::FilterPost,
        StreamKind::Pilot,
        StreamKind::Act,
        StreamKind::Ap,
        StreamKind::Health,
        StreamKind::Event,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Imu => "imu",
            StreamKind::Gps => "gps",
            StreamKind::Air => "air",
            StreamKind::Filter => "filter",
            StreamKind::FilterPost => "filter_post",
            StreamKind::Pilot => "pilot",
            StreamKind::Act => "act",
            StreamKind::Ap => "ap",
            StreamKind::Health => "health",
            StreamKind::Event => "event",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stream's records
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Stream {
    Imu(Vec<ImuSample>),
    Gps(Vec<GpsFix>),
    Air(Vec<AirSample>),
    Nav(Vec<NavState>),
    Control(Vec<ControlSample>),
    Ap(Vec<ApState>),
    Health(Vec<HealthSample>),
    Event(Vec<Event>),
}

impl Stream {
    pub fn len(&self) -> usize {
        match self {
            Stream::Imu(v) => v.len(),
            Stream::Gps(v) => v.len(),
            Stream::Air(v) => v.len(),
            Stream::Nav(v) => v.len(),
            Stream::Control(v) => v.len(),
            Stream::Ap(v) => v.len(),
            Stream::Health(v) => v.len(),
            Stream::Event(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Timestamps of all records, in stream order
    pub fn times(&self) -> Vec<f64> {
        match self {
            Stream::Imu(v) => v.iter().map(|r| r.time).collect(),
            Stream::Gps(v) => v.iter().map(|r| r.time).collect(),
            Stream::Air(v) => v.iter().map(|r| r.time).collect(),
            Stream::Nav(v) => v.iter().map(|r| r.time).collect(),
            Stream::Control(v) => v.iter().map(|r| r.time).collect(),
            Stream::Ap(v) => v.iter().map(|r| r.time).collect(),
            Stream::Health(v) => v.iter().map(|r| r.time).collect(),
            Stream::Event(v) => v.iter().map(|r| r.time).collect(),
        }
    }

    /// (first, last) timestamp, if any records exist
    pub fn time_span(&self) -> Option<(f64, f64)> {
        let times = self.times();
        Some((*times.first()?, *times.last()?))
    }
}

/// Streams produced by one adapter invocation.
///
/// Only adapters in this crate insert; callers get read access.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedResult {
    streams: BTreeMap<StreamKind, Stream>,
}

macro_rules! typed_accessor {
    ($name:ident, $kind:expr, $variant:ident, $ty:ty) => {
        pub fn $name(&self) -> Option<&[$ty]> {
            match self.streams.get(&$kind) {
                Some(Stream::$variant(v)) => Some(v.as_slice()),
                _ => None,
            }
        }
    };
}

impl NormalizedResult {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, kind: StreamKind, stream: Stream) {
        log::info!("{}: {} records", kind, stream.len());
        self.streams.insert(kind, stream);
    }

    pub fn contains(&self, kind: StreamKind) -> bool {
        self.streams.contains_key(&kind)
    }

    pub fn get(&self, kind: StreamKind) -> Option<&Stream> {
        self.streams.get(&kind)
    }

    /// Present stream names, in canonical order
    pub fn keys(&self) -> impl Iterator<Item = StreamKind> + '_ {
        self.streams.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StreamKind, &Stream)> + '_ {
        self.streams.iter().map(|(k, v)| (*k, v))
    }

    /// Number of streams present
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    typed_accessor!(imu, StreamKind::Imu, Imu, ImuSample);
    typed_accessor!(gps, StreamKind::Gps, Gps, GpsFix);
    typed_accessor!(air, StreamKind::Air, Air, AirSample);
    typed_accessor!(filter, StreamKind::Filter, Nav, NavState);
    typed_accessor!(filter_post, StreamKind::FilterPost, Nav, NavState);
    typed_accessor!(pilot, StreamKind::Pilot, Control, ControlSample);
    typed_accessor!(act, StreamKind::Act, Control, ControlSample);
    typed_accessor!(ap, StreamKind::Ap, Ap, ApState);
    typed_accessor!(health, StreamKind::Health, Health, HealthSample);
    typed_accessor!(event, StreamKind::Event, Event, Event);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health(time: f64) -> HealthSample {
        HealthSample {
            time,
            main_vcc: 12.0,
        }
    }

    #[test]
    fn test_keys_in_canonical_order() {
        let mut result = NormalizedResult::new();
        result.insert(StreamKind::Health, Stream::Health(vec![health(0.0)]));
        result.insert(StreamKind::Imu, Stream::Imu(Vec::new()));
        let keys: Vec<_> = result.keys().collect();
        assert_eq!(keys, vec![StreamKind::Imu, StreamKind::Health]);
        assert_eq!(result.len(), 2);
        assert!(!result.contains(StreamKind::Gps));
    }

    #[test]
    fn test_typed_accessors() {
        let mut result = NormalizedResult::new();
        result.insert(
            StreamKind::Health,
            Stream::Health(vec![health(1.0), health(2.5)]),
        );
        assert_eq!(result.health().map(|h| h.len()), Some(2));
        assert!(result.imu().is_none());
        assert_eq!(
            result.get(StreamKind::Health).and_then(|s| s.time_span()),
            Some((1.0, 2.5))
        );
    }

    #[test]
    fn test_serialized_names() {
        let mut result = NormalizedResult::new();
        result.insert(StreamKind::FilterPost, Stream::Nav(Vec::new()));
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"filter_post":[]}"#);
        assert_eq!(StreamKind::FilterPost.to_string(), "filter_post");
    }
}
