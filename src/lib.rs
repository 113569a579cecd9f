//! Flight-test telemetry normalization.
//!
//! Three source formats (a structured container, a topic-based binary log
//! and a directory of CSV files) are loaded into one [`NormalizedResult`]:
//! named streams of time-stamped records in shared units.

pub mod adapters;
pub mod calibration;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod interp;
pub mod result;
pub mod sources;
pub mod types;
pub mod units;

pub use adapters::{load, BinlogAdapter, ContainerAdapter, DelimitedAdapter, SourceFormat};
pub use calibration::{ImuCalibration, ImuCorrection};
pub use config::{AdapterConfig, AircraftProfile};
pub use error::{FlightDataError, Result};
pub use result::{NormalizedResult, Stream, StreamKind};
pub use types::{
    AirSample, ApState, ControlSample, Event, GpsFix, HealthSample, ImuSample, NavState,
};
