pub mod linalg;

pub use linalg::*;

use serde::{Deserialize, Serialize};

/// One IMU tick. Rates in rad/s, acceleration in m/s², magnetometer in
/// calibrated units, temperature in °C.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImuSample {
    pub time: f64,
    pub p: f64,
    pub q: f64,
    pub r: f64,
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    pub hx: f64,
    pub hy: f64,
    pub hz: f64,
    pub temp: f64,
}

impl ImuSample {
    pub fn gyro(&self) -> AxisVec {
        AxisVec::new(self.p, self.q, self.r)
    }

    pub fn accel(&self) -> AxisVec {
        AxisVec::new(self.ax, self.ay, self.az)
    }

    pub fn mag(&self) -> AxisVec {
        AxisVec::new(self.hx, self.hy, self.hz)
    }
}

/// GPS fix. Position in radians / meters, velocity NED in m/s.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    pub time: f64,
    pub unix_sec: f64,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub vn: f64,
    pub ve: f64,
    pub vd: f64,
    pub sats: u32,
}

/// Air data sample. Airspeed in knots; altitudes in meters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AirSample {
    pub time: f64,
    pub airspeed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_true: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_press: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_press: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
    /// Direction the wind blows from, degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_dir: Option<f64>,
    /// Wind speed, knots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitot_scale: Option<f64>,
}

impl AirSample {
    pub fn new(time: f64, airspeed: f64) -> Self {
        Self {
            time,
            airspeed,
            altitude: None,
            alt_true: None,
            static_press: None,
            diff_press: None,
            temp: None,
            wind_dir: None,
            wind_speed: None,
            pitot_scale: None,
        }
    }
}

/// Navigation filter estimate. Angles and position in radians.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NavState {
    pub time: f64,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub vn: f64,
    pub ve: f64,
    pub vd: f64,
    pub phi: f64,
    pub the: f64,
    pub psi: f64,
    /// cos(psi), only provided by formats that derive attitude from quaternions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psix: Option<f64>,
    /// sin(psi)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psiy: Option<f64>,
    pub p_bias: f64,
    pub q_bias: f64,
    pub r_bias: f64,
    pub ax_bias: f64,
    pub ay_bias: f64,
    pub az_bias: f64,
}

impl NavState {
    /// A filter that has not converged reports (near) zero position
    pub fn has_position(&self, threshold: f64) -> bool {
        self.lat.abs() > threshold && self.lon.abs() > threshold
    }
}

/// Pilot stick or actuator output; same shape for both streams
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlSample {
    pub time: f64,
    pub aileron: f64,
    pub elevator: f64,
    pub throttle: f64,
    pub rudder: f64,
    pub flaps: f64,
    pub gear: f64,
    pub aux1: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_manual: Option<f64>,
}

/// Autopilot targets. Units follow the source format (see adapter docs).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApState {
    pub time: f64,
    pub master_switch: bool,
    pub pilot_pass_through: bool,
    pub hdg: f64,
    pub roll: f64,
    pub pitch: f64,
    pub alt: f64,
    pub speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthSample {
    pub time: f64,
    pub main_vcc: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time: f64,
    pub message: String,
}
