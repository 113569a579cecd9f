//! Adapter configuration.
//!
//! Aircraft-specific values (magnetometer correction, container dataset
//! names, actuator PWM mapping, filter thresholds) are handed to an adapter
//! at construction.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FlightDataError, Result};
use crate::types::{affine_from_rows, AffineMat, AffineRows};

/// Aircraft-specific corrections
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AircraftProfile {
    pub name: String,
    /// Row-major 4x4 correction for homogeneous magnetometer vectors
    pub mag_affine: Option<AffineRows>,
}

impl Default for AircraftProfile {
    fn default() -> Self {
        Self {
            name: "none".to_string(),
            mag_affine: None,
        }
    }
}

impl AircraftProfile {
    pub fn mjolner() -> Self {
        Self {
            name: "mjolner".to_string(),
            mag_affine: Some([
                [0.018620589, 0.0003888403, -0.0003962612, -0.229103659],
                [-0.0014668783, 0.0179526977, 0.0008107074, -1.0884978428],
                [-0.000477532, 0.0004510884, 0.016958479, 0.3941687691],
                [0.0, 0.0, 0.0, 1.0],
            ]),
        }
    }

    /// Look up a built-in profile by (case-insensitive) name
    pub fn builtin(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" => Some(Self::default()),
            "mjolner" => Some(Self::mjolner()),
            _ => None,
        }
    }

    pub fn mag_correction(&self) -> Option<AffineMat> {
        self.mag_affine.as_ref().map(affine_from_rows)
    }
}

/// Affine map from a raw PWM-style output to a normalized command:
/// `sign * (raw - offset) / scale`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelMap {
    pub offset: f64,
    pub scale: f64,
    #[serde(default)]
    pub invert: bool,
}

impl ChannelMap {
    pub const fn new(offset: f64, scale: f64, invert: bool) -> Self {
        Self {
            offset,
            scale,
            invert,
        }
    }

    pub fn apply(&self, raw: f64) -> f64 {
        let value = (raw - self.offset) / self.scale;
        if self.invert {
            -value
        } else {
            value
        }
    }
}

/// Output index and mapping for each actuator channel of the binary log
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorMapping {
    pub aileron: (usize, ChannelMap),
    pub elevator: (usize, ChannelMap),
    pub throttle: (usize, ChannelMap),
    pub rudder: (usize, ChannelMap),
}

impl Default for ActuatorMapping {
    fn default() -> Self {
        Self {
            aileron: (0, ChannelMap::new(1500.0, 500.0, false)),
            elevator: (1, ChannelMap::new(1500.0, 500.0, false)),
            throttle: (2, ChannelMap::new(1000.0, 1000.0, false)),
            rudder: (3, ChannelMap::new(1500.0, 500.0, true)),
        }
    }
}

/// Dataset paths of the structured container
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerLayout {
    pub time_us: String,
    pub gyro: [String; 3],
    pub accel: [String; 3],
    pub mag: [String; 3],
    pub imu_temp: String,
    /// Injected gyro fault-bias streams subtracted from the roll rate
    pub gyro_faults: Vec<String>,

    pub gps_lat: String,
    pub gps_lon: String,
    pub gps_alt: String,
    pub gps_vel: [String; 3],
    pub gps_sats: String,
    /// Year, month, day, hour, minute, second
    pub gps_calendar: [String; 6],

    pub airspeed: String,
    pub altitude: String,

    pub nav_lat: String,
    pub nav_lon: String,
    pub nav_alt: String,
    pub nav_vel: [String; 3],
    pub nav_att: [String; 3],
    pub nav_gyro_bias: [String; 3],
    pub nav_accel_bias: [String; 3],

    pub cmd_roll: String,
    pub cmd_pitch: String,
    pub cmd_yaw: String,
    pub cmd_motor: String,
    pub cmd_flap: String,
    pub engage: String,
    pub test_id: String,

    pub ref_phi: String,
    pub ref_theta: String,
    pub ref_speed: String,

    pub main_vcc: String,
}

fn names<const N: usize>(list: [&str; N]) -> [String; N] {
    list.map(str::to_string)
}

impl Default for ContainerLayout {
    fn default() -> Self {
        let prefix = "/Sensor-Processing/Baseline/INS/";
        let ins = |field: &str| format!("{}{}", prefix, field);
        Self {
            time_us: "/Sensors/Fmu/Time_us".to_string(),
            gyro: names([
                "/Sensors/Fmu/Mpu9250/GyroX_rads",
                "/Sensors/Fmu/Mpu9250/GyroY_rads",
                "/Sensors/Fmu/Mpu9250/GyroZ_rads",
            ]),
            accel: names([
                "/Sensors/Fmu/Mpu9250/AccelX_mss",
                "/Sensors/Fmu/Mpu9250/AccelY_mss",
                "/Sensors/Fmu/Mpu9250/AccelZ_mss",
            ]),
            mag: names([
                "/Sensors/Fmu/Mpu9250/MagX_uT",
                "/Sensors/Fmu/Mpu9250/MagY_uT",
                "/Sensors/Fmu/Mpu9250/MagZ_uT",
            ]),
            imu_temp: "/Sensors/Fmu/Mpu9250/Temperature_C".to_string(),
            gyro_faults: vec![
                "/Excitation/Fault_GyroBias_2/gyro_faultBias_rps".to_string(),
                "/Excitation/Fault_GyroBias_10/gyro_faultBias_rps".to_string(),
            ],

            gps_lat: "/Sensors/uBlox/Latitude_rad".to_string(),
            gps_lon: "/Sensors/uBlox/Longitude_rad".to_string(),
            gps_alt: "/Sensors/uBlox/Altitude_m".to_string(),
            gps_vel: names([
                "/Sensors/uBlox/NorthVelocity_ms",
                "/Sensors/uBlox/EastVelocity_ms",
                "/Sensors/uBlox/DownVelocity_ms",
            ]),
            gps_sats: "/Sensors/uBlox/NumberSatellites".to_string(),
            gps_calendar: names([
                "/Sensors/uBlox/Year",
                "/Sensors/uBlox/Month",
                "/Sensors/uBlox/Day",
                "/Sensors/uBlox/Hour",
                "/Sensors/uBlox/Minute",
                "/Sensors/uBlox/Second",
            ]),

            airspeed: "/Sensor-Processing/vIAS_ms".to_string(),
            altitude: "/Sensor-Processing/Altitude_m".to_string(),

            nav_lat: ins("Latitude_rad"),
            nav_lon: ins("Longitude_rad"),
            nav_alt: ins("Altitude_m"),
            nav_vel: [
                ins("NorthVelocity_ms"),
                ins("EastVelocity_ms"),
                ins("DownVelocity_ms"),
            ],
            nav_att: [ins("Roll_rad"), ins("Pitch_rad"), ins("Heading_rad")],
            nav_gyro_bias: [
                ins("GyroXBias_rads"),
                ins("GyroYBias_rads"),
                ins("GyroZBias_rads"),
            ],
            nav_accel_bias: [
                ins("AccelXBias_mss"),
                ins("AccelYBias_mss"),
                ins("AccelZBias_mss"),
            ],

            cmd_roll: "/Control/cmdRoll_rads".to_string(),
            cmd_pitch: "/Control/cmdPitch_rads".to_string(),
            cmd_yaw: "/Control/cmdYaw_rads".to_string(),
            cmd_motor: "/Control/cmdMotor_nd".to_string(),
            cmd_flap: "/Control/cmdFlap_nd".to_string(),
            engage: "/Mission/socEngage".to_string(),
            test_id: "/Mission/testID".to_string(),

            ref_phi: "/Control/refPhi_rad".to_string(),
            ref_theta: "/Control/refTheta_rad".to_string(),
            ref_speed: "/Control/refV_ms".to_string(),

            main_vcc: "/Sensors/Fmu/Voltage/Input_V".to_string(),
        }
    }
}

/// Settings shared by all adapters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub profile: AircraftProfile,
    /// GPS fixes with fewer satellites are dropped
    pub min_satellites: u32,
    /// Container de-duplication tolerances on consecutive fixes (radians)
    pub gps_dedup_lat: f64,
    pub gps_dedup_lon: f64,
    /// Nav records with |lat| or |lon| at or below this are dropped
    pub nav_zero_threshold: f64,
    /// IMU temperature when the binary log has no temperature topic (°C)
    pub default_imu_temp: f64,
    pub actuators: ActuatorMapping,
    pub layout: ContainerLayout,
    /// Write imu-0.txt / gps-0.txt / filter-0.txt next to a container file
    pub write_summaries: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            profile: AircraftProfile::default(),
            min_satellites: 5,
            gps_dedup_lat: 1e-10,
            gps_dedup_lon: 1e-13,
            nav_zero_threshold: 1e-4,
            default_imu_temp: 15.0,
            actuators: ActuatorMapping::default(),
            layout: ContainerLayout::default(),
            write_summaries: false,
        }
    }
}

impl AdapterConfig {
    pub fn with_profile(mut self, profile: AircraftProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Load from a JSON file; missing keys take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let maps = [
            ("aileron", &self.actuators.aileron.1),
            ("elevator", &self.actuators.elevator.1),
            ("throttle", &self.actuators.throttle.1),
            ("rudder", &self.actuators.rudder.1),
        ];
        for (name, map) in maps {
            if map.scale == 0.0 || !map.scale.is_finite() {
                return Err(FlightDataError::Config(format!(
                    "actuator '{}' has unusable scale {}",
                    name, map.scale
                )));
            }
        }
        if self.nav_zero_threshold < 0.0 {
            return Err(FlightDataError::Config(
                "nav_zero_threshold must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
