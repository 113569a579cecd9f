//! Directory of header-named CSV files (aura flight logger).
//!
//! `imu-0.csv` and `gps-0.csv` are required; every other stream file is
//! picked up when present. The logger records IMU values already corrected
//! with the calibration saved next to them in `imucal.json`.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::calibration::{ImuCalibration, ImuCorrection};
use crate::config::AdapterConfig;
use crate::error::{FlightDataError, Result};
use crate::result::{NormalizedResult, Stream, StreamKind};
use crate::types::{
    AirSample, ApState, ControlSample, Event, GpsFix, HealthSample, ImuSample, NavState,
};
use crate::units::{wrap_heading_deg, D2R};

pub const IMU_FILE: &str = "imu-0.csv";
pub const GPS_FILE: &str = "gps-0.csv";
pub const AIR_FILE: &str = "air-0.csv";
pub const FILTER_FILE: &str = "filter-0.csv";
pub const FILTER_POST_FILE: &str = "filter-post.csv";
pub const PILOT_FILE: &str = "pilot-0.csv";
pub const ACT_FILE: &str = "act-0.csv";
pub const AP_FILE: &str = "ap-0.csv";
pub const HEALTH_FILE: &str = "health-0.csv";
pub const EVENT_FILE: &str = "event-0.csv";
pub const IMUCAL_FILE: &str = "imucal.json";

#[derive(Deserialize)]
struct ImuRow {
    timestamp: f64,
    p_rad_sec: f64,
    q_rad_sec: f64,
    r_rad_sec: f64,
    ax_mps_sec: f64,
    ay_mps_sec: f64,
    az_mps_sec: f64,
    hx: f64,
    hy: f64,
    hz: f64,
    #[serde(rename = "temp_C")]
    temp_c: f64,
}

#[derive(Deserialize)]
struct GpsRow {
    timestamp: f64,
    unix_time_sec: f64,
    latitude_deg: f64,
    longitude_deg: f64,
    altitude_m: f64,
    vn_ms: f64,
    ve_ms: f64,
    vd_ms: f64,
    satellites: u32,
}

#[derive(Deserialize)]
struct AirRow {
    timestamp: f64,
    pressure_mbar: f64,
    #[serde(rename = "temp_C")]
    temp_c: f64,
    airspeed_smoothed_kt: f64,
    altitude_smoothed_m: f64,
    altitude_true_m: f64,
}

/// `filter-0.csv` / `filter-post.csv`; angles and position in degrees
#[derive(Deserialize)]
struct NavRow {
    timestamp: f64,
    latitude_deg: f64,
    longitude_deg: f64,
    altitude_m: f64,
    vn_ms: f64,
    ve_ms: f64,
    vd_ms: f64,
    roll_deg: f64,
    pitch_deg: f64,
    heading_deg: f64,
    p_bias: f64,
    q_bias: f64,
    r_bias: f64,
    ax_bias: f64,
    ay_bias: f64,
    az_bias: f64,
}

impl From<NavRow> for NavState {
    fn from(row: NavRow) -> Self {
        NavState {
            time: row.timestamp,
            lat: row.latitude_deg * D2R,
            lon: row.longitude_deg * D2R,
            alt: row.altitude_m,
            vn: row.vn_ms,
            ve: row.ve_ms,
            vd: row.vd_ms,
            phi: row.roll_deg * D2R,
            the: row.pitch_deg * D2R,
            psi: wrap_heading_deg(row.heading_deg) * D2R,
            psix: None,
            psiy: None,
            p_bias: row.p_bias,
            q_bias: row.q_bias,
            r_bias: row.r_bias,
            ax_bias: row.ax_bias,
            ay_bias: row.ay_bias,
            az_bias: row.az_bias,
        }
    }
}

#[derive(Deserialize)]
struct PilotRow {
    timestamp: f64,
    #[serde(rename = "channel[0]")]
    ch0: f64,
    #[serde(rename = "channel[1]")]
    ch1: f64,
    #[serde(rename = "channel[2]")]
    ch2: f64,
    #[serde(rename = "channel[3]")]
    ch3: f64,
    #[serde(rename = "channel[4]")]
    ch4: f64,
    #[serde(rename = "channel[5]")]
    ch5: f64,
    #[serde(rename = "channel[6]")]
    ch6: f64,
    #[serde(rename = "channel[7]")]
    ch7: f64,
}

#[derive(Deserialize)]
struct ActRow {
    timestamp: f64,
    aileron_norm: f64,
    elevator_norm: f64,
    throttle_norm: f64,
    rudder_norm: f64,
    channel5_norm: f64,
    flaps_norm: f64,
    channel7_norm: f64,
    channel8_norm: f64,
}

#[derive(Deserialize)]
struct ApRow {
    timestamp: f64,
    master_switch: f64,
    pilot_pass_through: f64,
    groundtrack_deg: f64,
    roll_deg: f64,
    altitude_msl_ft: f64,
    pitch_deg: f64,
    airspeed_kt: f64,
    altitude_ground_m: f64,
}

#[derive(Deserialize)]
struct HealthRow {
    timestamp: f64,
    main_vcc: f64,
}

#[derive(Deserialize)]
struct EventRow {
    timestamp: f64,
    message: String,
}

/// Deserialize every row of a header-named CSV file. The first bad row
/// aborts the read.
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(FlightDataError::missing(path.display().to_string()));
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (row, record) in reader.deserialize::<T>().enumerate() {
        let record = record.map_err(|e| FlightDataError::parse(name.as_str(), row, e.to_string()))?;
        rows.push(record);
    }
    Ok(rows)
}

/// Read a nav estimate file, dropping rows without a position fix.
/// The threshold applies to the converted radian values.
pub(crate) fn read_nav_csv(path: &Path, zero_threshold: f64) -> Result<Vec<NavState>> {
    Ok(read_rows::<NavRow>(path)?
        .into_iter()
        .map(NavState::from)
        .filter(|nav| nav.has_position(zero_threshold))
        .collect())
}

/// Files found in a flight directory, resolved before any is read
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryFiles {
    pub imu: PathBuf,
    pub gps: PathBuf,
    pub air: Option<PathBuf>,
    pub filter: Option<PathBuf>,
    pub filter_post: Option<PathBuf>,
    pub pilot: Option<PathBuf>,
    pub act: Option<PathBuf>,
    pub ap: Option<PathBuf>,
    pub health: Option<PathBuf>,
    pub event: Option<PathBuf>,
    pub imucal: Option<PathBuf>,
}

impl DirectoryFiles {
    /// `imu-0.csv` and `gps-0.csv` must exist; everything else is optional
    pub fn probe(dir: &Path) -> Result<Self> {
        let required = |file: &str| {
            let path = dir.join(file);
            if path.is_file() {
                Ok(path)
            } else {
                Err(FlightDataError::missing(path.display().to_string()))
            }
        };
        let optional = |file: &str| {
            let path = dir.join(file);
            if path.is_file() {
                Some(path)
            } else {
                log::debug!("no {} in {}", file, dir.display());
                None
            }
        };

        Ok(Self {
            imu: required(IMU_FILE)?,
            gps: required(GPS_FILE)?,
            air: optional(AIR_FILE),
            filter: optional(FILTER_FILE),
            filter_post: optional(FILTER_POST_FILE),
            pilot: optional(PILOT_FILE),
            act: optional(ACT_FILE),
            ap: optional(AP_FILE),
            health: optional(HEALTH_FILE),
            event: optional(EVENT_FILE),
            imucal: optional(IMUCAL_FILE),
        })
    }
}

pub struct DelimitedAdapter {
    config: AdapterConfig,
}

impl DelimitedAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }

    /// Load a flight directory. `recalibrate` names an alternate
    /// calibration applied after the resident one has been backed out.
    pub fn load<P: AsRef<Path>>(&self, dir: P, recalibrate: Option<&Path>) -> Result<NormalizedResult> {
        let files = DirectoryFiles::probe(dir.as_ref())?;
        log::debug!("flight directory: {:?}", files);
        let mut result = NormalizedResult::new();

        let imu = self.calibrate(self.imu(&files.imu)?, files.imucal.as_deref(), recalibrate)?;
        result.insert(StreamKind::Imu, Stream::Imu(imu));
        result.insert(StreamKind::Gps, Stream::Gps(self.gps(&files.gps)?));

        if let Some(path) = &files.air {
            result.insert(StreamKind::Air, Stream::Air(self.air(path)?));
        }
        if let Some(path) = &files.filter {
            let nav = read_nav_csv(path, self.config.nav_zero_threshold)?;
            result.insert(StreamKind::Filter, Stream::Nav(nav));
        }
        if let Some(path) = &files.filter_post {
            let nav = read_nav_csv(path, self.config.nav_zero_threshold)?;
            result.insert(StreamKind::FilterPost, Stream::Nav(nav));
        }
        if let Some(path) = &files.pilot {
            result.insert(StreamKind::Pilot, Stream::Control(self.pilot(path)?));
        }
        if let Some(path) = &files.act {
            result.insert(StreamKind::Act, Stream::Control(self.act(path)?));
        }
        if let Some(path) = &files.ap {
            result.insert(StreamKind::Ap, Stream::Ap(self.ap(path)?));
        }
        if let Some(path) = &files.health {
            let health = read_rows::<HealthRow>(path)?
                .into_iter()
                .map(|row| HealthSample {
                    time: row.timestamp,
                    main_vcc: row.main_vcc,
                })
                .collect();
            result.insert(StreamKind::Health, Stream::Health(health));
        }
        if let Some(path) = &files.event {
            let events = read_rows::<EventRow>(path)?
                .into_iter()
                .map(|row| Event {
                    time: row.timestamp,
                    message: row.message,
                })
                .collect();
            result.insert(StreamKind::Event, Stream::Event(events));
        }

        Ok(result)
    }

    /// Back out the resident calibration, then apply the alternate one
    fn calibrate(
        &self,
        mut imu: Vec<ImuSample>,
        resident: Option<&Path>,
        recalibrate: Option<&Path>,
    ) -> Result<Vec<ImuSample>> {
        if let Some(path) = resident {
            log::info!("back correcting IMU data with {}", path.display());
            imu = ImuCalibration::load(path)?.back_correct_all(&imu);
        }
        if let Some(path) = recalibrate {
            log::info!("recalibrating IMU data with {}", path.display());
            imu = ImuCalibration::load(path)?.correct_all(&imu);
        }
        Ok(imu)
    }

    fn imu(&self, path: &Path) -> Result<Vec<ImuSample>> {
        Ok(read_rows::<ImuRow>(path)?
            .into_iter()
            .map(|row| ImuSample {
                time: row.timestamp,
                p: row.p_rad_sec,
                q: row.q_rad_sec,
                r: row.r_rad_sec,
                ax: row.ax_mps_sec,
                ay: row.ay_mps_sec,
                az: row.az_mps_sec,
                hx: row.hx,
                hy: row.hy,
                hz: row.hz,
                temp: row.temp_c,
            })
            .collect())
    }

    /// Keeps fixes with enough satellites whose time is strictly later than
    /// the previous row, accepted or not
    fn gps(&self, path: &Path) -> Result<Vec<GpsFix>> {
        let mut gps = Vec::new();
        let mut last_time = f64::NEG_INFINITY;
        for row in read_rows::<GpsRow>(path)? {
            if row.satellites >= self.config.min_satellites && row.timestamp > last_time {
                gps.push(GpsFix {
                    time: row.timestamp,
                    unix_sec: row.unix_time_sec,
                    lat: row.latitude_deg * D2R,
                    lon: row.longitude_deg * D2R,
                    alt: row.altitude_m,
                    vn: row.vn_ms,
                    ve: row.ve_ms,
                    vd: row.vd_ms,
                    sats: row.satellites,
                });
            }
            last_time = row.timestamp;
        }
        Ok(gps)
    }

    fn air(&self, path: &Path) -> Result<Vec<AirSample>> {
        Ok(read_rows::<AirRow>(path)?
            .into_iter()
            .map(|row| AirSample {
                altitude: Some(row.altitude_smoothed_m),
                alt_true: Some(row.altitude_true_m),
                static_press: Some(row.pressure_mbar),
                diff_press: Some(0.0),
                temp: Some(row.temp_c),
                ..AirSample::new(row.timestamp, row.airspeed_smoothed_kt)
            })
            .collect())
    }

    fn pilot(&self, path: &Path) -> Result<Vec<ControlSample>> {
        Ok(read_rows::<PilotRow>(path)?
            .into_iter()
            .map(|row| ControlSample {
                time: row.timestamp,
                aileron: row.ch0,
                elevator: row.ch1,
                throttle: row.ch2,
                rudder: row.ch3,
                gear: row.ch4,
                flaps: row.ch5,
                aux1: row.ch6,
                auto_manual: Some(row.ch7),
            })
            .collect())
    }

    fn act(&self, path: &Path) -> Result<Vec<ControlSample>> {
        Ok(read_rows::<ActRow>(path)?
            .into_iter()
            .map(|row| ControlSample {
                time: row.timestamp,
                aileron: row.aileron_norm,
                elevator: row.elevator_norm,
                throttle: row.throttle_norm,
                rudder: row.rudder_norm,
                gear: row.channel5_norm,
                flaps: row.flaps_norm,
                aux1: row.channel7_norm,
                auto_manual: Some(row.channel8_norm),
            })
            .collect())
    }

    /// Degrees, feet and knots as logged
    fn ap(&self, path: &Path) -> Result<Vec<ApState>> {
        Ok(read_rows::<ApRow>(path)?
            .into_iter()
            .map(|row| ApState {
                time: row.timestamp,
                master_switch: row.master_switch != 0.0,
                pilot_pass_through: row.pilot_pass_through != 0.0,
                hdg: row.groundtrack_deg,
                roll: row.roll_deg,
                pitch: row.pitch_deg,
                alt: row.altitude_msl_ft,
                speed: row.airspeed_kt,
                ground: Some(row.altitude_ground_m),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationFile;
    use approx::assert_abs_diff_eq;
    use std::fs;
    use tempfile::TempDir;

    const IMU_HEADER: &str = "timestamp,p_rad_sec,q_rad_sec,r_rad_sec,ax_mps_sec,ay_mps_sec,az_mps_sec,hx,hy,hz,temp_C";
    const GPS_HEADER: &str =
        "timestamp,unix_time_sec,latitude_deg,longitude_deg,altitude_m,vn_ms,ve_ms,vd_ms,satellites";

    fn flight_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(IMU_FILE),
            format!(
                "{}\n0.00, 0.01, -0.02, 0.03, 0.1, 0.2, -9.8, 0.3, 0.1, -0.5, 25.0\n0.02, 0.01, -0.02, 0.03, 0.1, 0.2, -9.8, 0.3, 0.1, -0.5, 25.5\n",
                IMU_HEADER
            ),
        )
        .unwrap();
        fs::write(
            dir.path().join(GPS_FILE),
            format!(
                "{}\n\
                 1.0,1528997405.0,45.0,-93.0,280.0,1,2,0,9\n\
                 1.0,1528997405.0,45.0,-93.0,280.0,1,2,0,9\n\
                 1.2,1528997405.2,45.1,-93.0,280.0,1,2,0,4\n\
                 1.1,1528997405.1,45.1,-93.0,280.0,1,2,0,9\n\
                 1.4,1528997405.4,45.2,-93.0,280.0,1,2,0,8\n",
                GPS_HEADER
            ),
        )
        .unwrap();
        dir
    }

    fn calibration_json() -> String {
        let mut file = CalibrationFile::default();
        file.p_bias = vec![0.001, 0.01];
        file.ax_bias = vec![0.05];
        file.az_scale = vec![0.002, 0.98];
        file.mag_affine = [
            [1.2, 0.1, 0.0, 0.05],
            [0.0, 0.9, 0.0, -0.1],
            [0.0, 0.0, 1.1, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        serde_json::to_string(&file).unwrap()
    }

    fn adapter() -> DelimitedAdapter {
        DelimitedAdapter::new(AdapterConfig::default())
    }

    #[test]
    fn test_minimal_directory() {
        let dir = flight_dir();
        let result = adapter().load(dir.path(), None).unwrap();
        assert_eq!(result.keys().collect::<Vec<_>>(), vec![StreamKind::Imu, StreamKind::Gps]);
        let imu = result.imu().unwrap();
        assert_eq!(imu.len(), 2);
        assert_eq!(imu[1].temp, 25.5);
        assert_eq!(imu[0].hz, -0.5);
    }

    #[test]
    fn test_missing_mandatory_file() {
        let dir = flight_dir();
        fs::remove_file(dir.path().join(GPS_FILE)).unwrap();
        let err = adapter().load(dir.path(), None).unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn test_directory_probe() {
        let dir = flight_dir();
        fs::write(dir.path().join(AP_FILE), "timestamp\n").unwrap();
        fs::write(dir.path().join("imubias.csv"), "timestamp,p_bias\n").unwrap();
        let files = DirectoryFiles::probe(dir.path()).unwrap();
        assert_eq!(files.imu, dir.path().join(IMU_FILE));
        assert_eq!(files.ap, Some(dir.path().join(AP_FILE)));
        assert_eq!(files.air, None);
        assert_eq!(files.imucal, None);
    }

    #[test]
    fn test_gps_monotonic_and_satellites() {
        let dir = flight_dir();
        let result = adapter().load(dir.path(), None).unwrap();
        let gps = result.gps().unwrap();
        // Duplicate time, too few satellites, then a step back to 1.1
        // which is earlier than the rejected 1.2 row
        let times: Vec<f64> = gps.iter().map(|g| g.time).collect();
        assert_eq!(times, vec![1.0, 1.4]);
        assert_abs_diff_eq!(gps[0].lat, 45.0 * D2R);
        assert_eq!(gps[1].sats, 8);
    }

    #[test]
    fn test_bad_number_is_parse_error() {
        let dir = flight_dir();
        fs::write(
            dir.path().join(IMU_FILE),
            format!("{}\n0.0,0,0,0,0,0,0,0,0,0,25\n0.1,abc,0,0,0,0,0,0,0,0,25\n", IMU_HEADER),
        )
        .unwrap();
        match adapter().load(dir.path(), None).unwrap_err() {
            FlightDataError::Parse { source_name, row, .. } => {
                assert_eq!(source_name, IMU_FILE);
                assert_eq!(row, 1);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_optional_streams() {
        let dir = flight_dir();
        fs::write(
            dir.path().join(AIR_FILE),
            "timestamp,pressure_mbar,temp_C,airspeed_smoothed_kt,altitude_smoothed_m,altitude_true_m\n1.0,970.1,21.0,32.5,300.0,305.0\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(FILTER_FILE),
            "timestamp,latitude_deg,longitude_deg,altitude_m,vn_ms,ve_ms,vd_ms,roll_deg,pitch_deg,heading_deg,p_bias,q_bias,r_bias,ax_bias,ay_bias,az_bias\n\
             0.5,0.00001,0.0,0,0,0,0,0,0,0,0,0,0,0,0,0\n\
             1.0,45.0,-93.0,280,1,2,3,10,-5,350,0.001,0,0,0,0,0.02\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(PILOT_FILE),
            "timestamp,channel[0],channel[1],channel[2],channel[3],channel[4],channel[5],channel[6],channel[7]\n1.0,0.1,0.2,0.3,0.4,0.5,0.6,0.7,1.0\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(ACT_FILE),
            "timestamp,aileron_norm,elevator_norm,throttle_norm,rudder_norm,channel5_norm,flaps_norm,channel7_norm,channel8_norm\n1.0,0.1,0.2,0.3,0.4,0.5,0.6,0.7,0.0\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(AP_FILE),
            "timestamp,master_switch,pilot_pass_through,groundtrack_deg,roll_deg,altitude_msl_ft,pitch_deg,airspeed_kt,altitude_ground_m\n1.0,1,0,90.0,15.0,1200.0,3.0,30.0,250.0\n",
        )
        .unwrap();
        fs::write(dir.path().join(HEALTH_FILE), "timestamp,main_vcc\n1.0,5.05\n").unwrap();
        fs::write(dir.path().join(EVENT_FILE), "timestamp,message\n1.5,Test ID = 3\n").unwrap();

        let result = adapter().load(dir.path(), None).unwrap();
        assert_eq!(result.len(), 9);
        assert!(!result.contains(StreamKind::FilterPost));

        let air = &result.air().unwrap()[0];
        assert_eq!(air.airspeed, 32.5);
        assert_eq!(air.alt_true, Some(305.0));
        assert_eq!(air.static_press, Some(970.1));

        let filter = result.filter().unwrap();
        assert_eq!(filter.len(), 1);
        assert_abs_diff_eq!(filter[0].psi, -10.0 * D2R, epsilon = 1e-12);
        assert_abs_diff_eq!(filter[0].the, -5.0 * D2R, epsilon = 1e-12);
        assert_eq!(filter[0].az_bias, 0.02);

        let pilot = &result.pilot().unwrap()[0];
        assert_eq!(pilot.gear, 0.5);
        assert_eq!(pilot.flaps, 0.6);
        assert_eq!(pilot.auto_manual, Some(1.0));
        assert_eq!(result.act().unwrap()[0].flaps, 0.6);

        let ap = &result.ap().unwrap()[0];
        assert!(ap.master_switch);
        assert!(!ap.pilot_pass_through);
        assert_eq!(ap.alt, 1200.0);

        assert_eq!(result.health().unwrap()[0].main_vcc, 5.05);
        assert_eq!(result.event().unwrap()[0].message, "Test ID = 3");
    }

    #[test]
    fn test_resident_calibration_is_backed_out() {
        let dir = flight_dir();
        let raw = adapter().load(dir.path(), None).unwrap().imu().unwrap().to_vec();

        fs::write(dir.path().join(IMUCAL_FILE), calibration_json()).unwrap();
        let backed = adapter().load(dir.path(), None).unwrap();
        let cal = ImuCalibration::load(dir.path().join(IMUCAL_FILE)).unwrap();

        // Re-applying the resident calibration recovers the logged values
        for (logged, back) in raw.iter().zip(backed.imu().unwrap()) {
            let again = cal.correct(back);
            assert_abs_diff_eq!(again.p, logged.p, epsilon = 1e-9);
            assert_abs_diff_eq!(again.az, logged.az, epsilon = 1e-9);
            assert_abs_diff_eq!(again.hx, logged.hx, epsilon = 1e-9);
            assert_abs_diff_eq!(again.hy, logged.hy, epsilon = 1e-9);
        }
        assert!((backed.imu().unwrap()[0].p - raw[0].p).abs() > 1e-6);
    }

    #[test]
    fn test_recalibration_order() {
        let dir = flight_dir();
        fs::write(dir.path().join(IMUCAL_FILE), calibration_json()).unwrap();
        let alt_path = dir.path().join("alt-cal.json");
        let mut alternate = CalibrationFile::default();
        alternate.p_bias = vec![0.005];
        alternate.ay_bias = vec![-0.1];
        fs::write(&alt_path, serde_json::to_string(&alternate).unwrap()).unwrap();

        let backed = adapter().load(dir.path(), None).unwrap();
        let recal = adapter().load(dir.path(), Some(&alt_path)).unwrap();
        let alt_cal = ImuCalibration::load(&alt_path).unwrap();

        for (b, r) in backed.imu().unwrap().iter().zip(recal.imu().unwrap()) {
            let expected = alt_cal.correct(b);
            assert_abs_diff_eq!(r.p, expected.p, epsilon = 1e-12);
            assert_abs_diff_eq!(r.p, b.p - 0.005, epsilon = 1e-12);
            assert_abs_diff_eq!(r.ay, b.ay + 0.1, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_malformed_calibration() {
        let dir = flight_dir();
        fs::write(dir.path().join(IMUCAL_FILE), "{ \"p_bias\": [0.1, ").unwrap();
        let err = adapter().load(dir.path(), None).unwrap_err();
        assert!(matches!(err, FlightDataError::CalibrationLoad { .. }));

        let dir = flight_dir();
        let err = adapter()
            .load(dir.path(), Some(&dir.path().join("nope.json")))
            .unwrap_err();
        assert!(matches!(err, FlightDataError::CalibrationLoad { .. }));
    }

    #[test]
    fn test_nav_zero_rejection_in_radians() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILTER_POST_FILE);
        fs::write(
            &path,
            "timestamp,latitude_deg,longitude_deg,altitude_m,vn_ms,ve_ms,vd_ms,roll_deg,pitch_deg,heading_deg,p_bias,q_bias,r_bias,ax_bias,ay_bias,az_bias\n\
             1.0,0.001,0.001,0,0,0,0,0,0,0,0,0,0,0,0,0\n\
             2.0,0.01,-0.01,0,0,0,0,0,0,0,0,0,0,0,0,0\n",
        )
        .unwrap();

        // 0.001 deg is 1.7e-5 rad and falls under the threshold
        let nav = read_nav_csv(&path, 1e-4).unwrap();
        assert_eq!(nav.len(), 1);
        assert_eq!(nav[0].time, 2.0);
        assert!(nav.iter().all(|n| n.lat.abs() > 1e-4 && n.lon.abs() > 1e-4));
    }
}
