//! Structured time-series container (UMN3 flight computer layout).
//!
//! Every dataset is co-indexed with one master microsecond clock, so records
//! are built 1:1 per clock index. Optional side files (`filter-post.csv`)
//! are picked up from the container's directory.

use std::path::Path;

use chrono::NaiveDate;

use super::delimited::{read_nav_csv, FILTER_POST_FILE};
use crate::config::{AdapterConfig, ContainerLayout};
use crate::error::{FlightDataError, Result};
use crate::events::MissionEventDetector;
use crate::export;
use crate::result::{NormalizedResult, Stream, StreamKind};
use crate::sources::{Container, DatasetDump};
use crate::types::{
    apply_affine, AirSample, ApState, AxisVec, ControlSample, GpsFix, HealthSample, ImuSample,
    NavState,
};
use crate::units::{micros_to_secs, MPS2KT, R2D};

/// Which stream groups the container can populate, decided before any
/// record is built
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainerChannels {
    pub imu: bool,
    /// Fault-injection datasets that exist, in layout order
    pub gyro_faults: Vec<String>,
    pub gps: bool,
    pub air: bool,
    pub filter: bool,
    pub commands: bool,
    pub ap: bool,
    pub health: bool,
    pub events: bool,
}

impl ContainerChannels {
    pub fn probe(container: &dyn Container, layout: &ContainerLayout) -> Self {
        let all = |names: &[&String]| names.iter().all(|n| container.contains(n));

        let mut imu: Vec<&String> = layout.gyro.iter().collect();
        imu.extend(layout.accel.iter());
        imu.extend(layout.mag.iter());
        imu.push(&layout.imu_temp);

        let mut gps = vec![&layout.gps_lat, &layout.gps_lon, &layout.gps_alt, &layout.gps_sats];
        gps.extend(layout.gps_vel.iter());
        gps.extend(layout.gps_calendar.iter());

        let mut filter = vec![&layout.nav_lat, &layout.nav_lon, &layout.nav_alt];
        filter.extend(layout.nav_vel.iter());
        filter.extend(layout.nav_att.iter());
        filter.extend(layout.nav_gyro_bias.iter());
        filter.extend(layout.nav_accel_bias.iter());

        let commands = all(&[
            &layout.cmd_roll,
            &layout.cmd_pitch,
            &layout.cmd_yaw,
            &layout.cmd_motor,
            &layout.cmd_flap,
            &layout.engage,
        ]);

        Self {
            imu: all(&imu),
            gyro_faults: layout
                .gyro_faults
                .iter()
                .filter(|n| container.contains(n))
                .cloned()
                .collect(),
            gps: all(&gps),
            air: all(&[&layout.airspeed, &layout.altitude]),
            filter: all(&filter),
            commands,
            ap: all(&[
                &layout.ref_phi,
                &layout.ref_theta,
                &layout.ref_speed,
                &layout.engage,
            ]),
            health: all(&[&layout.main_vcc]),
            events: all(&[&layout.engage, &layout.test_id]),
        }
    }
}

/// Reads co-indexed datasets and checks their length against the clock
struct Columns<'a> {
    container: &'a dyn Container,
    len: usize,
}

impl<'a> Columns<'a> {
    fn get(&self, name: &str) -> Result<Vec<f64>> {
        let values = self.container.read(name)?;
        if values.len() < self.len {
            return Err(FlightDataError::parse(
                name,
                values.len(),
                format!("dataset has {} values, master clock has {}", values.len(), self.len),
            ));
        }
        Ok(values)
    }

    fn get3(&self, names: &[String; 3]) -> Result<[Vec<f64>; 3]> {
        Ok([self.get(&names[0])?, self.get(&names[1])?, self.get(&names[2])?])
    }
}

pub struct ContainerAdapter {
    config: AdapterConfig,
}

impl ContainerAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }

    /// Open a dataset dump and load it; `filter-post.csv` and the optional
    /// summary files live next to it.
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<NormalizedResult> {
        let path = path.as_ref();
        let container = DatasetDump::from_path(path)?;
        let flight_dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let result = self.load(&container, flight_dir)?;

        if self.config.write_summaries {
            let dir = flight_dir.unwrap_or_else(|| Path::new("."));
            export::write_summaries(&result, dir)?;
        }
        Ok(result)
    }

    pub fn load(&self, container: &dyn Container, flight_dir: Option<&Path>) -> Result<NormalizedResult> {
        let layout = &self.config.layout;
        if !container.contains(&layout.time_us) {
            return Err(FlightDataError::missing(layout.time_us.as_str()));
        }
        let channels = ContainerChannels::probe(container, layout);
        log::debug!("container channels: {:?}", channels);

        let time: Vec<f64> = container
            .read(&layout.time_us)?
            .into_iter()
            .map(micros_to_secs)
            .collect();
        let cols = Columns {
            container,
            len: time.len(),
        };

        let mut result = NormalizedResult::new();

        if channels.imu {
            result.insert(StreamKind::Imu, Stream::Imu(self.imu(&cols, &time, &channels)?));
        } else {
            log::debug!("container has no complete IMU channel set");
        }

        if channels.gps {
            result.insert(StreamKind::Gps, Stream::Gps(self.gps(&cols, &time)?));
        }

        if channels.air {
            result.insert(StreamKind::Air, Stream::Air(self.air(&cols, &time)?));
        }

        if channels.filter {
            result.insert(StreamKind::Filter, Stream::Nav(self.filter(&cols, &time)?));
        }

        if let Some(dir) = flight_dir {
            let post = dir.join(FILTER_POST_FILE);
            if post.exists() {
                log::info!("loading post-processed filter from {}", post.display());
                let nav = read_nav_csv(&post, self.config.nav_zero_threshold)?;
                result.insert(StreamKind::FilterPost, Stream::Nav(nav));
            }
        }

        if channels.commands {
            let (pilot, act) = self.commands(&cols, &time)?;
            result.insert(StreamKind::Pilot, Stream::Control(pilot));
            result.insert(StreamKind::Act, Stream::Control(act));
        }

        if channels.ap {
            result.insert(StreamKind::Ap, Stream::Ap(self.ap(&cols, &time)?));
        }

        if channels.health {
            let vcc = cols.get(&layout.main_vcc)?;
            let health = time
                .iter()
                .zip(vcc)
                .map(|(&time, main_vcc)| HealthSample { time, main_vcc })
                .collect();
            result.insert(StreamKind::Health, Stream::Health(health));
        }

        if channels.events {
            let engage = cols.get(&layout.engage)?;
            let test_id = cols.get(&layout.test_id)?;
            let mut detector = MissionEventDetector::new();
            let events = time
                .iter()
                .enumerate()
                .flat_map(|(i, &t)| detector.detect(t, engage[i], test_id[i]))
                .collect();
            result.insert(StreamKind::Event, Stream::Event(events));
        }

        Ok(result)
    }

    fn imu(&self, cols: &Columns, time: &[f64], channels: &ContainerChannels) -> Result<Vec<ImuSample>> {
        let layout = &self.config.layout;
        let [gx, gy, gz] = cols.get3(&layout.gyro)?;
        let [ax, ay, az] = cols.get3(&layout.accel)?;
        let [hx, hy, hz] = cols.get3(&layout.mag)?;
        let temp = cols.get(&layout.imu_temp)?;
        let faults = channels
            .gyro_faults
            .iter()
            .map(|name| cols.get(name))
            .collect::<Result<Vec<_>>>()?;
        let mag_affine = self.config.profile.mag_correction();

        let mut imu = Vec::with_capacity(time.len());
        for (i, &t) in time.iter().enumerate() {
            let raw_mag = AxisVec::new(hx[i], hy[i], hz[i]);
            let mag = match &mag_affine {
                Some(m) => apply_affine(m, raw_mag),
                None => raw_mag,
            };

            // Each injected fault bias is removed from the roll rate twice
            let mut p = gx[i];
            for _ in 0..2 {
                for fault in &faults {
                    p -= fault[i];
                }
            }

            imu.push(ImuSample {
                time: t,
                p,
                q: gy[i],
                r: gz[i],
                ax: ax[i],
                ay: ay[i],
                az: az[i],
                hx: mag.x,
                hy: mag.y,
                hz: mag.z,
                temp: temp[i],
            });
        }
        Ok(imu)
    }

    /// Seconds between the unix epoch and the container's relative zero
    fn unix_base(&self, cols: &Columns, time: &[f64]) -> Result<f64> {
        let first = match time.first() {
            Some(t) => *t,
            None => return Ok(0.0),
        };
        let layout = &self.config.layout;
        let mut fields = [0.0; 6];
        for (slot, name) in fields.iter_mut().zip(layout.gps_calendar.iter()) {
            *slot = cols.get(name)?[0];
        }
        let [year, month, day, hour, minute, second] = fields;
        let stamp = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
            .and_then(|d| d.and_hms_opt(hour as u32, minute as u32, second as u32))
            .ok_or_else(|| {
                FlightDataError::parse(
                    layout.gps_calendar[0].as_str(),
                    0,
                    format!(
                        "invalid GPS calendar {}-{}-{} {}:{}:{}",
                        year, month, day, hour, minute, second
                    ),
                )
            })?;
        Ok(stamp.and_utc().timestamp() as f64 - first)
    }

    fn gps(&self, cols: &Columns, time: &[f64]) -> Result<Vec<GpsFix>> {
        let layout = &self.config.layout;
        let lat = cols.get(&layout.gps_lat)?;
        let lon = cols.get(&layout.gps_lon)?;
        let alt = cols.get(&layout.gps_alt)?;
        let [vn, ve, vd] = cols.get3(&layout.gps_vel)?;
        let sats = cols.get(&layout.gps_sats)?;
        let unix_base = self.unix_base(cols, time)?;

        let mut gps = Vec::new();
        let mut last: Option<(f64, f64)> = None;
        for (i, &t) in time.iter().enumerate() {
            let count = sats[i];
            if !count.is_finite() || count < 0.0 {
                return Err(FlightDataError::parse(
                    layout.gps_sats.as_str(),
                    i,
                    format!("invalid satellite count {}", count),
                ));
            }
            let count = count as u32;
            if count < self.config.min_satellites {
                continue;
            }

            let moved = match last {
                Some((last_lat, last_lon)) => {
                    (lat[i] - last_lat).abs() > self.config.gps_dedup_lat
                        || (lon[i] - last_lon).abs() > self.config.gps_dedup_lon
                }
                None => true,
            };
            if !moved {
                continue;
            }
            last = Some((lat[i], lon[i]));

            gps.push(GpsFix {
                time: t,
                unix_sec: unix_base + t,
                lat: lat[i],
                lon: lon[i],
                alt: alt[i],
                vn: vn[i],
                ve: ve[i],
                vd: vd[i],
                sats: count,
            });
        }
        Ok(gps)
    }

    fn air(&self, cols: &Columns, time: &[f64]) -> Result<Vec<AirSample>> {
        let layout = &self.config.layout;
        let airspeed = cols.get(&layout.airspeed)?;
        let altitude = cols.get(&layout.altitude)?;
        Ok(time
            .iter()
            .enumerate()
            .map(|(i, &t)| AirSample {
                altitude: Some(altitude[i]),
                alt_true: Some(altitude[i]),
                ..AirSample::new(t, airspeed[i] * MPS2KT)
            })
            .collect())
    }

    fn filter(&self, cols: &Columns, time: &[f64]) -> Result<Vec<NavState>> {
        let layout = &self.config.layout;
        let lat = cols.get(&layout.nav_lat)?;
        let lon = cols.get(&layout.nav_lon)?;
        let alt = cols.get(&layout.nav_alt)?;
        let [vn, ve, vd] = cols.get3(&layout.nav_vel)?;
        let [phi, the, psi] = cols.get3(&layout.nav_att)?;
        let [gbx, gby, gbz] = cols.get3(&layout.nav_gyro_bias)?;
        let [abx, aby, abz] = cols.get3(&layout.nav_accel_bias)?;

        Ok(time
            .iter()
            .enumerate()
            .map(|(i, &t)| NavState {
                time: t,
                lat: lat[i],
                lon: lon[i],
                alt: alt[i],
                vn: vn[i],
                ve: ve[i],
                vd: vd[i],
                phi: phi[i],
                the: the[i],
                psi: psi[i],
                psix: None,
                psiy: None,
                p_bias: gbx[i],
                q_bias: gby[i],
                r_bias: gbz[i],
                ax_bias: abx[i],
                ay_bias: aby[i],
                az_bias: abz[i],
            })
            .filter(|nav| nav.has_position(self.config.nav_zero_threshold))
            .collect())
    }

    /// Pilot and actuator streams share the command channels
    fn commands(&self, cols: &Columns, time: &[f64]) -> Result<(Vec<ControlSample>, Vec<ControlSample>)> {
        let layout = &self.config.layout;
        let roll = cols.get(&layout.cmd_roll)?;
        let pitch = cols.get(&layout.cmd_pitch)?;
        let yaw = cols.get(&layout.cmd_yaw)?;
        let motor = cols.get(&layout.cmd_motor)?;
        let flaps = cols.get(&layout.cmd_flap)?;
        let engage = cols.get(&layout.engage)?;

        let act: Vec<ControlSample> = time
            .iter()
            .enumerate()
            .map(|(i, &t)| ControlSample {
                time: t,
                aileron: roll[i],
                elevator: pitch[i],
                throttle: motor[i],
                rudder: yaw[i],
                flaps: flaps[i],
                gear: 0.0,
                aux1: 0.0,
                auto_manual: None,
            })
            .collect();
        let pilot = act
            .iter()
            .enumerate()
            .map(|(i, cmd)| ControlSample {
                auto_manual: Some(engage[i]),
                ..cmd.clone()
            })
            .collect();
        Ok((pilot, act))
    }

    /// Attitude references in degrees, speed in knots
    fn ap(&self, cols: &Columns, time: &[f64]) -> Result<Vec<ApState>> {
        let layout = &self.config.layout;
        let phi = cols.get(&layout.ref_phi)?;
        let theta = cols.get(&layout.ref_theta)?;
        let speed = cols.get(&layout.ref_speed)?;
        let engage = cols.get(&layout.engage)?;
        Ok(time
            .iter()
            .enumerate()
            .map(|(i, &t)| ApState {
                time: t,
                master_switch: engage[i] > 0.0,
                pilot_pass_through: false,
                hdg: 0.0,
                roll: phi[i] * R2D,
                pitch: theta[i] * R2D,
                alt: 0.0,
                speed: speed[i] * MPS2KT,
                ground: Some(0.0),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AircraftProfile;
    use approx::assert_abs_diff_eq;
    use std::fs;

    /// Minimal complete container of `n` samples at 50 Hz
    fn fixture(n: usize) -> DatasetDump {
        let layout = ContainerLayout::default();
        let mut dump = DatasetDump::new();
        let time: Vec<f64> = (0..n).map(|i| 1_000_000.0 + 20_000.0 * i as f64).collect();
        dump.insert(layout.time_us.clone(), time);

        let fill = |dump: &mut DatasetDump, name: &str, f: &dyn Fn(usize) -> f64| {
            dump.insert(name, (0..n).map(f).collect());
        };

        for (k, name) in layout.gyro.iter().enumerate() {
            fill(&mut dump, name, &|i| 0.01 * (k + 1) as f64 + 0.001 * i as f64);
        }
        for (k, name) in layout.accel.iter().enumerate() {
            fill(&mut dump, name, &|_| if k == 2 { -9.81 } else { 0.0 });
        }
        for (k, name) in layout.mag.iter().enumerate() {
            fill(&mut dump, name, &|_| 20.0 * (k + 1) as f64);
        }
        fill(&mut dump, &layout.imu_temp, &|_| 31.5);

        // Position holds still for the first three samples, then moves
        fill(&mut dump, &layout.gps_lat, &|i| 0.78 + 1e-7 * i.saturating_sub(2) as f64);
        fill(&mut dump, &layout.gps_lon, &|i| -1.63 - 1e-7 * i.saturating_sub(2) as f64);
        fill(&mut dump, &layout.gps_alt, &|_| 300.0);
        for name in &layout.gps_vel {
            fill(&mut dump, name, &|_| 1.0);
        }
        fill(&mut dump, &layout.gps_sats, &|i| if i == 4 { 4.0 } else { 9.0 });
        for (name, value) in layout
            .gps_calendar
            .iter()
            .zip([2018.0, 6.0, 14.0, 17.0, 30.0, 5.0])
        {
            fill(&mut dump, name, &|_| value);
        }

        fill(&mut dump, &layout.airspeed, &|_| 20.0);
        fill(&mut dump, &layout.altitude, &|_| 310.0);

        // Filter converges after the second sample
        fill(&mut dump, &layout.nav_lat, &|i| if i < 2 { 0.0 } else { 0.78 });
        fill(&mut dump, &layout.nav_lon, &|i| if i < 2 { 0.0 } else { -1.63 });
        fill(&mut dump, &layout.nav_alt, &|_| 300.0);
        for name in layout
            .nav_vel
            .iter()
            .chain(layout.nav_att.iter())
            .chain(layout.nav_gyro_bias.iter())
            .chain(layout.nav_accel_bias.iter())
        {
            fill(&mut dump, name, &|_| 0.1);
        }

        for name in [
            &layout.cmd_roll,
            &layout.cmd_pitch,
            &layout.cmd_yaw,
            &layout.cmd_motor,
            &layout.cmd_flap,
        ] {
            fill(&mut dump, name, &|_| 0.25);
        }
        fill(&mut dump, &layout.engage, &|i| if (3..6).contains(&i) { 1.0 } else { 0.0 });
        fill(&mut dump, &layout.test_id, &|i| if i < 3 { 0.0 } else { 2.0 });
        fill(&mut dump, &layout.ref_phi, &|_| std::f64::consts::FRAC_PI_6);
        fill(&mut dump, &layout.ref_theta, &|_| 0.0);
        fill(&mut dump, &layout.ref_speed, &|_| 17.0);
        fill(&mut dump, &layout.main_vcc, &|_| 5.1);
        dump
    }

    fn adapter() -> ContainerAdapter {
        ContainerAdapter::new(AdapterConfig::default())
    }

    #[test]
    fn test_missing_master_clock() {
        let err = adapter().load(&DatasetDump::new(), None).unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn test_all_streams_present() {
        let result = adapter().load(&fixture(8), None).unwrap();
        let keys: Vec<_> = result.keys().collect();
        assert_eq!(
            keys,
            vec![
                StreamKind::Imu,
                StreamKind::Gps,
                StreamKind::Air,
                StreamKind::Filter,
                StreamKind::Pilot,
                StreamKind::Act,
                StreamKind::Ap,
                StreamKind::Health,
                StreamKind::Event,
            ]
        );
        let imu = result.imu().unwrap();
        assert_eq!(imu.len(), 8);
        assert_abs_diff_eq!(imu[0].time, 1.0);
        assert_abs_diff_eq!(imu[1].time, 1.02);
        assert_eq!(imu[0].hx, 20.0);
    }

    #[test]
    fn test_optional_groups_skipped() {
        let layout = ContainerLayout::default();
        let mut dump = DatasetDump::new();
        dump.insert(layout.time_us.clone(), vec![1_000_000.0, 1_020_000.0]);
        let result = adapter().load(&dump, None).unwrap();
        assert!(result.is_empty());

        // A partial IMU group is skipped, a complete health group is not
        dump.insert(layout.gyro[0].clone(), vec![0.1, 0.2]);
        dump.insert(layout.main_vcc.clone(), vec![5.0, 5.1]);
        let result = adapter().load(&dump, None).unwrap();
        assert_eq!(result.keys().collect::<Vec<_>>(), vec![StreamKind::Health]);
    }

    #[test]
    fn test_fault_streams_subtracted_twice() {
        let layout = ContainerLayout::default();
        let mut dump = fixture(3);
        dump.insert(layout.gyro_faults[0].clone(), vec![0.001; 3]);
        dump.insert(layout.gyro_faults[1].clone(), vec![0.0005; 3]);
        let base = adapter().load(&fixture(3), None).unwrap();
        let faulted = adapter().load(&dump, None).unwrap();
        for (a, b) in base.imu().unwrap().iter().zip(faulted.imu().unwrap()) {
            assert_abs_diff_eq!(a.p - b.p, 2.0 * (0.001 + 0.0005), epsilon = 1e-12);
            assert_eq!(a.q, b.q);
        }
    }

    #[test]
    fn test_mag_profile_affine() {
        let config = AdapterConfig::default().with_profile(AircraftProfile::mjolner());
        let result = ContainerAdapter::new(config).load(&fixture(2), None).unwrap();
        let imu = &result.imu().unwrap()[0];
        let expected_hx = 0.018620589 * 20.0 + 0.0003888403 * 40.0 - 0.0003962612 * 60.0 - 0.229103659;
        assert_abs_diff_eq!(imu.hx, expected_hx, epsilon = 1e-12);
    }

    #[test]
    fn test_gps_dedup_and_satellites() {
        let result = adapter().load(&fixture(8), None).unwrap();
        let gps = result.gps().unwrap();
        // Samples 0..=2 share a position (one emitted), sample 4 lacks satellites
        let times: Vec<f64> = gps.iter().map(|g| g.time).collect();
        assert_eq!(times.len(), 5);
        assert_abs_diff_eq!(times[0], 1.0);
        assert_abs_diff_eq!(times[1], 1.06);
        assert!(gps.iter().all(|g| g.sats >= 5));
        for pair in gps.windows(2) {
            let same_lat = (pair[1].lat - pair[0].lat).abs() <= 1e-10;
            let same_lon = (pair[1].lon - pair[0].lon).abs() <= 1e-13;
            assert!(!(same_lat && same_lon));
        }
    }

    #[test]
    fn test_gps_unix_time() {
        let result = adapter().load(&fixture(3), None).unwrap();
        let gps = &result.gps().unwrap()[0];
        // 2018-06-14T17:30:05Z
        assert_abs_diff_eq!(gps.unix_sec, 1_528_997_405.0, epsilon = 1e-6);
    }

    #[test]
    fn test_bad_calendar_is_parse_error() {
        let layout = ContainerLayout::default();
        let mut dump = fixture(3);
        dump.insert(layout.gps_calendar[1].clone(), vec![13.0; 3]);
        let err = adapter().load(&dump, None).unwrap_err();
        assert!(matches!(err, FlightDataError::Parse { .. }));
    }

    #[test]
    fn test_filter_zero_rejection() {
        let result = adapter().load(&fixture(6), None).unwrap();
        let filter = result.filter().unwrap();
        assert_eq!(filter.len(), 4);
        assert!(filter.iter().all(|n| n.lat.abs() > 1e-4 && n.lon.abs() > 1e-4));
    }

    #[test]
    fn test_air_ap_and_events() {
        let result = adapter().load(&fixture(8), None).unwrap();
        let air = &result.air().unwrap()[0];
        assert_abs_diff_eq!(air.airspeed, 20.0 * MPS2KT);
        assert_eq!(air.alt_true, air.altitude);

        let ap = result.ap().unwrap();
        assert_abs_diff_eq!(ap[0].roll, 30.0, epsilon = 1e-9);
        assert!(!ap[0].master_switch);
        assert!(ap[3].master_switch);

        let pilot = result.pilot().unwrap();
        assert_eq!(pilot[3].auto_manual, Some(1.0));
        assert_eq!(result.act().unwrap()[3].auto_manual, None);

        let messages: Vec<&str> = result
            .event()
            .unwrap()
            .iter()
            .map(|e| e.message.as_str())
            .collect();
        assert_eq!(
            messages,
            vec!["Test ID = 0", "SOC Engaged", "Test ID = 2", "SOC Disengaged"]
        );
    }

    #[test]
    fn test_short_dataset_is_parse_error() {
        let layout = ContainerLayout::default();
        let mut dump = fixture(4);
        dump.insert(layout.airspeed.clone(), vec![1.0]);
        let err = adapter().load(&dump, None).unwrap_err();
        assert!(matches!(err, FlightDataError::Parse { .. }));
    }

    #[test]
    fn test_filter_post_side_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(FILTER_POST_FILE),
            "timestamp,latitude_deg,longitude_deg,altitude_m,vn_ms,ve_ms,vd_ms,roll_deg,pitch_deg,heading_deg,p_bias,q_bias,r_bias,ax_bias,ay_bias,az_bias\n\
             1.0,0.0,0.0,0,0,0,0,0,0,0,0,0,0,0,0,0\n\
             1.1,45.0,-93.0,280,1,2,3,10,5,270,0,0,0,0,0,0\n",
        )
        .unwrap();
        let result = adapter().load(&fixture(2), Some(dir.path())).unwrap();
        let post = result.filter_post().unwrap();
        assert_eq!(post.len(), 1);
        assert_abs_diff_eq!(post[0].psi, -std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_load_path_writes_summaries() {
        let dir = tempfile::tempdir().unwrap();
        let dump_path = dir.path().join("flight.json");
        let layout = ContainerLayout::default();
        let json = format!(
            r#"{{ "{}": [1000000, 1020000], "{}": [20, 21], "{}": [300, 301] }}"#,
            layout.time_us, layout.airspeed, layout.altitude
        );
        fs::write(&dump_path, json).unwrap();

        let config = AdapterConfig {
            write_summaries: true,
            ..AdapterConfig::default()
        };
        let result = ContainerAdapter::new(config).load_path(&dump_path).unwrap();
        assert_eq!(result.keys().collect::<Vec<_>>(), vec![StreamKind::Air]);
        assert!(dir.path().join("imu-0.txt").exists());
        assert!(dir.path().join("gps-0.txt").exists());
        assert!(!dir.path().join("filter-0.txt").exists());
    }
}
