//! Topic-based binary flight log (PX4 ulog message tables).
//!
//! Topics are sampled at independent rates. Slow auxiliary topics
//! (temperature, magnetometer, airspeed, wind, global position) are turned
//! into interpolators first and then evaluated at the timestamps of the
//! stream being built.

use std::path::Path;

use crate::config::{AdapterConfig, ChannelMap};
use crate::error::{FlightDataError, Result};
use crate::interp::{ChannelInterp, Interp1d};
use crate::result::{NormalizedResult, Stream, StreamKind};
use crate::sources::{Topic, TopicDump, TopicLog};
use crate::types::{AirSample, ApState, ControlSample, GpsFix, ImuSample, NavState};
use crate::units::{micros_to_secs, quat_to_euler, wind_from_ne, D2R, MPS2KT};

pub const ACTUATOR_OUTPUTS: &str = "actuator_outputs";
pub const AIRSPEED: &str = "airspeed";
pub const SENSOR_ACCEL: &str = "sensor_accel";
pub const SENSOR_COMBINED: &str = "sensor_combined";
pub const VEHICLE_AIR_DATA: &str = "vehicle_air_data";
pub const VEHICLE_ATTITUDE: &str = "vehicle_attitude";
pub const VEHICLE_ATTITUDE_SETPOINT: &str = "vehicle_attitude_setpoint";
pub const VEHICLE_GLOBAL_POSITION: &str = "vehicle_global_position";
pub const VEHICLE_GPS_POSITION: &str = "vehicle_gps_position";
pub const VEHICLE_MAGNETOMETER: &str = "vehicle_magnetometer";
pub const WIND_ESTIMATE: &str = "wind_estimate";

const GPS_DEG_SCALE: f64 = 1e7;
const GPS_MM_PER_M: f64 = 1e3;

/// Which of the known topics carry data
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopicPresence {
    pub actuator_outputs: bool,
    pub airspeed: bool,
    pub sensor_accel: bool,
    pub sensor_combined: bool,
    pub vehicle_air_data: bool,
    pub vehicle_attitude: bool,
    pub vehicle_attitude_setpoint: bool,
    pub vehicle_global_position: bool,
    pub vehicle_gps_position: bool,
    pub vehicle_magnetometer: bool,
    pub wind_estimate: bool,
}

impl TopicPresence {
    /// Empty topics count as absent
    pub fn probe(flight_log: &dyn TopicLog) -> Self {
        let has = |name: &str| match flight_log.topic(name) {
            Some(topic) if topic.is_empty() => {
                log::warn!("topic '{}' has no messages, ignoring it", name);
                false
            }
            Some(_) => true,
            None => false,
        };
        Self {
            actuator_outputs: has(ACTUATOR_OUTPUTS),
            airspeed: has(AIRSPEED),
            sensor_accel: has(SENSOR_ACCEL),
            sensor_combined: has(SENSOR_COMBINED),
            vehicle_air_data: has(VEHICLE_AIR_DATA),
            vehicle_attitude: has(VEHICLE_ATTITUDE),
            vehicle_attitude_setpoint: has(VEHICLE_ATTITUDE_SETPOINT),
            vehicle_global_position: has(VEHICLE_GLOBAL_POSITION),
            vehicle_gps_position: has(VEHICLE_GPS_POSITION),
            vehicle_magnetometer: has(VEHICLE_MAGNETOMETER),
            wind_estimate: has(WIND_ESTIMATE),
        }
    }
}

/// Auxiliary signals, each keyed to its own topic's timestamps (µs)
#[derive(Default)]
struct AuxInterps {
    temp: Option<Interp1d>,
    mag: Option<ChannelInterp>,
    airspeed_kt: Option<Interp1d>,
    /// Direction (deg) and speed (kt)
    wind: Option<ChannelInterp>,
    /// lat (deg), lon (deg), alt, vn, ve, vd
    position: Option<ChannelInterp>,
}

/// Magnetometer from its own topic when logged, else the co-timestamped
/// `sensor_combined` fields
enum MagSource<'a> {
    Interp(&'a ChannelInterp),
    Fields([&'a [f64]; 3]),
}

impl MagSource<'_> {
    fn at(&self, index: usize, us: f64) -> [f64; 3] {
        match self {
            MagSource::Interp(m) => [m.sample_channel(0, us), m.sample_channel(1, us), m.sample_channel(2, us)],
            MagSource::Fields([hx, hy, hz]) => [hx[index], hy[index], hz[index]],
        }
    }
}

/// Topic lookup for a topic known to be present
fn topic<'a>(flight_log: &'a dyn TopicLog, name: &str) -> Result<&'a Topic> {
    flight_log.topic(name).ok_or_else(|| FlightDataError::missing(name))
}

fn fields<'a, const N: usize>(topic: &'a Topic, names: [&str; N]) -> Result<[&'a [f64]; N]> {
    let mut out: [&[f64]; N] = [&[][..]; N];
    for (slot, name) in out.iter_mut().zip(names) {
        *slot = topic.field(name)?;
    }
    Ok(out)
}

fn output_channel<'a>(t: &'a Topic, (index, map): &(usize, ChannelMap)) -> Result<(&'a [f64], ChannelMap)> {
    Ok((t.field(&format!("output[{}]", index))?, *map))
}

pub struct BinlogAdapter {
    config: AdapterConfig,
}

impl BinlogAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }

    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<NormalizedResult> {
        let flight_log = TopicDump::from_path(path)?;
        self.load(&flight_log)
    }

    pub fn load(&self, flight_log: &dyn TopicLog) -> Result<NormalizedResult> {
        let present = TopicPresence::probe(flight_log);
        log::debug!("binary log topics: {:?}", present);
        let aux = self.build_interps(flight_log, &present)?;

        let mut result = NormalizedResult::new();

        if present.sensor_combined {
            let imu = self.imu(topic(flight_log, SENSOR_COMBINED)?, &aux)?;
            result.insert(StreamKind::Imu, Stream::Imu(imu));
        }

        if present.vehicle_gps_position {
            let gps = self.gps(topic(flight_log, VEHICLE_GPS_POSITION)?)?;
            result.insert(StreamKind::Gps, Stream::Gps(gps));
        }

        if present.vehicle_air_data {
            let air = self.air_data(topic(flight_log, VEHICLE_AIR_DATA)?, &aux)?;
            result.insert(StreamKind::Air, Stream::Air(air));
        } else if present.airspeed {
            let air = self.air_from_airspeed(topic(flight_log, AIRSPEED)?, &aux)?;
            result.insert(StreamKind::Air, Stream::Air(air));
        }

        if present.vehicle_attitude {
            match &aux.position {
                Some(position) => {
                    let nav = self.filter(topic(flight_log, VEHICLE_ATTITUDE)?, position)?;
                    result.insert(StreamKind::Filter, Stream::Nav(nav));
                }
                None => log::debug!("no global position, skipping filter stream"),
            }
        }

        if present.vehicle_attitude_setpoint {
            let ap = self.ap(topic(flight_log, VEHICLE_ATTITUDE_SETPOINT)?)?;
            result.insert(StreamKind::Ap, Stream::Ap(ap));
        }

        if present.actuator_outputs {
            let act = self.act(topic(flight_log, ACTUATOR_OUTPUTS)?)?;
            result.insert(StreamKind::Act, Stream::Control(act));
        }

        Ok(result)
    }

    fn build_interps(&self, flight_log: &dyn TopicLog, present: &TopicPresence) -> Result<AuxInterps> {
        let mut aux = AuxInterps::default();

        if present.sensor_accel {
            let t = topic(flight_log, SENSOR_ACCEL)?;
            aux.temp = Some(Interp1d::new(&t.times_us(), t.field("temperature")?)?);
        }

        if present.vehicle_magnetometer {
            let t = topic(flight_log, VEHICLE_MAGNETOMETER)?;
            let cols = fields(
                t,
                ["magnetometer_ga[0]", "magnetometer_ga[1]", "magnetometer_ga[2]"],
            )?;
            aux.mag = Some(ChannelInterp::new(&t.times_us(), &cols)?);
        }

        if present.airspeed {
            let t = topic(flight_log, AIRSPEED)?;
            let kt: Vec<f64> = t
                .field("indicated_airspeed_m_s")?
                .iter()
                .map(|v| v * MPS2KT)
                .collect();
            aux.airspeed_kt = Some(Interp1d::new(&t.times_us(), &kt)?);
        }

        if present.wind_estimate {
            let t = topic(flight_log, WIND_ESTIMATE)?;
            let [wn, we] = fields(t, ["windspeed_north", "windspeed_east"])?;
            let (dir, speed): (Vec<f64>, Vec<f64>) =
                wn.iter().zip(we).map(|(&n, &e)| wind_from_ne(n, e)).unzip();
            aux.wind = Some(ChannelInterp::new(&t.times_us(), &[&dir[..], &speed[..]])?);
        }

        if present.vehicle_global_position {
            let t = topic(flight_log, VEHICLE_GLOBAL_POSITION)?;
            let [lat, lon, alt] = fields(t, ["lat", "lon", "alt"])?;
            let zeros = vec![0.0; t.len()];
            let [vn, ve, vd] = if t.has_field("vel_n") {
                fields(t, ["vel_n", "vel_e", "vel_d"])?
            } else {
                [&zeros[..], &zeros[..], &zeros[..]]
            };
            aux.position = Some(ChannelInterp::new(
                &t.times_us(),
                &[lat, lon, alt, vn, ve, vd],
            )?);
        }

        Ok(aux)
    }

    fn imu(&self, t: &Topic, aux: &AuxInterps) -> Result<Vec<ImuSample>> {
        let [p, q, r] = fields(t, ["gyro_rad[0]", "gyro_rad[1]", "gyro_rad[2]"])?;
        let [ax, ay, az] = fields(
            t,
            [
                "accelerometer_m_s2[0]",
                "accelerometer_m_s2[1]",
                "accelerometer_m_s2[2]",
            ],
        )?;
        let mag = match &aux.mag {
            Some(interp) => MagSource::Interp(interp),
            None => MagSource::Fields(fields(
                t,
                ["magnetometer_ga[0]", "magnetometer_ga[1]", "magnetometer_ga[2]"],
            )?),
        };

        let mut imu = Vec::with_capacity(t.len());
        for (i, &stamp) in t.timestamps.iter().enumerate() {
            let us = stamp as f64;
            let temp = match &aux.temp {
                Some(interp) => interp.sample(us),
                None => self.config.default_imu_temp,
            };
            let [hx, hy, hz] = mag.at(i, us);
            imu.push(ImuSample {
                time: micros_to_secs(us),
                p: p[i],
                q: q[i],
                r: r[i],
                ax: ax[i],
                ay: ay[i],
                az: az[i],
                hx,
                hy,
                hz,
                temp,
            });
        }
        Ok(imu)
    }

    fn gps(&self, t: &Topic) -> Result<Vec<GpsFix>> {
        let [utc, lat, lon, alt, vn, ve, vd, sats] = fields(
            t,
            [
                "time_utc_usec",
                "lat",
                "lon",
                "alt",
                "vel_n_m_s",
                "vel_e_m_s",
                "vel_d_m_s",
                "satellites_used",
            ],
        )?;

        let mut gps = Vec::new();
        for (i, &stamp) in t.timestamps.iter().enumerate() {
            if sats[i].is_nan() || sats[i] < self.config.min_satellites as f64 {
                continue;
            }
            gps.push(GpsFix {
                time: micros_to_secs(stamp as f64),
                unix_sec: micros_to_secs(utc[i]),
                lat: lat[i] / GPS_DEG_SCALE * D2R,
                lon: lon[i] / GPS_DEG_SCALE * D2R,
                alt: alt[i] / GPS_MM_PER_M,
                vn: vn[i],
                ve: ve[i],
                vd: vd[i],
                sats: sats[i] as u32,
            });
        }
        Ok(gps)
    }

    fn wind_at(aux: &AuxInterps, us: f64) -> (Option<f64>, Option<f64>) {
        match &aux.wind {
            Some(w) => (Some(w.sample_channel(0, us)), Some(w.sample_channel(1, us))),
            None => (None, None),
        }
    }

    fn air_data(&self, t: &Topic, aux: &AuxInterps) -> Result<Vec<AirSample>> {
        let [press, temp, alt] = fields(t, ["baro_pressure_pa", "baro_temp_celcius", "baro_alt_meter"])?;
        if aux.airspeed_kt.is_none() {
            log::warn!("air data without an airspeed topic, airspeed reported as 0");
        }

        Ok(t.timestamps
            .iter()
            .enumerate()
            .map(|(i, &stamp)| {
                let us = stamp as f64;
                let airspeed = aux.airspeed_kt.as_ref().map_or(0.0, |a| a.sample(us));
                let (wind_dir, wind_speed) = Self::wind_at(aux, us);
                AirSample {
                    altitude: Some(alt[i]),
                    static_press: Some(press[i]),
                    diff_press: Some(0.0),
                    temp: Some(temp[i]),
                    wind_dir,
                    wind_speed,
                    pitot_scale: Some(1.0),
                    ..AirSample::new(micros_to_secs(us), airspeed)
                }
            })
            .collect())
    }

    fn air_from_airspeed(&self, t: &Topic, aux: &AuxInterps) -> Result<Vec<AirSample>> {
        let ias = t.field("indicated_airspeed_m_s")?;
        Ok(t.timestamps
            .iter()
            .enumerate()
            .map(|(i, &stamp)| {
                let us = stamp as f64;
                let (wind_dir, wind_speed) = Self::wind_at(aux, us);
                AirSample {
                    wind_dir,
                    wind_speed,
                    pitot_scale: Some(1.0),
                    ..AirSample::new(micros_to_secs(us), ias[i] * MPS2KT)
                }
            })
            .collect())
    }

    fn filter(&self, t: &Topic, position: &ChannelInterp) -> Result<Vec<NavState>> {
        let [q0, q1, q2, q3] = fields(t, ["q[0]", "q[1]", "q[2]", "q[3]"])?;
        Ok(t.timestamps
            .iter()
            .enumerate()
            .map(|(i, &stamp)| {
                let us = stamp as f64;
                let (phi, the, psi) = quat_to_euler([q0[i], q1[i], q2[i], q3[i]]);
                let pos = position.sample(us);
                NavState {
                    time: micros_to_secs(us),
                    lat: pos[0] * D2R,
                    lon: pos[1] * D2R,
                    alt: pos[2],
                    vn: pos[3],
                    ve: pos[4],
                    vd: pos[5],
                    phi,
                    the,
                    psi,
                    psix: Some(psi.cos()),
                    psiy: Some(psi.sin()),
                    ..NavState::default()
                }
            })
            .collect())
    }

    /// Setpoints stay in radians
    fn ap(&self, t: &Topic) -> Result<Vec<ApState>> {
        let [yaw, roll, pitch] = fields(t, ["yaw_body", "roll_body", "pitch_body"])?;
        Ok(t.timestamps
            .iter()
            .enumerate()
            .map(|(i, &stamp)| ApState {
                time: micros_to_secs(stamp as f64),
                hdg: yaw[i],
                roll: roll[i],
                pitch: pitch[i],
                ..ApState::default()
            })
            .collect())
    }

    fn act(&self, t: &Topic) -> Result<Vec<ControlSample>> {
        let mapping = &self.config.actuators;
        let aileron = output_channel(t, &mapping.aileron)?;
        let elevator = output_channel(t, &mapping.elevator)?;
        let throttle = output_channel(t, &mapping.throttle)?;
        let rudder = output_channel(t, &mapping.rudder)?;
        let out = |channel: &(&[f64], ChannelMap), i: usize| channel.1.apply(channel.0[i]);

        Ok(t.timestamps
            .iter()
            .enumerate()
            .map(|(i, &stamp)| ControlSample {
                time: micros_to_secs(stamp as f64),
                aileron: out(&aileron, i),
                elevator: out(&elevator, i),
                throttle: out(&throttle, i),
                rudder: out(&rudder, i),
                ..ControlSample::default()
            })
            .collect())
    }
}
