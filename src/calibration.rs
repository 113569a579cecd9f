//! IMU calibration collaborator.
//!
//! A calibration maps raw IMU triples to corrected ones (`correct`) and
//! back (`back_correct`). The delimited log stores already-corrected IMU
//! values together with the calibration that produced them, so the adapter
//! can recover raw values and optionally re-apply a different calibration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FlightDataError, Result};
use crate::types::{
    affine_from_rows, affine_to_rows, apply_affine, AffineMat, AffineRows, AxisVec, ImuSample,
};

/// Maps IMU samples between raw and corrected space
pub trait ImuCorrection {
    fn correct(&self, sample: &ImuSample) -> ImuSample;
    fn back_correct(&self, sample: &ImuSample) -> ImuSample;

    fn correct_all(&self, samples: &[ImuSample]) -> Vec<ImuSample> {
        samples.iter().map(|s| self.correct(s)).collect()
    }

    fn back_correct_all(&self, samples: &[ImuSample]) -> Vec<ImuSample> {
        samples.iter().map(|s| self.back_correct(s)).collect()
    }
}

/// Evaluate a polynomial, highest order coefficient first
fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, c| acc * x + c)
}

fn zero_poly() -> Vec<f64> {
    vec![0.0]
}

fn unit_poly() -> Vec<f64> {
    vec![1.0]
}

/// Samples checked across the fitted temperature range for a vanishing scale
const SCALE_SCAN_STEPS: usize = 64;

/// True when an accel scale polynomial reaches zero where it can be evaluated:
/// anywhere for a constant, otherwise on `[lo, hi]` when both bounds are known.
fn scale_vanishes(coeffs: &[f64], range: Option<(f64, f64)>) -> bool {
    if coeffs.iter().all(|c| *c == 0.0) {
        return true;
    }
    let Some((lo, hi)) = range else {
        return false;
    };
    let mut prev: Option<f64> = None;
    for i in 0..=SCALE_SCAN_STEPS {
        let t = lo + (hi - lo) * i as f64 / SCALE_SCAN_STEPS as f64;
        let value = polyval(coeffs, t);
        if value == 0.0 || prev.map(|p| p.signum() != value.signum()).unwrap_or(false) {
            return true;
        }
        prev = Some(value);
    }
    false
}

fn identity_rows() -> AffineRows {
    affine_to_rows(&AffineMat::identity())
}

/// On-disk form of `imucal.json`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationFile {
    #[serde(default)]
    pub min_temp: Option<f64>,
    #[serde(default)]
    pub max_temp: Option<f64>,
    #[serde(default = "zero_poly")]
    pub p_bias: Vec<f64>,
    #[serde(default = "zero_poly")]
    pub q_bias: Vec<f64>,
    #[serde(default = "zero_poly")]
    pub r_bias: Vec<f64>,
    #[serde(default = "zero_poly")]
    pub ax_bias: Vec<f64>,
    #[serde(default = "zero_poly")]
    pub ay_bias: Vec<f64>,
    #[serde(default = "zero_poly")]
    pub az_bias: Vec<f64>,
    #[serde(default = "unit_poly")]
    pub ax_scale: Vec<f64>,
    #[serde(default = "unit_poly")]
    pub ay_scale: Vec<f64>,
    #[serde(default = "unit_poly")]
    pub az_scale: Vec<f64>,
    #[serde(default = "identity_rows")]
    pub mag_affine: AffineRows,
}

impl Default for CalibrationFile {
    fn default() -> Self {
        Self {
            min_temp: None,
            max_temp: None,
            p_bias: zero_poly(),
            q_bias: zero_poly(),
            r_bias: zero_poly(),
            ax_bias: zero_poly(),
            ay_bias: zero_poly(),
            az_bias: zero_poly(),
            ax_scale: unit_poly(),
            ay_scale: unit_poly(),
            az_scale: unit_poly(),
            mag_affine: identity_rows(),
        }
    }
}

/// Temperature-dependent gyro/accel bias and scale plus magnetometer affine
#[derive(Clone, Debug)]
pub struct ImuCalibration {
    file: CalibrationFile,
    mag: AffineMat,
    mag_inv: AffineMat,
}

impl ImuCalibration {
    pub fn from_file_data(file: CalibrationFile) -> std::result::Result<Self, String> {
        let polys = [
            ("p_bias", &file.p_bias),
            ("q_bias", &file.q_bias),
            ("r_bias", &file.r_bias),
            ("ax_bias", &file.ax_bias),
            ("ay_bias", &file.ay_bias),
            ("az_bias", &file.az_bias),
            ("ax_scale", &file.ax_scale),
            ("ay_scale", &file.ay_scale),
            ("az_scale", &file.az_scale),
        ];
        for (name, poly) in polys {
            if poly.is_empty() {
                return Err(format!("{} has no coefficients", name));
            }
            if poly.iter().any(|c| !c.is_finite()) {
                return Err(format!("{} has a non-finite coefficient", name));
            }
        }
        let range = match (file.min_temp, file.max_temp) {
            (Some(lo), Some(hi)) if lo > hi => {
                return Err(format!("min_temp {} exceeds max_temp {}", lo, hi));
            }
            (Some(lo), Some(hi)) => Some((lo, hi)),
            _ => None,
        };
        for (name, poly) in [
            ("ax_scale", &file.ax_scale),
            ("ay_scale", &file.ay_scale),
            ("az_scale", &file.az_scale),
        ] {
            if scale_vanishes(poly, range) {
                return Err(format!("{} reaches zero", name));
            }
        }

        if file.mag_affine[3] != [0.0, 0.0, 0.0, 1.0] {
            return Err(format!(
                "mag_affine bottom row {:?} is not [0, 0, 0, 1]",
                file.mag_affine[3]
            ));
        }
        let mag = affine_from_rows(&file.mag_affine);
        let mag_inv = mag
            .try_inverse()
            .ok_or_else(|| "mag_affine is singular".to_string())?;

        Ok(Self { file, mag, mag_inv })
    }

    /// Load `imucal.json`. Any read or content problem is a
    /// `CalibrationLoad` error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let fail = |message: String| FlightDataError::CalibrationLoad {
            path: PathBuf::from(path),
            message,
        };

        let text = fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        let file: CalibrationFile = serde_json::from_str(&text).map_err(|e| fail(e.to_string()))?;
        let cal = Self::from_file_data(file).map_err(fail)?;
        log::debug!("loaded IMU calibration from {}", path.display());
        Ok(cal)
    }

    pub fn file_data(&self) -> &CalibrationFile {
        &self.file
    }

    /// Temperature used for polynomial evaluation, clamped to the fitted range
    fn eval_temp(&self, temp: f64) -> f64 {
        let mut t = temp;
        if let Some(lo) = self.file.min_temp {
            t = t.max(lo);
        }
        if let Some(hi) = self.file.max_temp {
            t = t.min(hi);
        }
        t
    }

    fn gyro_bias(&self, t: f64) -> AxisVec {
        AxisVec::new(
            polyval(&self.file.p_bias, t),
            polyval(&self.file.q_bias, t),
            polyval(&self.file.r_bias, t),
        )
    }

    fn accel_bias(&self, t: f64) -> AxisVec {
        AxisVec::new(
            polyval(&self.file.ax_bias, t),
            polyval(&self.file.ay_bias, t),
            polyval(&self.file.az_bias, t),
        )
    }

    fn accel_scale(&self, t: f64) -> AxisVec {
        AxisVec::new(
            polyval(&self.file.ax_scale, t),
            polyval(&self.file.ay_scale, t),
            polyval(&self.file.az_scale, t),
        )
    }

    fn with_axes(sample: &ImuSample, gyro: AxisVec, accel: AxisVec, mag: AxisVec) -> ImuSample {
        ImuSample {
            time: sample.time,
            p: gyro.x,
            q: gyro.y,
            r: gyro.z,
            ax: accel.x,
            ay: accel.y,
            az: accel.z,
            hx: mag.x,
            hy: mag.y,
            hz: mag.z,
            temp: sample.temp,
        }
    }
}

impl ImuCorrection for ImuCalibration {
    fn correct(&self, sample: &ImuSample) -> ImuSample {
        let t = self.eval_temp(sample.temp);
        let gyro = sample.gyro() - self.gyro_bias(t);
        let accel = (sample.accel() - self.accel_bias(t)).component_mul(&self.accel_scale(t));
        let mag = apply_affine(&self.mag, sample.mag());
        Self::with_axes(sample, gyro, accel, mag)
    }

    fn back_correct(&self, sample: &ImuSample) -> ImuSample {
        let t = self.eval_temp(sample.temp);
        let gyro = sample.gyro() + self.gyro_bias(t);
        let accel = sample.accel().component_div(&self.accel_scale(t)) + self.accel_bias(t);
        let mag = apply_affine(&self.mag_inv, sample.mag());
        Self::with_axes(sample, gyro, accel, mag)
    }
}
