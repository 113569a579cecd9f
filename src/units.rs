//! Unit and angle conventions shared by every adapter.
//!
//! Normalized streams use radians for angles and positions, m/s for
//! velocities, knots for airspeed and seconds for time.

use std::f64::consts::PI;

pub const R2D: f64 = 180.0 / PI;
pub const D2R: f64 = PI / 180.0;
pub const MPS2KT: f64 = 1.94384;
pub const M2FT: f64 = 1.0 / 0.3048;
pub const US_PER_SEC: f64 = 1e6;

/// Quaternions with a smaller norm are used as-is instead of being normalized
const QUAT_NORM_EPS: f64 = 1e-6;

/// Microsecond counter to seconds
pub fn micros_to_secs(us: f64) -> f64 {
    us / US_PER_SEC
}

/// Wrap a heading in degrees into (-180, 180]
pub fn wrap_heading_deg(psi_deg: f64) -> f64 {
    180.0 - (180.0 - psi_deg).rem_euclid(360.0)
}

/// Quaternion (w, x, y, z) to (roll, pitch, yaw) in radians
pub fn quat_to_euler(q: [f64; 4]) -> (f64, f64, f64) {
    let norm = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
    let [w, x, y, z] = if norm > QUAT_NORM_EPS {
        [q[0] / norm, q[1] / norm, q[2] / norm, q[3] / norm]
    } else {
        q
    };

    let phi = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
    let the = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0).asin();
    let psi = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));
    (phi, the, psi)
}

/// North/east wind components (m/s) to (direction the wind blows from in
/// degrees, speed in knots)
pub fn wind_from_ne(wn: f64, we: f64) -> (f64, f64) {
    let dir_deg = 90.0 - (-wn).atan2(-we) * R2D;
    let speed_kt = (we * we + wn * wn).sqrt() * MPS2KT;
    (dir_deg, speed_kt)
}
