//! Linear algebra type aliases for calibration and attitude math

use nalgebra::{SMatrix, SVector};

// ===== Homogeneous Dimensions =====
pub const AFFINE_DIM: usize = 4;
pub const AXIS_DIM: usize = 3;

/// 4x4 affine transform applied to homogeneous sensor triples
pub type AffineMat = SMatrix<f64, AFFINE_DIM, AFFINE_DIM>;
/// [x, y, z, 1]
pub type HomogeneousVec = SVector<f64, AFFINE_DIM>;
/// Plain 3-axis sensor vector
pub type AxisVec = SVector<f64, AXIS_DIM>;

/// Row-major nested array as stored in JSON profiles and calibration files
pub type AffineRows = [[f64; AFFINE_DIM]; AFFINE_DIM];

pub fn affine_from_rows(rows: &AffineRows) -> AffineMat {
    AffineMat::from_fn(|r, c| rows[r][c])
}

pub fn affine_to_rows(m: &AffineMat) -> AffineRows {
    let mut rows = [[0.0; AFFINE_DIM]; AFFINE_DIM];
    for (r, row) in rows.iter_mut().enumerate() {
        for (c, value) in row.iter_mut().enumerate() {
            *value = m[(r, c)];
        }
    }
    rows
}

/// Apply an affine transform to a 3-axis triple
pub fn apply_affine(m: &AffineMat, v: AxisVec) -> AxisVec {
    let out = m * HomogeneousVec::new(v.x, v.y, v.z, 1.0);
    AxisVec::new(out[0], out[1], out[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_roundtrip_layout() {
        let rows: AffineRows = [
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let m = affine_from_rows(&rows);
        // Row-major: (0, 3) is the x offset
        assert_eq!(m[(0, 3)], 4.0);
        assert_eq!(m[(2, 0)], 9.0);
        assert_eq!(affine_to_rows(&m), rows);
    }

    #[test]
    fn test_apply_affine_offset() {
        let mut m = AffineMat::identity();
        m[(0, 3)] = 0.5;
        let out = apply_affine(&m, AxisVec::new(1.0, 2.0, 3.0));
        assert_eq!(out, AxisVec::new(1.5, 2.0, 3.0));
    }
}
