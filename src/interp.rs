//! Extrapolating piecewise-linear interpolation.
//!
//! Used wherever two source streams share no common clock: the source
//! stream's columns are fitted once and then queried at the master
//! stream's timestamps. Queries outside the fitted range extrapolate along
//! the first or last segment; they never fail.

use ndarray::Array1;

use crate::error::{FlightDataError, Result};

/// Univariate linear interpolator over one source column
#[derive(Clone, Debug)]
pub struct Interp1d {
    xs: Array1<f64>,
    ys: Array1<f64>,
}

impl Interp1d {
    /// Fit a column. Abscissae need not be sorted; they must be finite.
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(FlightDataError::Interp(format!(
                "abscissa/ordinate length mismatch ({} vs {})",
                xs.len(),
                ys.len()
            )));
        }
        if xs.is_empty() {
            return Err(FlightDataError::Interp("empty source series".to_string()));
        }
        if xs.iter().any(|x| !x.is_finite()) {
            return Err(FlightDataError::Interp(
                "non-finite abscissa in source series".to_string(),
            ));
        }

        let mut pairs: Vec<(f64, f64)> = xs.iter().copied().zip(ys.iter().copied()).collect();
        if !xs.windows(2).all(|w| w[0] <= w[1]) {
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        }

        Ok(Self {
            xs: pairs.iter().map(|p| p.0).collect(),
            ys: pairs.iter().map(|p| p.1).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Fitted range (first, last abscissa)
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Value at `x`, extrapolating linearly outside the fitted range
    pub fn sample(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if n == 1 {
            return self.ys[0];
        }

        // Segment [lo, lo + 1] containing x; ends reuse the outer segments
        let upper = self
            .xs
            .as_slice()
            .map(|xs| xs.partition_point(|&v| v <= x))
            .unwrap_or_else(|| self.xs.iter().filter(|&&v| v <= x).count());
        let lo = upper.clamp(1, n - 1) - 1;

        let (x0, x1) = (self.xs[lo], self.xs[lo + 1]);
        let (y0, y1) = (self.ys[lo], self.ys[lo + 1]);
        let dx = x1 - x0;
        if dx == 0.0 {
            return y1;
        }
        y0 + (x - x0) * (y1 - y0) / dx
    }

    /// Batch query for a whole target clock
    pub fn sample_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.sample(x)).collect()
    }

    pub fn sample_array(&self, xs: &Array1<f64>) -> Array1<f64> {
        xs.mapv(|x| self.sample(x))
    }
}

/// Several source columns sharing one clock
#[derive(Clone, Debug)]
pub struct ChannelInterp {
    channels: Vec<Interp1d>,
}

impl ChannelInterp {
    pub fn new(xs: &[f64], columns: &[&[f64]]) -> Result<Self> {
        let channels = columns
            .iter()
            .map(|col| Interp1d::new(xs, col))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { channels })
    }

    pub fn width(&self) -> usize {
        self.channels.len()
    }

    /// All channels at `x`
    pub fn sample(&self, x: f64) -> Vec<f64> {
        self.channels.iter().map(|c| c.sample(x)).collect()
    }

    /// One channel at `x`
    pub fn sample_channel(&self, channel: usize, x: f64) -> f64 {
        self.channels[channel].sample(x)
    }
}

/// Resample every column of a source stream onto target timestamps.
///
/// Returns one output column per input column, each `target.len()` long.
pub fn resample(source_t: &[f64], columns: &[&[f64]], target_t: &[f64]) -> Result<Vec<Vec<f64>>> {
    let interp = ChannelInterp::new(source_t, columns)?;
    Ok(interp
        .channels
        .iter()
        .map(|c| c.sample_many(target_t))
        .collect())
}
