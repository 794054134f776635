//! 1D spectra with absolute errors, as projected from the 2D grid.

use serde::{Deserialize, Serialize};

use crate::error::{HistError, Result};
use crate::histogram::Histogram2D;

/// Points `(x, y ± y_err)`. `x` holds bin centers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum1D {
    /// Spectrum name.
    pub name: String,
    /// Bin centers.
    pub x: Vec<f64>,
    /// Values.
    pub y: Vec<f64>,
    /// Absolute errors.
    pub y_err: Vec<f64>,
}

impl Spectrum1D {
    /// Build from columns of equal length.
    pub fn new(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>, y_err: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if x.len() != y.len() || x.len() != y_err.len() {
            return Err(HistError::InvalidBinning(format!(
                "'{name}': column lengths x={}, y={}, y_err={}",
                x.len(),
                y.len(),
                y_err.len()
            )));
        }
        Ok(Self { name, x, y, y_err })
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether there are no points.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Fractional error of point `i`; zero where `y == 0`.
    pub fn ferr(&self, i: usize) -> f64 {
        if self.y[i] != 0.0 { self.y_err[i] / self.y[i] } else { 0.0 }
    }

    /// All fractional errors.
    pub fn ferrs(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.ferr(i)).collect()
    }

    /// Regroup points into `bins` equal bins over `[lo, hi]`.
    ///
    /// Points outside the closed range are dropped, and a point on `hi` goes
    /// to the last bin. Values add and errors add in quadrature.
    pub fn rebin(&self, range: (f64, f64), bins: usize) -> Result<Self> {
        let (lo, hi) = range;
        if bins == 0 || !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(HistError::InvalidBinning(format!(
                "'{}': cannot rebin into {bins} bins over [{lo}, {hi}]",
                self.name
            )));
        }
        let width = (hi - lo) / bins as f64;
        let mut y = vec![0.0; bins];
        let mut err2 = vec![0.0; bins];
        for i in 0..self.len() {
            let xi = self.x[i];
            if !(xi >= lo && xi <= hi) {
                continue;
            }
            let b = (((xi - lo) / width) as usize).min(bins - 1);
            y[b] += self.y[i];
            err2[b] += self.y_err[i] * self.y_err[i];
        }
        let x = (0..bins).map(|b| lo + (b as f64 + 0.5) * width).collect();
        Ok(Self {
            name: self.name.clone(),
            x,
            y,
            y_err: err2.into_iter().map(f64::sqrt).collect(),
        })
    }

    fn check_x(&self, other: &Spectrum1D) -> Result<()> {
        if self.x == other.x {
            Ok(())
        } else {
            Err(HistError::BinningMismatch { left: self.name.clone(), right: other.name.clone() })
        }
    }

    /// Point-wise `self * other`; fractional errors add in quadrature.
    pub fn product(&self, other: &Spectrum1D, name: impl Into<String>) -> Result<Self> {
        self.check_x(other)?;
        let y: Vec<f64> = self.y.iter().zip(&other.y).map(|(a, b)| a * b).collect();
        let y_err = combine_ferr(&y, self, other);
        Self::new(name, self.x.clone(), y, y_err)
    }

    /// Point-wise `self / other`, zero where `other` is zero; fractional
    /// errors add in quadrature.
    pub fn ratio(&self, other: &Spectrum1D, name: impl Into<String>) -> Result<Self> {
        self.check_x(other)?;
        let y: Vec<f64> = self
            .y
            .iter()
            .zip(&other.y)
            .map(|(a, b)| if *b != 0.0 { a / b } else { 0.0 })
            .collect();
        let y_err = combine_ferr(&y, self, other);
        Self::new(name, self.x.clone(), y, y_err)
    }
}

fn combine_ferr(y: &[f64], a: &Spectrum1D, b: &Spectrum1D) -> Vec<f64> {
    y.iter().enumerate().map(|(i, v)| v * a.ferr(i).hypot(b.ferr(i))).collect()
}

impl Histogram2D {
    /// Sum over the x bins whose center lies in `[lo, hi]`, as a spectrum
    /// along y. Errors add in quadrature.
    pub fn project_y(&self, x_window: (f64, f64), name: impl Into<String>) -> Spectrum1D {
        let (lo, hi) = x_window;
        let (xa, ya) = (*self.x_axis(), *self.y_axis());
        let columns: Vec<usize> = (0..xa.n_bins)
            .filter(|&ix| {
                let c = xa.center(ix);
                c >= lo && c <= hi
            })
            .collect();
        let mut y = Vec::with_capacity(ya.n_bins);
        let mut y_err = Vec::with_capacity(ya.n_bins);
        for iy in 0..ya.n_bins {
            y.push(columns.iter().map(|&ix| self.content(ix, iy)).sum());
            y_err.push(columns.iter().map(|&ix| self.sumw2(ix, iy)).sum::<f64>().sqrt());
        }
        Spectrum1D { name: name.into(), x: (0..ya.n_bins).map(|i| ya.center(i)).collect(), y, y_err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::{PT_AXIS, RAPIDITY_AXIS};
    use approx::assert_relative_eq;

    fn spectrum(name: &str, y: &[f64], err: &[f64]) -> Spectrum1D {
        let x = (0..y.len()).map(|i| i as f64 + 0.5).collect();
        Spectrum1D::new(name, x, y.to_vec(), err.to_vec()).unwrap()
    }

    #[test]
    fn project_sums_window_columns() {
        let mut h = Histogram2D::spectra("h");
        h.fill(0.405, 100.5, 2.0);
        h.fill(0.415, 100.5, 1.0);
        h.fill(0.905, 100.5, 7.0);
        let s = h.project_y((0.4, 0.6), "p");
        assert_eq!(s.len(), PT_AXIS.n_bins);
        assert_relative_eq!(s.y[100], 3.0);
        assert_relative_eq!(s.y_err[100], 5.0f64.sqrt());
        assert_relative_eq!(s.x[100], 100.5);
        assert_eq!(s.y.iter().sum::<f64>(), 3.0);

        let all = h.project_y((RAPIDITY_AXIS.min, RAPIDITY_AXIS.max), "p");
        assert_relative_eq!(all.y[100], 10.0);
    }

    #[test]
    fn rebin_adds_values_and_errors_in_quadrature() {
        let s = spectrum("p", &[1.0, 2.0, 3.0, 4.0], &[0.3, 0.4, 1.0, 0.0]);
        let r = s.rebin((0.0, 4.0), 2).unwrap();
        assert_eq!(r.x, vec![1.0, 3.0]);
        assert_eq!(r.y, vec![3.0, 7.0]);
        assert_relative_eq!(r.y_err[0], 0.5);
        assert_relative_eq!(r.y_err[1], 1.0);

        // Points outside [lo, hi] are dropped.
        let r = s.rebin((1.0, 3.0), 1).unwrap();
        assert_eq!(r.y, vec![5.0]);
        assert!(s.rebin((2.0, 2.0), 1).is_err());
        assert!(s.rebin((0.0, 4.0), 0).is_err());
    }

    #[test]
    fn rebin_puts_upper_edge_in_last_bin() {
        let s = Spectrum1D::new("p", vec![0.0, 4.0], vec![1.0, 2.0], vec![0.0, 0.0]).unwrap();
        assert_eq!(s.rebin((0.0, 4.0), 2).unwrap().y, vec![1.0, 2.0]);
    }

    #[test]
    fn product_and_ratio_propagate_fractional_errors() {
        let a = spectrum("a", &[2.0, 0.0], &[0.2, 0.1]);
        let b = spectrum("b", &[4.0, 5.0], &[0.4, 0.5]);

        let p = a.product(&b, "a*b").unwrap();
        assert_eq!(p.y, vec![8.0, 0.0]);
        assert_relative_eq!(p.ferr(0), 0.02f64.sqrt(), epsilon = 1e-12);
        assert_eq!(p.y_err[1], 0.0);

        let r = a.ratio(&b, "a/b").unwrap();
        assert_relative_eq!(r.y[0], 0.5);
        assert_relative_eq!(r.y_err[0], 0.5 * 0.02f64.sqrt(), epsilon = 1e-12);

        // Zero denominator gives zero, not inf.
        let z = b.ratio(&a, "b/a").unwrap();
        assert_eq!(z.y[1], 0.0);
        assert_eq!(z.ferr(1), 0.0);
    }

    #[test]
    fn mismatched_points_are_rejected() {
        let a = spectrum("a", &[1.0, 2.0], &[0.0, 0.0]);
        let b = spectrum("b", &[1.0, 2.0, 3.0], &[0.0; 3]);
        assert!(matches!(a.ratio(&b, "r"), Err(HistError::BinningMismatch { .. })));
        assert!(Spectrum1D::new("bad", vec![0.0], vec![], vec![]).is_err());
    }
}
