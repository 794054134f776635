//! Fixed-grid weighted 2D histogram.

use serde::{Deserialize, Serialize};

use crate::error::{HistError, Result};

/// A uniform axis: `n_bins` equal bins over `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// Number of bins (excluding under/overflow).
    pub n_bins: usize,
    /// Lower edge of first bin.
    pub min: f64,
    /// Upper edge of last bin.
    pub max: f64,
}

/// Normalized lab rapidity `y_lab / y_beam`.
pub const RAPIDITY_AXIS: Axis = Axis::new(100, 0.0, 1.0);

/// Transverse momentum in MeV/c.
pub const PT_AXIS: Axis = Axis::new(600, 0.0, 600.0);

impl Axis {
    /// Create an axis.
    pub const fn new(n_bins: usize, min: f64, max: f64) -> Self {
        Self { n_bins, min, max }
    }

    /// Bin width.
    #[inline]
    pub fn width(&self) -> f64 {
        (self.max - self.min) / self.n_bins as f64
    }

    /// Bin index containing `v`, or `None` for non-finite, underflow or overflow.
    ///
    /// The upper edge is exclusive, as for every bin.
    #[inline]
    pub fn find_bin(&self, v: f64) -> Option<usize> {
        if !v.is_finite() || v < self.min || v >= self.max {
            return None;
        }
        let i = ((v - self.min) / self.width()) as usize;
        (i < self.n_bins).then_some(i)
    }

    /// Center of bin `i`.
    #[inline]
    pub fn center(&self, i: usize) -> f64 {
        self.min + (i as f64 + 0.5) * self.width()
    }

    /// Bin edges (length = n_bins + 1).
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.n_bins).map(|i| self.min + i as f64 * self.width()).collect()
    }
}

/// Weighted 2D histogram storing per-bin `Σw` and `Σw²`.
///
/// Storage is row-major in `x`: bin `(ix, iy)` lives at `iy * nx + ix`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram2D {
    /// Histogram name.
    pub name: String,
    x: Axis,
    y: Axis,
    sumw: Vec<f64>,
    sumw2: Vec<f64>,
    entries: u64,
}

impl Histogram2D {
    /// Empty histogram over `x × y`.
    pub fn new(name: impl Into<String>, x: Axis, y: Axis) -> Self {
        let n = x.n_bins * y.n_bins;
        Self { name: name.into(), x, y, sumw: vec![0.0; n], sumw2: vec![0.0; n], entries: 0 }
    }

    /// Rebuild from row-major contents and errors, e.g. as read back from disk.
    /// Entry counts are not stored there and start at zero.
    pub fn from_parts(
        name: impl Into<String>,
        x: Axis,
        y: Axis,
        contents: Vec<f64>,
        errors: &[f64],
    ) -> Result<Self> {
        let name = name.into();
        let n = x.n_bins * y.n_bins;
        if contents.len() != n || errors.len() != n {
            return Err(HistError::InvalidBinning(format!(
                "'{name}': expected {n} bins, got {} contents and {} errors",
                contents.len(),
                errors.len()
            )));
        }
        let sumw2 = errors.iter().map(|e| e * e).collect();
        Ok(Self { name, x, y, sumw: contents, sumw2, entries: 0 })
    }

    /// Empty histogram on the spectra grid (normalized rapidity × pt).
    pub fn spectra(name: impl Into<String>) -> Self {
        Self::new(name, RAPIDITY_AXIS, PT_AXIS)
    }

    /// x axis.
    pub fn x_axis(&self) -> &Axis {
        &self.x
    }

    /// y axis.
    pub fn y_axis(&self) -> &Axis {
        &self.y
    }

    /// Number of accepted fills.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    #[inline]
    fn index(&self, ix: usize, iy: usize) -> usize {
        iy * self.x.n_bins + ix
    }

    /// Add `weight` at `(x, y)`.
    ///
    /// Entries outside the grid, or with a non-finite coordinate, are
    /// dropped. Returns whether the entry landed in a bin.
    pub fn fill(&mut self, x: f64, y: f64, weight: f64) -> bool {
        let (Some(ix), Some(iy)) = (self.x.find_bin(x), self.y.find_bin(y)) else {
            return false;
        };
        let i = self.index(ix, iy);
        self.sumw[i] += weight;
        self.sumw2[i] += weight * weight;
        self.entries += 1;
        true
    }

    /// `Σw` in bin `(ix, iy)`.
    pub fn content(&self, ix: usize, iy: usize) -> f64 {
        self.sumw[self.index(ix, iy)]
    }

    /// `Σw²` in bin `(ix, iy)`.
    pub fn sumw2(&self, ix: usize, iy: usize) -> f64 {
        self.sumw2[self.index(ix, iy)]
    }

    /// Statistical error `sqrt(Σw²)` of bin `(ix, iy)`.
    pub fn error(&self, ix: usize, iy: usize) -> f64 {
        self.sumw2(ix, iy).sqrt()
    }

    /// All bin contents, row-major.
    pub fn contents(&self) -> &[f64] {
        &self.sumw
    }

    /// All bin errors, row-major.
    pub fn errors(&self) -> Vec<f64> {
        self.sumw2.iter().map(|s| s.sqrt()).collect()
    }

    /// Sum of all bin contents.
    pub fn integral(&self) -> f64 {
        self.sumw.iter().sum()
    }

    /// Whether `other` uses the same grid.
    pub fn same_binning(&self, other: &Histogram2D) -> bool {
        self.x == other.x && self.y == other.y
    }

    fn check_binning(&self, other: &Histogram2D) -> Result<()> {
        if self.same_binning(other) {
            Ok(())
        } else {
            Err(HistError::BinningMismatch { left: self.name.clone(), right: other.name.clone() })
        }
    }

    /// Divide every bin by `scale`: `Σw /= s`, `Σw² /= s²`, so errors scale as `1/s`.
    pub fn normalize(&mut self, scale: f64) -> Result<()> {
        if !(scale.is_finite() && scale != 0.0) {
            return Err(HistError::InvalidScale { name: self.name.clone(), scale });
        }
        let inv = 1.0 / scale;
        let inv2 = inv * inv;
        self.sumw.iter_mut().for_each(|w| *w *= inv);
        self.sumw2.iter_mut().for_each(|w2| *w2 *= inv2);
        Ok(())
    }

    /// Overwrite every bin's error with the error of the same bin in `source`.
    pub fn replace_errors(&mut self, source: &Histogram2D) -> Result<()> {
        self.check_binning(source)?;
        self.sumw2.copy_from_slice(&source.sumw2);
        Ok(())
    }

    /// Bin-wise sum of `other` into `self`.
    pub fn merge(&mut self, other: &Histogram2D) -> Result<()> {
        self.check_binning(other)?;
        for (a, b) in self.sumw.iter_mut().zip(&other.sumw) {
            *a += b;
        }
        for (a, b) in self.sumw2.iter_mut().zip(&other.sumw2) {
            *a += b;
        }
        self.entries += other.entries;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn small(name: &str) -> Histogram2D {
        Histogram2D::new(name, Axis::new(4, 0.0, 1.0), Axis::new(3, 0.0, 30.0))
    }

    #[test]
    fn find_bin_edge_cases() {
        let ax = Axis::new(3, 0.0, 3.0);
        assert_eq!(ax.find_bin(-0.5), None);
        assert_eq!(ax.find_bin(3.0), None);
        assert_eq!(ax.find_bin(0.0), Some(0));
        assert_eq!(ax.find_bin(1.0), Some(1));
        assert_eq!(ax.find_bin(2.99), Some(2));
        assert_eq!(ax.find_bin(f64::NAN), None);
        assert_eq!(ax.find_bin(f64::INFINITY), None);
    }

    #[test]
    fn spectra_grid_constants() {
        let h = Histogram2D::spectra("h");
        assert_eq!(h.x_axis().n_bins, 100);
        assert_eq!(h.y_axis().n_bins, 600);
        assert_eq!(h.contents().len(), 60_000);
        assert_relative_eq!(PT_AXIS.width(), 1.0);
        assert_eq!(RAPIDITY_AXIS.edges().len(), 101);
    }

    #[test]
    fn fill_with_weight() {
        let mut h = small("h");
        assert!(h.fill(0.1, 5.0, 2.0));
        assert!(h.fill(0.1, 5.0, 3.0));
        assert!(h.fill(0.9, 25.0, 1.0));
        assert_eq!(h.content(0, 0), 5.0);
        assert_eq!(h.sumw2(0, 0), 13.0);
        assert_eq!(h.content(3, 2), 1.0);
        assert_eq!(h.entries(), 3);
    }

    #[test]
    fn out_of_range_and_non_finite_are_dropped() {
        let mut h = small("h");
        assert!(!h.fill(1.0, 5.0, 1.0));
        assert!(!h.fill(0.5, -1.0, 1.0));
        assert!(!h.fill(f64::NAN, 5.0, 1.0));
        assert!(!h.fill(0.5, f64::NEG_INFINITY, 1.0));
        assert_eq!(h.integral(), 0.0);
        assert!(h.contents().iter().all(|v| v.is_finite()));
        assert_eq!(h.entries(), 0);
    }

    #[test]
    fn normalize_scales_content_and_error() {
        let mut h = small("h");
        h.fill(0.3, 12.0, 4.0);
        h.normalize(2.0).unwrap();
        assert_relative_eq!(h.content(1, 1), 2.0);
        assert_relative_eq!(h.error(1, 1), 2.0);
        assert!(h.normalize(0.0).is_err());
        assert!(h.normalize(f64::NAN).is_err());
    }

    #[test]
    fn replace_errors_copies_source_errors() {
        let mut value = small("value");
        let mut source = small("source");
        value.fill(0.3, 12.0, 0.5);
        value.fill(0.3, 12.0, 0.5);
        source.fill(0.3, 12.0, 1.0);
        value.replace_errors(&source).unwrap();
        assert_relative_eq!(value.content(1, 1), 1.0);
        assert_relative_eq!(value.error(1, 1), 1.0);

        let other = Histogram2D::spectra("other");
        assert!(matches!(value.replace_errors(&other), Err(HistError::BinningMismatch { .. })));
    }

    #[test]
    fn merge_adds_binwise() {
        let mut a = small("a");
        let mut b = small("b");
        a.fill(0.3, 12.0, 1.0);
        b.fill(0.3, 12.0, 2.0);
        b.fill(0.6, 1.0, 1.0);
        a.merge(&b).unwrap();
        assert_eq!(a.content(1, 1), 3.0);
        assert_eq!(a.sumw2(1, 1), 5.0);
        assert_eq!(a.entries(), 3);
        assert_eq!(a.integral(), 4.0);
    }

    #[test]
    fn from_parts_restores_contents_and_errors() {
        let mut h = small("h");
        h.fill(0.3, 12.0, 3.0);
        h.fill(0.3, 12.0, 4.0);
        let back =
            Histogram2D::from_parts("h", *h.x_axis(), *h.y_axis(), h.contents().to_vec(), &h.errors())
                .unwrap();
        assert_eq!(back.content(1, 1), 7.0);
        assert_relative_eq!(back.sumw2(1, 1), 25.0, epsilon = 1e-12);
        assert!(Histogram2D::from_parts("bad", *h.x_axis(), *h.y_axis(), vec![0.0; 3], &[]).is_err());
    }

    proptest! {
        #[test]
        fn prop_weight_is_conserved(
            fills in prop::collection::vec((0.0f64..1.0, 0.0f64..30.0, 0.0f64..5.0), 0..200)
        ) {
            let mut h = small("h");
            let mut total = 0.0;
            for (x, y, w) in &fills {
                h.fill(*x, *y, *w);
                total += w;
            }
            prop_assert!((h.integral() - total).abs() <= 1e-9 * (1.0 + total));
        }

        #[test]
        fn prop_normalize_divides_content(s in prop::num::f64::NORMAL, w in 0.1f64..10.0) {
            prop_assume!(s.abs() > 1e-100 && s.abs() < 1e100);
            let mut h = small("h");
            h.fill(0.5, 15.0, w);
            let before = h.content(2, 1);
            h.normalize(s).unwrap();
            prop_assert!((h.content(2, 1) - before / s).abs() <= 1e-12 * (before / s).abs());
        }
    }
}
