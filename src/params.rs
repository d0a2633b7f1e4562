//! # Loci computation parameters
//!
//! This module defines the [`LociParams`] configuration struct and its builder,
//! which control the numeric guards of the paran solvers, the sampling density
//! of the line generators, and the grid/refinement trade-off of the aspect
//! contour extractor.
//!
//! ## Purpose
//!
//! [`LociParams`] centralizes every tunable the core exposes. It allows you to:
//!
//! - Move the polar guard (the clamp-and-flag boundary near the poles),
//! - Tighten or relax the root-finder tolerance and iteration budget,
//! - Choose the longitude sweep step for ASC/DSC curves,
//! - Choose the contour grid resolution and edge-refinement tolerance —
//!   the one place in the crate with inherent approximation, so the
//!   accuracy/performance trade-off is an explicit parameter and not a
//!   hard-coded constant,
//! - Set the visibility altitude threshold (the constant refraction offset),
//! - Size the row chunks between cancellation checks on long contour runs.
//!
//! ## Example
//!
//! ```rust,no_run
//! use astroloci::params::LociParams;
//!
//! let params = LociParams::builder()
//!     .grid_step_deg(0.25)
//!     .refine_tol(5e-7)
//!     .max_iter(200)
//!     .build()
//!     .unwrap();
//! ```

use crate::astroloci_errors::AstroLociError;
use crate::constants::{
    Degree, Radian, DEFAULT_HORIZON_ALTITUDE, DEFAULT_POLAR_GUARD, RADEG,
};
use std::cmp::Ordering::Greater;
use std::f64::consts::FRAC_PI_2;
use std::fmt;

/// Configuration parameters for the paran solvers and line generators.
///
/// Fields
/// -----------------
/// **Numeric guards**
/// * `polar_guard` – latitudes beyond this magnitude are clamped to the guard
///   and flagged `pole_limited` (solvers) or excluded (grids/curves).
/// * `numeric_tol` – convergence tolerance of the bracketed root-finder
///   (radians on latitude).
/// * `max_iter` – iteration cap for Brent/bisection, so no single pair can
///   stall a batch.
/// * `newton_polish` – apply one guarded Newton step after bracket
///   convergence.
/// * `scan_samples` – samples per defined sub-interval when scanning the
///   horizon–horizon residual for sign changes.
///
/// **Sampling / contour**
/// * `lon_step_deg` – longitude step of the ASC/DSC curve sweep.
/// * `grid_step_deg` – lat–lon resolution of the aspect contour grid.
/// * `refine_tol` – tolerance of the per-edge bisection refinement
///   (radians on the residual's argument).
/// * `chunk_rows` – grid rows evaluated between cancellation checks.
///
/// **Visibility**
/// * `horizon_altitude` – altitude threshold used by the visibility filter;
///   defaults to the constant refraction offset (−34′). Never changes a
///   solved latitude.
///
/// Defaults
/// -----------------
/// ```rust,no_run
/// use astroloci::params::LociParams;
/// let params = LociParams::default();
/// ```
///
/// * `polar_guard`: 89.999°
/// * `numeric_tol`: 1e−8 rad
/// * `max_iter`: 100
/// * `newton_polish`: true
/// * `scan_samples`: 64
/// * `lon_step_deg`: 0.5°
/// * `grid_step_deg`: 0.5°
/// * `refine_tol`: 1e−6 rad
/// * `chunk_rows`: 32
/// * `horizon_altitude`: −34′
#[derive(Debug, Clone)]
pub struct LociParams {
    // --- Numeric guards ---
    pub polar_guard: Radian,
    pub numeric_tol: Radian,
    pub max_iter: usize,
    pub newton_polish: bool,
    pub scan_samples: usize,

    // --- Sampling / contour ---
    pub lon_step_deg: Degree,
    pub grid_step_deg: Degree,
    pub refine_tol: Radian,
    pub chunk_rows: usize,

    // --- Visibility ---
    pub horizon_altitude: Radian,
}

impl LociParams {
    /// Construct a new [`LociParams`] with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fluent [`LociParamsBuilder`].
    pub fn builder() -> LociParamsBuilder {
        LociParamsBuilder::new()
    }

    /// Polar guard expressed in degrees, for display and grid sizing.
    pub fn polar_guard_deg(&self) -> Degree {
        self.polar_guard / RADEG
    }
}

impl Default for LociParams {
    fn default() -> Self {
        LociParams {
            polar_guard: DEFAULT_POLAR_GUARD,
            numeric_tol: 1e-8,
            max_iter: 100,
            newton_polish: true,
            scan_samples: 64,

            lon_step_deg: 0.5,
            grid_step_deg: 0.5,
            refine_tol: 1e-6,
            chunk_rows: 32,

            horizon_altitude: DEFAULT_HORIZON_ALTITUDE,
        }
    }
}

/// Builder for [`LociParams`], with validation.
#[derive(Debug, Clone)]
pub struct LociParamsBuilder {
    params: LociParams,
}

impl Default for LociParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LociParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: LociParams::default(),
        }
    }

    pub fn polar_guard(mut self, v: Radian) -> Self {
        self.params.polar_guard = v;
        self
    }
    pub fn numeric_tol(mut self, v: Radian) -> Self {
        self.params.numeric_tol = v;
        self
    }
    pub fn max_iter(mut self, v: usize) -> Self {
        self.params.max_iter = v;
        self
    }
    pub fn newton_polish(mut self, v: bool) -> Self {
        self.params.newton_polish = v;
        self
    }
    pub fn scan_samples(mut self, v: usize) -> Self {
        self.params.scan_samples = v;
        self
    }
    pub fn lon_step_deg(mut self, v: Degree) -> Self {
        self.params.lon_step_deg = v;
        self
    }
    pub fn grid_step_deg(mut self, v: Degree) -> Self {
        self.params.grid_step_deg = v;
        self
    }
    pub fn refine_tol(mut self, v: Radian) -> Self {
        self.params.refine_tol = v;
        self
    }
    pub fn chunk_rows(mut self, v: usize) -> Self {
        self.params.chunk_rows = v;
        self
    }
    pub fn horizon_altitude(mut self, v: Radian) -> Self {
        self.params.horizon_altitude = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff x is comparable and finite (i.e., not NaN or ±∞).
    #[inline]
    fn finite(x: f64) -> bool {
        x.is_finite()
    }

    /// Finalize the builder and produce a [`LociParams`] instance.
    ///
    /// Validation rules
    /// -----------------
    /// * `0 < polar_guard < π/2`.
    /// * `numeric_tol > 0`, `refine_tol > 0`.
    /// * `max_iter ≥ 1`, `scan_samples ≥ 2`, `chunk_rows ≥ 1`.
    /// * `lon_step_deg` and `grid_step_deg` in (0, 10].
    /// * `horizon_altitude` finite (negative values model refraction/dip).
    ///
    /// Return
    /// ------
    /// * `Ok(LociParams)` when every rule holds,
    /// * `Err(AstroLociError::InvalidParameter)` naming the first violation.
    pub fn build(self) -> Result<LociParams, AstroLociError> {
        let p = &self.params;

        if !(Self::gt0(p.polar_guard) && p.polar_guard < FRAC_PI_2) {
            return Err(AstroLociError::InvalidParameter(
                "polar_guard must be in (0, pi/2)".into(),
            ));
        }
        if !Self::gt0(p.numeric_tol) {
            return Err(AstroLociError::InvalidParameter(
                "numeric_tol must be > 0".into(),
            ));
        }
        if !Self::gt0(p.refine_tol) {
            return Err(AstroLociError::InvalidParameter(
                "refine_tol must be > 0".into(),
            ));
        }
        if p.max_iter == 0 {
            return Err(AstroLociError::InvalidParameter(
                "max_iter must be >= 1".into(),
            ));
        }
        if p.scan_samples < 2 {
            return Err(AstroLociError::InvalidParameter(
                "scan_samples must be >= 2".into(),
            ));
        }
        if p.chunk_rows == 0 {
            return Err(AstroLociError::InvalidParameter(
                "chunk_rows must be >= 1".into(),
            ));
        }
        for (v, name) in [
            (p.lon_step_deg, "lon_step_deg"),
            (p.grid_step_deg, "grid_step_deg"),
        ] {
            if !(Self::gt0(v) && v <= 10.0) {
                return Err(AstroLociError::InvalidParameter(format!(
                    "{name} must be in (0, 10] degrees"
                )));
            }
        }
        if !Self::finite(p.horizon_altitude) {
            return Err(AstroLociError::InvalidParameter(
                "horizon_altitude must be finite".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for LociParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 42;
            writeln!(f, "Loci Computation Parameters")?;
            writeln!(f, "---------------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            writeln!(f, "[Numeric guards]")?;
            line!(
                "polar_guard      = {:.4} deg",
                self.polar_guard_deg(),
                "Clamp-and-flag latitude boundary"
            )?;
            line!(
                "numeric_tol      = {:.1e} rad",
                self.numeric_tol,
                "Root-finder convergence tolerance"
            )?;
            line!("max_iter         = {}", self.max_iter, "Root-finder iteration cap")?;
            line!(
                "newton_polish    = {}",
                self.newton_polish,
                "One guarded Newton refinement step"
            )?;
            line!(
                "scan_samples     = {}",
                self.scan_samples,
                "Sign-change scan density per sub-interval"
            )?;

            writeln!(f, "\n[Sampling / contour]")?;
            line!(
                "lon_step_deg     = {:.3} deg",
                self.lon_step_deg,
                "ASC/DSC longitude sweep step"
            )?;
            line!(
                "grid_step_deg    = {:.3} deg",
                self.grid_step_deg,
                "Aspect contour grid resolution"
            )?;
            line!(
                "refine_tol       = {:.1e} rad",
                self.refine_tol,
                "Contour edge-bisection tolerance"
            )?;
            line!(
                "chunk_rows       = {}",
                self.chunk_rows,
                "Grid rows between cancellation checks"
            )?;

            writeln!(f, "\n[Visibility]")?;
            line!(
                "horizon_altitude = {:.6} rad",
                self.horizon_altitude,
                "Altitude threshold (refraction offset)"
            )?;

            Ok(())
        } else {
            write!(
                f,
                "LociParams(guard={:.3}deg, tol={:.0e}, max_iter={}, grid={:.2}deg, refine={:.0e})",
                self.polar_guard_deg(),
                self.numeric_tol,
                self.max_iter,
                self.grid_step_deg,
                self.refine_tol,
            )
        }
    }
}

#[cfg(test)]
mod params_test {
    use super::*;

    #[test]
    fn test_defaults_build() {
        let p = LociParams::builder().build().unwrap();
        assert_eq!(p.max_iter, 100);
        assert_eq!(p.numeric_tol, 1e-8);
        assert!((p.polar_guard_deg() - 89.999).abs() < 1e-12);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            LociParams::builder().numeric_tol(0.0).build(),
            Err(AstroLociError::InvalidParameter(_))
        ));
        assert!(matches!(
            LociParams::builder().polar_guard(2.0).build(),
            Err(AstroLociError::InvalidParameter(_))
        ));
        assert!(matches!(
            LociParams::builder().grid_step_deg(11.0).build(),
            Err(AstroLociError::InvalidParameter(_))
        ));
        assert!(matches!(
            LociParams::builder().grid_step_deg(f64::NAN).build(),
            Err(AstroLociError::InvalidParameter(_))
        ));
        assert!(matches!(
            LociParams::builder().scan_samples(1).build(),
            Err(AstroLociError::InvalidParameter(_))
        ));
        assert!(matches!(
            LociParams::builder().chunk_rows(0).build(),
            Err(AstroLociError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_display() {
        let p = LociParams::default();
        let pretty = format!("{p:#}");
        assert!(pretty.contains("polar_guard"));
        assert!(pretty.contains("Aspect contour grid resolution"));
        let compact = format!("{p}");
        assert!(compact.starts_with("LociParams("));
    }
}
