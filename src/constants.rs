//! # Constants and type definitions for astroloci
//!
//! This module centralizes the **angular constants**, **conversion factors**, and **common type
//! definitions** used throughout the `astroloci` library.
//!
//! ## Overview
//!
//! - Angular constants and unit conversions (degrees ↔ radians, arcseconds ↔ radians)
//! - Core type aliases used across the crate
//! - Default numeric guards shared by the solvers and line generators
//!
//! These definitions are used by all main modules, including the paran solvers, the
//! angular-line generators, and the contour extractor.

// -------------------------------------------------------------------------------------------------
// Angular constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Hours → radians
pub const RADH: f64 = DPI / 24.0;

// -------------------------------------------------------------------------------------------------
// Default numeric guards
// -------------------------------------------------------------------------------------------------

/// Default polar guard: latitudes beyond this magnitude are clamped and flagged
/// rather than reported as raw pole values.
pub const DEFAULT_POLAR_GUARD: Radian = 89.999 * RADEG;

/// Default horizon-visibility threshold: the constant refraction offset (−34′)
/// applied when flagging a solved point as visible. Never used for placement.
pub const DEFAULT_HORIZON_ALTITUDE: Radian = -2040.0 * RADSEC;

/// Declinations closer to zero than this switch the ASC/DSC generators to their
/// explicit meridian branch instead of dividing by a near-zero tangent.
pub const DELTA_MERIDIAN_EPS: f64 = 1e-9;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Angle in radians
pub type Radian = f64;

/// Identifier of a celestial body inside one ephemeris snapshot.
///
/// Bodies are labelled by the caller (the ephemeris collaborator) and carried
/// through to every tagged output; the [`BodyBatch`](crate::ephemeris::BodyBatch)
/// arena resolves them to internal indices.
pub type BodyId = u32;

#[cfg(test)]
mod constants_test {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(180.0 * RADEG, std::f64::consts::PI);
        assert_eq!(3600.0 * 180.0 * RADSEC, std::f64::consts::PI);
        assert_eq!(12.0 * RADH, std::f64::consts::PI);
    }

    #[test]
    fn test_guards() {
        assert!(DEFAULT_POLAR_GUARD < std::f64::consts::FRAC_PI_2);
        assert!(DEFAULT_POLAR_GUARD > 89.99 * RADEG);
        // −34 arcminutes
        assert!((DEFAULT_HORIZON_ALTITUDE + 34.0 * 60.0 * RADSEC).abs() < 1e-15);
    }
}
