//! # Single-body angular lines
//!
//! MC/IC loci are meridians: at the instant, a body culminates on the single
//! geographic longitude where the local sidereal time equals its right
//! ascension (plus π for IC), at every latitude. No sampling is needed.
//!
//! ASC/DSC loci couple longitude and latitude: sweeping the longitude fixes
//! the local hour angle H = θ_G + λ_E − α, and the latitude of the horizon
//! crossing follows from cos H = −tan φ · tan δ. The branch is read off
//! sin H (negative east of the meridian → rising, positive → setting), and a
//! near-zero declination degenerates the curve into the fixed H = ±π/2
//! meridians — handled by switching branch explicitly, never by dividing by
//! a vanishing tangent.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::angles::wrap_pm_pi;
use crate::astroloci_errors::AstroLociError;
use crate::constants::{BodyId, DELTA_MERIDIAN_EPS, RADEG};
use crate::ephemeris::BodyBatch;
use crate::lines::{AngularLine, GeoPoint, Locus};
use crate::params::LociParams;
use crate::paran::AngleKind;

/// Generate the angular line of one body for one angle.
///
/// Arguments
/// ---------
/// * `batch`: validated ephemeris arena.
/// * `body`: the body whose locus is requested.
/// * `angle`: which angle the body stands on along the locus.
/// * `params`: longitude sweep step and polar guard.
///
/// Return
/// ------
/// * [`Locus::Meridian`] for MC/IC (and for ASC/DSC of an equatorial body),
///   [`Locus::Curve`] otherwise, wrapped in a tagged [`AngularLine`].
pub fn angular_line(
    batch: &BodyBatch,
    body: BodyId,
    angle: AngleKind,
    params: &LociParams,
) -> Result<AngularLine, AstroLociError> {
    let pos = batch.position(body)?;
    let theta_g = batch.frame().theta_g;

    let locus = match angle {
        AngleKind::UpperCulm => Locus::Meridian {
            longitude: wrap_pm_pi(pos.alpha - theta_g),
        },
        AngleKind::LowerCulm => Locus::Meridian {
            longitude: wrap_pm_pi(pos.alpha - theta_g + PI),
        },
        AngleKind::Rise | AngleKind::Set => horizon_curve(batch, body, angle, params)?,
    };

    Ok(AngularLine { body, angle, locus })
}

fn horizon_curve(
    batch: &BodyBatch,
    body: BodyId,
    angle: AngleKind,
    params: &LociParams,
) -> Result<Locus, AstroLociError> {
    let pos = batch.position(body)?;
    let trig = *batch.trig(body)?;
    let theta_g = batch.frame().theta_g;
    let branch_sign = if angle == AngleKind::Rise { -1.0 } else { 1.0 };

    // Equatorial body: the crossing degenerates to the fixed H = ±π/2
    // meridians (rising meridian east of culmination, setting west).
    if trig.tan_delta.abs() < DELTA_MERIDIAN_EPS {
        return Ok(Locus::Meridian {
            longitude: wrap_pm_pi(pos.alpha - theta_g + branch_sign * FRAC_PI_2),
        });
    }

    let quadrant = if trig.sin_delta < 0.0 { -1.0 } else { 1.0 };
    let step = params.lon_step_deg * RADEG;
    let n = (crate::constants::DPI / step).round() as usize;

    let mut segments: Vec<Vec<GeoPoint>> = Vec::new();
    let mut current: Vec<GeoPoint> = Vec::new();

    for k in 0..n {
        let longitude = wrap_pm_pi(-PI + (k as f64) * step);
        let h = wrap_pm_pi(theta_g + longitude - pos.alpha);

        // Branch assignment: rising east of the meridian, setting west.
        let on_branch = branch_sign * h.sin() > 0.0;
        if !on_branch {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            continue;
        }

        let latitude =
            (-h.cos() * trig.cos_delta * quadrant).atan2(trig.sin_delta * quadrant);
        if latitude.abs() > params.polar_guard {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(GeoPoint {
            longitude,
            latitude,
        });
    }
    if !current.is_empty() {
        segments.push(current);
    }

    Ok(Locus::Curve { segments })
}
