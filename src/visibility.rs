//! # Visibility filtering
//!
//! Altitude checks applied to already-solved paran latitudes. Placement and
//! visibility are strictly separated: nothing in this module ever moves a
//! solved latitude — a point is only accepted or rejected against the
//! configured altitude threshold (by default the constant −34′ refraction
//! offset).
//!
//! Meridian altitudes come from the closed forms
//! h_MC = π/2 − |φ − δ| and h_IC = −(π/2 − |φ + δ|); horizon altitudes are
//! recomputed through the altitude identity at the body's signed horizon
//! hour angle (and so sit at 0 up to round-off, passing any sub-horizon
//! threshold trivially).

use std::f64::consts::FRAC_PI_2;

use crate::angles::{altitude, horizon_hour_angle};
use crate::astroloci_errors::AstroLociError;
use crate::constants::{BodyId, Radian};
use crate::ephemeris::BodyBatch;
use crate::params::LociParams;
use crate::paran::{AngleKind, ParanQuery, VisibilityMode};

/// Culmination altitude of a body at latitude φ, `None` for horizon angles.
pub fn meridian_altitude(phi: Radian, delta: Radian, angle: AngleKind) -> Option<Radian> {
    match angle {
        AngleKind::UpperCulm => Some(FRAC_PI_2 - (phi - delta).abs()),
        AngleKind::LowerCulm => Some(-(FRAC_PI_2 - (phi + delta).abs())),
        _ => None,
    }
}

/// Altitude of a body at latitude φ while holding the given angular position.
pub fn angle_altitude(
    batch: &BodyBatch,
    body: BodyId,
    angle: AngleKind,
    phi: Radian,
) -> Result<Radian, AstroLociError> {
    let delta = batch.position(body)?.delta;
    match meridian_altitude(phi, delta, angle) {
        Some(h) => Ok(h),
        // Horizon angle: altitude at the signed crossing hour angle.
        None => {
            let sign = if angle == AngleKind::Rise { -1.0 } else { 1.0 };
            Ok(altitude(phi, delta, sign * horizon_hour_angle(phi, delta)))
        }
    }
}

/// Apply the query's visibility mode to one solved latitude.
///
/// Return
/// ------
/// * `true` when the point is accepted under the mode; `All` always accepts,
///   `MeridianVisibleOnly` accepts horizon–horizon pairs unchanged (there is
///   no meridian body to test).
pub fn passes_visibility(
    batch: &BodyBatch,
    query: &ParanQuery,
    phi: Radian,
    params: &LociParams,
) -> Result<bool, AstroLociError> {
    let pairs = [(query.body_a, query.angle_a), (query.body_b, query.angle_b)];
    match query.visibility {
        VisibilityMode::All => Ok(true),
        VisibilityMode::BothVisible => {
            for (body, angle) in pairs {
                if angle_altitude(batch, body, angle, phi)? <= params.horizon_altitude {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        VisibilityMode::MeridianVisibleOnly => {
            for (body, angle) in pairs {
                if angle.is_meridian()
                    && angle_altitude(batch, body, angle, phi)? <= params.horizon_altitude
                {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}
