//! # Aspect-to-angle lines
//!
//! Loci where a body's ecliptic longitude is offset by a fixed aspect angle Θ
//! from a local angle's ecliptic longitude.
//!
//! For MC/IC the problem inverts in closed form: the ecliptic longitude of
//! the midheaven depends only on local sidereal time,
//! λ_MC(θ_L) = atan2(sin θ_L · cos ε, cos θ_L), and solving
//! λ_MC(θ_L*) = λ_planet + Θ gives θ_L* = atan2(sin L, cos L · cos ε) —
//! again a meridian locus, no gridding required.
//!
//! For ASC/DSC no closed form exists: the ascendant's ecliptic longitude
//! λ_ASC(φ, θ_L) = atan2(sin θ_L · cos ε − tan φ · sin ε, cos θ_L) couples
//! latitude and longitude, so the locus is extracted as the zero contour of
//! the wrapped residual over a lat–lon grid (see
//! [`contour`](crate::lines::contour)).

use crate::angles::{angle_diff, wrap_pm_pi, wrap_two_pi};
use crate::astroloci_errors::AstroLociError;
use crate::constants::{BodyId, Radian, RADEG};
use crate::ephemeris::BodyBatch;
use crate::lines::contour::{chain_segments, extract_contour};
use crate::lines::{AspectKind, AspectLine, Locus};
use crate::params::LociParams;
use crate::paran::AngleKind;
use std::f64::consts::PI;

/// Ecliptic longitude of the midheaven for a local sidereal time.
pub fn lambda_mc(theta_l: Radian, obliquity: Radian) -> Radian {
    (theta_l.sin() * obliquity.cos()).atan2(theta_l.cos())
}

/// Ecliptic longitude of the ascendant for a latitude and local sidereal time.
pub fn lambda_asc(phi: Radian, theta_l: Radian, obliquity: Radian) -> Radian {
    (theta_l.sin() * obliquity.cos() - phi.tan() * obliquity.sin()).atan2(theta_l.cos())
}

/// Generate one aspect-to-angle line.
///
/// Arguments
/// ---------
/// * `batch`: validated ephemeris arena.
/// * `body`: the aspecting body (its ecliptic longitude λ is used).
/// * `angle`: the local angle carrying the aspect.
/// * `aspect`: the aspect kind; `offset` is the signed angle actually applied
///   and must be ±`aspect.angle()`.
/// * `orb`: acceptance tolerance for the contour points (ASC/DSC only).
/// * `cancel`: cancellation predicate for the contour grid; ignored by the
///   closed-form MC/IC branch.
///
/// Return
/// ------
/// * A tagged [`AspectLine`]: meridian locus for MC/IC, contour curve for
///   ASC/DSC.
pub fn aspect_line(
    batch: &BodyBatch,
    body: BodyId,
    angle: AngleKind,
    aspect: AspectKind,
    offset: Radian,
    orb: Radian,
    params: &LociParams,
    cancel: &mut dyn FnMut() -> bool,
) -> Result<AspectLine, AstroLociError> {
    if offset.abs() != aspect.angle() {
        return Err(AstroLociError::InvalidParameter(
            "offset must be the aspect angle or its negation".into(),
        ));
    }
    if !(orb.is_finite() && orb > 0.0) {
        return Err(AstroLociError::InvalidParameter(
            "orb must be finite and > 0".into(),
        ));
    }

    let pos = batch.position(body)?;
    let frame = *batch.frame();

    // Target ecliptic longitude of the angle. IC and DSC sit opposite their
    // siblings, which shifts the target by π.
    let target = wrap_two_pi(
        pos.lambda
            + offset
            + match angle {
                AngleKind::UpperCulm | AngleKind::Rise => 0.0,
                AngleKind::LowerCulm | AngleKind::Set => PI,
            },
    );

    let locus = match angle {
        AngleKind::UpperCulm | AngleKind::LowerCulm => {
            // Closed-form inversion of λ_MC.
            let theta_star = target.sin().atan2(target.cos() * frame.obliquity.cos());
            Locus::Meridian {
                longitude: wrap_pm_pi(theta_star - frame.theta_g),
            }
        }
        AngleKind::Rise | AngleKind::Set => {
            let f = |lat: Radian, lon: Radian| {
                let theta_l = frame.theta_g + lon;
                angle_diff(lambda_asc(lat, theta_l, frame.obliquity), target)
            };
            let result = extract_contour(&f, orb, params, cancel);
            let gap = 3.0 * params.grid_step_deg * RADEG;
            Locus::Curve {
                segments: chain_segments(result.points, gap),
            }
        }
    };

    Ok(AspectLine {
        body,
        angle,
        aspect,
        offset,
        orb,
        locus,
    })
}

/// Generate the full aspect-line family for one body and one angle: every
/// aspect kind, on both sides where the aspect is two-sided.
pub fn aspect_lines_for_body(
    batch: &BodyBatch,
    body: BodyId,
    angle: AngleKind,
    orb: Radian,
    params: &LociParams,
) -> Result<Vec<AspectLine>, AstroLociError> {
    let mut lines = Vec::new();
    for aspect in AspectKind::ALL {
        let mut offsets = vec![aspect.angle()];
        if aspect.is_two_sided() {
            offsets.push(-aspect.angle());
        }
        for offset in offsets {
            lines.push(aspect_line(
                batch,
                body,
                angle,
                aspect,
                offset,
                orb,
                params,
                &mut || false,
            )?);
        }
    }
    Ok(lines)
}
