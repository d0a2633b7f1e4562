//! # Closed-form meridian–horizon paran solver
//!
//! The common paran case — one body culminating while the other rises or
//! sets — admits a direct algebraic solution. With Y the meridian body and X
//! the horizon body:
//!
//! ```text
//! Δα  = wrap_(−π,π]( α_Y − α_X )
//! H   = wrap_(−π,π]( Δα + H_const )        H_const ∈ {0, π}
//! H₀  = |H|                                 ∈ [0, π]
//! tan φ = −cos H₀ / tan δ_X
//! ```
//!
//! The atan2 form of the last line is mandatory: the raw tangent ratio loses
//! precision as δ_X → 0, exactly where the solution runs toward a pole. The
//! horizon condition is embedded in the derivation, so no separate
//! circumpolarity check is needed on this branch; what must still be checked
//! is that the *requested* horizon branch (rise vs set) matches the sign the
//! geometry forces on H.

use smallvec::smallvec;
use std::f64::consts::PI;

use crate::angles::{angle_diff, horizon_hour_angle, wrap_pm_pi};
use crate::astroloci_errors::AstroLociError;
use crate::constants::BodyId;
use crate::ephemeris::BodyBatch;
use crate::params::LociParams;
use crate::paran::{
    AngleKind, NoSolutionReason, ParanOutcome, ParanSolution, SolvedBranch,
};

/// Solve the paran latitude for a meridian-angle body against a horizon-angle
/// body.
///
/// Arguments
/// ---------
/// * `batch`: validated ephemeris arena.
/// * `meridian_body` / `meridian_angle`: the body on MC or IC.
/// * `horizon_body` / `horizon_angle`: the body on rise or set.
/// * `params`: numeric guards (only the polar guard is used here).
///
/// Return
/// ------
/// * `Ok(ParanOutcome::Solved)` with exactly one latitude when the requested
///   branch matches the geometry; the solution carries the back-substitution
///   residual and a `pole_limited` flag when the raw latitude exceeded the
///   polar guard and was clamped.
/// * `Ok(ParanOutcome::NoSolution(OutOfDomain))` when the geometry forces the
///   opposite horizon branch (the sibling combination solves instead).
/// * `Err` only for wrong angle kinds or unknown bodies.
///
/// # See also
/// * [`solve_horizon_horizon`](crate::paran::horizon_horizon::solve_horizon_horizon) – the numeric branch.
/// * [`solve_paran`](crate::paran::batch::solve_paran) – kind dispatch.
pub fn solve_meridian_horizon(
    batch: &BodyBatch,
    meridian_body: BodyId,
    meridian_angle: AngleKind,
    horizon_body: BodyId,
    horizon_angle: AngleKind,
    params: &LociParams,
) -> Result<ParanOutcome, AstroLociError> {
    let h_const = meridian_angle.meridian_hour_angle().ok_or_else(|| {
        AstroLociError::InvalidParameter(
            "meridian_angle must be UpperCulm or LowerCulm".into(),
        )
    })?;
    let branch_sign = horizon_angle.horizon_sign().ok_or_else(|| {
        AstroLociError::InvalidParameter("horizon_angle must be Rise or Set".into())
    })?;

    let pos_y = batch.position(meridian_body)?;
    let pos_x = batch.position(horizon_body)?;
    let trig_x = *batch.trig(horizon_body)?;

    let delta_alpha = wrap_pm_pi(pos_y.alpha - pos_x.alpha);
    // Signed hour angle the horizon body must hold at the shared instant.
    let h = wrap_pm_pi(delta_alpha + h_const);

    // Rise requires H ≤ 0 (east of the meridian), set H ≥ 0; H = π satisfies
    // both since −π ≡ π. The sibling combination covers the rejected branch.
    let feasible = if branch_sign < 0.0 {
        h <= 0.0 || h == PI
    } else {
        h >= 0.0
    };
    if !feasible {
        return Ok(ParanOutcome::NoSolution(NoSolutionReason::OutOfDomain));
    }

    let h0 = h.abs();

    // atan2(−cos H₀ · cos δ, sin δ), quadrant-normalized onto the principal
    // latitude branch. The sign factor keeps the second argument non-negative
    // so the result stays in [−π/2, π/2]; at δ = 0 it resolves the two-sided
    // limit to the δ → 0⁺ side (φ → −π/2 for H₀ = 0).
    let quadrant = if trig_x.sin_delta < 0.0 { -1.0 } else { 1.0 };
    let raw_phi = (-h0.cos() * trig_x.cos_delta * quadrant)
        .atan2(trig_x.sin_delta * quadrant);

    let pole_limited = raw_phi.abs() > params.polar_guard;
    let latitude = if pole_limited {
        params.polar_guard.copysign(raw_phi)
    } else {
        raw_phi
    };

    let residual = angle_diff(
        branch_sign * horizon_hour_angle(latitude, pos_x.delta),
        h,
    );

    Ok(ParanOutcome::Solved(smallvec![ParanSolution {
        latitude,
        branch: SolvedBranch::MeridianHorizon {
            meridian: meridian_body,
            horizon: horizon_body,
        },
        residual,
        pole_limited,
    }]))
}
