//! # Numeric horizon–horizon paran solver
//!
//! When both bodies sit on horizon angles there is no closed form. With
//! s = −1 for rise and +1 for set, the simultaneity condition is the
//! congruence
//!
//! ```text
//! s_A·H₀(φ, δ_A) − s_B·H₀(φ, δ_B) ≡ α_B − α_A   (mod 2π)
//! cos H₀(φ, δ) = −tan φ · tan δ
//! ```
//!
//! The residual is therefore compared modulo 2π: for mixed rise/set pairs the
//! unwrapped difference spans [−2π, 2π] and a congruent solution can hide at
//! ±2π. Wrapping introduces jump discontinuities, so sign-change brackets
//! whose endpoint gap exceeds π are rejected as wrap artifacts rather than
//! handed to the root-finder.
//!
//! Latitudes where |tan φ · tan δ| > 1 for either body are **excluded**, not
//! clamped: clamping here would silently corrupt the geometry (unlike the
//! primitives' round-off clamp). The search interval [−89.9°, +89.9°] is
//! partitioned at the singular latitudes ±(π/2 − |δ|) and only fully-defined
//! sub-intervals are scanned.

use roots::{find_root_brent, SimpleConvergency};
use smallvec::SmallVec;
use std::f64::consts::{FRAC_PI_2, PI};

use crate::angles::{angle_diff, clamp_unit, wrap_pm_pi};
use crate::astroloci_errors::AstroLociError;
use crate::constants::{BodyId, Radian, RADEG};
use crate::ephemeris::BodyBatch;
use crate::params::LociParams;
use crate::paran::{
    AngleKind, NoSolutionReason, ParanOutcome, ParanSolution, SolvedBranch,
};

/// Hard search interval bound: the residual's derivative degenerates at the
/// poles, and no horizon crossing survives beyond this latitude in practice.
const SEARCH_LIMIT: Radian = 89.9 * RADEG;

/// Inset applied at sub-interval boundaries, where the residual is defined but
/// its derivative blows up.
const EDGE_INSET: Radian = 1e-9;

/// Horizon hour-angle magnitude from precomputed tan δ, defined only where
/// |tan φ · tan δ| ≤ 1 (callers partition the domain first).
#[inline]
fn h0(phi: Radian, tan_delta: f64) -> Radian {
    clamp_unit(-phi.tan() * tan_delta).acos()
}

/// d(arccos g)/dφ with g = −tan φ · tan δ:  sec²φ · tan δ / √(1 − g²).
#[inline]
fn dh0_dphi(phi: Radian, tan_delta: f64) -> Option<f64> {
    let g = -phi.tan() * tan_delta;
    let under = 1.0 - g * g;
    if under <= 0.0 {
        return None;
    }
    let sec2 = 1.0 / (phi.cos() * phi.cos());
    Some(sec2 * tan_delta / under.sqrt())
}

/// Solve the paran latitude(s) for two bodies both on horizon angles.
///
/// Arguments
/// ---------
/// * `batch`: validated ephemeris arena.
/// * `body_a` / `angle_a`, `body_b` / `angle_b`: both angles must be
///   [`AngleKind::Rise`] or [`AngleKind::Set`].
/// * `params`: tolerance, iteration budget, scan density.
///
/// Return
/// ------
/// * `Ok(ParanOutcome::Solved)` with every bracketed root (up to two in
///   practice), each carrying its wrapped back-substitution residual.
/// * `Ok(ParanOutcome::NoSolution(Circumpolar))` when the defined latitude
///   band is empty inside the search interval.
/// * `Ok(ParanOutcome::NoSolution(Degenerate))` when the residual is
///   constant-zero across the band (both bodies equatorial and in phase —
///   every latitude qualifies, which is not a curve this solver reports).
/// * `Ok(ParanOutcome::NoSolution(OutOfDomain))` when the residual never
///   crosses zero — frequent, and not an error.
/// * `Ok(ParanOutcome::NonConvergence)` when brackets existed but the
///   iteration budget ran out; carries the best residual seen so callers can
///   distinguish "provably none" from "solver gave up".
///
/// # See also
/// * [`solve_meridian_horizon`](crate::paran::meridian_horizon::solve_meridian_horizon) – the closed-form branch.
pub fn solve_horizon_horizon(
    batch: &BodyBatch,
    body_a: BodyId,
    angle_a: AngleKind,
    body_b: BodyId,
    angle_b: AngleKind,
    params: &LociParams,
) -> Result<ParanOutcome, AstroLociError> {
    let s_a = angle_a.horizon_sign().ok_or_else(|| {
        AstroLociError::InvalidParameter("angle_a must be Rise or Set".into())
    })?;
    let s_b = angle_b.horizon_sign().ok_or_else(|| {
        AstroLociError::InvalidParameter("angle_b must be Rise or Set".into())
    })?;

    let pos_a = batch.position(body_a)?;
    let pos_b = batch.position(body_b)?;
    let tan_a = batch.trig(body_a)?.tan_delta;
    let tan_b = batch.trig(body_b)?.tan_delta;

    let delta_alpha = wrap_pm_pi(pos_b.alpha - pos_a.alpha);
    let f = |phi: f64| angle_diff(s_a * h0(phi, tan_a) - s_b * h0(phi, tan_b), delta_alpha);

    // Partition the search interval at the singular latitudes of either body.
    let mut cuts: Vec<Radian> = vec![-SEARCH_LIMIT, SEARCH_LIMIT];
    for &(tan_d, delta) in &[(tan_a, pos_a.delta), (tan_b, pos_b.delta)] {
        if tan_d.abs() > f64::EPSILON {
            let sing = FRAC_PI_2 - delta.abs();
            if sing < SEARCH_LIMIT {
                cuts.push(sing);
                cuts.push(-sing);
            }
        }
    }
    cuts.sort_by(f64::total_cmp);

    let in_domain = |phi: f64| {
        (phi.tan() * tan_a).abs() <= 1.0 && (phi.tan() * tan_b).abs() <= 1.0
    };

    let mut samples: Vec<(f64, f64)> = Vec::new();
    let mut sub_ranges: Vec<(usize, usize)> = Vec::new();
    for w in cuts.windows(2) {
        let (lo, hi) = (w[0] + EDGE_INSET, w[1] - EDGE_INSET);
        if hi <= lo || !in_domain(0.5 * (lo + hi)) {
            continue;
        }
        let start = samples.len();
        let n = params.scan_samples;
        for k in 0..=n {
            let phi = lo + (hi - lo) * (k as f64) / (n as f64);
            samples.push((phi, f(phi)));
        }
        sub_ranges.push((start, samples.len()));
    }

    if samples.is_empty() {
        return Ok(ParanOutcome::NoSolution(NoSolutionReason::Circumpolar));
    }

    // A flat residual means no isolated root exists anywhere: either the
    // whole band satisfies the condition (degenerate, e.g. two equatorial
    // bodies in phase) or none of it does.
    let f_min = samples.iter().map(|&(_, v)| v).fold(f64::INFINITY, f64::min);
    let f_max = samples
        .iter()
        .map(|&(_, v)| v)
        .fold(f64::NEG_INFINITY, f64::max);
    if f_max - f_min < params.numeric_tol {
        let reason = if f_min.abs() < params.numeric_tol {
            NoSolutionReason::Degenerate
        } else {
            NoSolutionReason::OutOfDomain
        };
        return Ok(ParanOutcome::NoSolution(reason));
    }

    let mut solutions: SmallVec<[ParanSolution; 2]> = SmallVec::new();
    let mut budget_exhausted = false;
    let mut best_residual = f64::INFINITY;

    let mut push_root = |root: f64, solutions: &mut SmallVec<[ParanSolution; 2]>| {
        let residual = f(root);
        if solutions
            .iter()
            .any(|s| (s.latitude - root).abs() < 10.0 * params.numeric_tol)
        {
            return;
        }
        solutions.push(ParanSolution {
            latitude: root,
            branch: SolvedBranch::HorizonHorizon,
            residual,
            pole_limited: false,
        });
    };

    for &(start, end) in &sub_ranges {
        for pair in samples[start..end].windows(2) {
            let (x0, f0) = pair[0];
            let (x1, f1) = pair[1];
            best_residual = best_residual.min(f0.abs()).min(f1.abs());

            if f0 == 0.0 {
                push_root(x0, &mut solutions);
                continue;
            }
            if f0 * f1 >= 0.0 {
                continue;
            }
            // Wrap jump, not a root: the residual leaps across the ±π seam.
            if (f0 - f1).abs() > PI {
                continue;
            }

            let mut conv = SimpleConvergency {
                eps: params.numeric_tol,
                max_iter: params.max_iter,
            };
            let root = match find_root_brent(x0, x1, &f, &mut conv) {
                Ok(r) => Some(r),
                Err(roots::SearchError::NoConvergency) => bisect(x0, x1, &f, params),
                Err(roots::SearchError::NoBracketing) => None,
                Err(e) => return Err(e.into()),
            };

            match root {
                Some(mut r) => {
                    if params.newton_polish {
                        r = newton_polish(r, x0, x1, &f, tan_a, tan_b, s_a, s_b);
                    }
                    push_root(r, &mut solutions);
                }
                None => budget_exhausted = true,
            }
        }
    }

    if !solutions.is_empty() {
        Ok(ParanOutcome::Solved(solutions))
    } else if budget_exhausted {
        Ok(ParanOutcome::NonConvergence { best_residual })
    } else {
        Ok(ParanOutcome::NoSolution(NoSolutionReason::OutOfDomain))
    }
}

/// Plain bisection fallback, bounded by the same iteration budget.
fn bisect(
    mut lo: f64,
    mut hi: f64,
    f: &impl Fn(f64) -> f64,
    params: &LociParams,
) -> Option<f64> {
    let mut f_lo = f(lo);
    if f_lo == 0.0 {
        return Some(lo);
    }
    for _ in 0..params.max_iter {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);
        if f_mid == 0.0 || (hi - lo) < params.numeric_tol {
            return Some(mid);
        }
        if f_lo * f_mid < 0.0 {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }
    None
}

/// One guarded Newton step: only accepted when it stays inside the bracket
/// and actually reduces the residual.
#[allow(clippy::too_many_arguments)]
fn newton_polish(
    root: f64,
    lo: f64,
    hi: f64,
    f: &impl Fn(f64) -> f64,
    tan_a: f64,
    tan_b: f64,
    s_a: f64,
    s_b: f64,
) -> f64 {
    let (Some(da), Some(db)) = (dh0_dphi(root, tan_a), dh0_dphi(root, tan_b)) else {
        return root;
    };
    let derivative = s_a * da - s_b * db;
    if derivative.abs() < f64::EPSILON {
        return root;
    }
    let current = f(root);
    let candidate = root - current / derivative;
    if candidate > lo && candidate < hi && f(candidate).abs() < current.abs() {
        candidate
    } else {
        root
    }
}

#[cfg(test)]
mod horizon_horizon_test {
    use super::*;
    use crate::angles::wrap_two_pi;
    use crate::ephemeris::{BodyPosition, InstantFrame};
    use approx::assert_relative_eq;

    fn batch(bodies: &[(u32, f64, f64)]) -> BodyBatch {
        let frame = InstantFrame {
            theta_g: 0.0,
            obliquity: 0.4091,
            nutation_longitude: 0.0,
        };
        let positions = bodies
            .iter()
            .map(|&(id, alpha, delta)| BodyPosition {
                id,
                alpha,
                delta,
                lambda: alpha,
                beta: 0.0,
            })
            .collect();
        BodyBatch::new(frame, positions).unwrap()
    }

    /// Build a rise/set pair engineered to solve exactly at `phi_star`.
    fn engineered(phi_star: f64, delta_a: f64, delta_b: f64) -> BodyBatch {
        let h0_a = h0(phi_star, delta_a.tan());
        let h0_b = h0(phi_star, delta_b.tan());
        // s_a = −1 (rise), s_b = +1 (set)
        let target = -h0_a - h0_b;
        let alpha_a = 1.0;
        let alpha_b = wrap_two_pi(alpha_a + target);
        batch(&[(1, alpha_a, delta_a), (2, alpha_b, delta_b)])
    }

    #[test]
    fn test_engineered_solution() {
        let phi_star = 0.5;
        let batch = engineered(phi_star, 0.1, -0.2);
        let params = LociParams::default();

        let out = solve_horizon_horizon(
            &batch,
            1,
            AngleKind::Rise,
            2,
            AngleKind::Set,
            &params,
        )
        .unwrap();
        assert!(out.is_solved(), "expected a solution, got {out:?}");
        let hit = out
            .solutions()
            .iter()
            .find(|s| (s.latitude - phi_star).abs() < 1e-7)
            .expect("engineered root not recovered");
        assert!(hit.residual.abs() < 1e-8);
        assert_eq!(hit.branch, SolvedBranch::HorizonHorizon);

        // Simultaneity: both bodies share the local sidereal time at φ.
        let pos_a = batch.position(1).unwrap();
        let pos_b = batch.position(2).unwrap();
        let theta_a = pos_a.alpha - h0(hit.latitude, pos_a.delta.tan());
        let theta_b = pos_b.alpha + h0(hit.latitude, pos_b.delta.tan());
        assert!(angle_diff(theta_a, theta_b).abs() < 1e-8);
    }

    #[test]
    fn test_no_solution_is_not_an_error() {
        // Two equatorial bodies: H₀ ≡ π/2 for both, so the rise/rise residual
        // is the constant −Δα. Out of phase → provably no solution.
        let batch = batch(&[(1, 0.0, 0.0), (2, 1.0, 0.0)]);
        let params = LociParams::default();
        let out = solve_horizon_horizon(
            &batch,
            1,
            AngleKind::Rise,
            2,
            AngleKind::Rise,
            &params,
        )
        .unwrap();
        assert_eq!(out.reason(), Some(NoSolutionReason::OutOfDomain));
    }

    #[test]
    fn test_degenerate_whole_band() {
        // Two equatorial bodies in phase: every latitude satisfies the
        // condition. Reported as degenerate, not as a fake isolated root.
        let batch = batch(&[(1, 2.0, 0.0), (2, 2.0, 0.0)]);
        let params = LociParams::default();
        let out = solve_horizon_horizon(
            &batch,
            1,
            AngleKind::Rise,
            2,
            AngleKind::Rise,
            &params,
        )
        .unwrap();
        assert_eq!(out.reason(), Some(NoSolutionReason::Degenerate));
    }

    #[test]
    fn test_mirror_symmetry() {
        // Swapping the bodies, negating both declinations and exchanging
        // rise/set mirrors every root across the equator.
        let params = LociParams::default();
        let direct = engineered(0.42, 0.25, -0.1);
        let out = solve_horizon_horizon(
            &direct,
            1,
            AngleKind::Rise,
            2,
            AngleKind::Set,
            &params,
        )
        .unwrap();

        let pos_a = direct.position(1).unwrap();
        let pos_b = direct.position(2).unwrap();
        let mirrored = batch(&[
            (1, pos_b.alpha, -pos_b.delta),
            (2, pos_a.alpha, -pos_a.delta),
        ]);
        let out_m = solve_horizon_horizon(
            &mirrored,
            1,
            AngleKind::Rise,
            2,
            AngleKind::Set,
            &params,
        )
        .unwrap();

        let mut lats: Vec<f64> = out.solutions().iter().map(|s| s.latitude).collect();
        let mut lats_m: Vec<f64> = out_m.solutions().iter().map(|s| -s.latitude).collect();
        lats.sort_by(|a, b| a.partial_cmp(b).unwrap());
        lats_m.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(lats.len(), lats_m.len());
        for (&a, &b) in lats.iter().zip(lats_m.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_meridian_angles_rejected() {
        let batch = batch(&[(1, 0.0, 0.1), (2, 1.0, 0.2)]);
        let params = LociParams::default();
        assert!(solve_horizon_horizon(
            &batch,
            1,
            AngleKind::UpperCulm,
            2,
            AngleKind::Set,
            &params
        )
        .is_err());
    }

    #[test]
    fn test_high_declination_band_excluded() {
        // δ_B close to the pole: the defined band shrinks to a sliver around
        // the equator; the solver must partition, not clamp through it.
        let batch = batch(&[(1, 0.3, 0.1), (2, 0.9, 1.45)]);
        let params = LociParams::default();
        let out = solve_horizon_horizon(
            &batch,
            1,
            AngleKind::Rise,
            2,
            AngleKind::Set,
            &params,
        )
        .unwrap();
        // Whatever the outcome, any root must sit inside the defined band.
        for s in out.solutions() {
            assert!((s.latitude.tan() * 1.45f64.tan()).abs() <= 1.0 + 1e-9);
        }
    }
}
