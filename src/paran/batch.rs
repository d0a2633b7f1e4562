//! # Batch orchestration
//!
//! Enumerates ordered (body, angle) pairs over an ephemeris snapshot,
//! dispatches each to the matching solver, suppresses degenerate
//! combinations, and applies the visibility filter. Policy (the default of
//! the source convention):
//!
//! - for each unordered body pair, all 4 meridian–horizon combinations per
//!   body (8 ordered queries),
//! - the 4 both-horizon combinations, dispatched to the numeric solver,
//! - the 4 both-meridian combinations, suppressed as degenerate without ever
//!   entering a solver (solutions exist only at Δα ∈ {0, π}, and there they
//!   cover the whole sphere rather than a latitude).
//!
//! Every query is pure over the immutable batch: evaluating the same snapshot
//! twice yields bitwise-identical output, and one unsolved pair never aborts
//! the rest.

use itertools::Itertools;

use crate::astroloci_errors::AstroLociError;
use crate::ephemeris::BodyBatch;
use crate::params::LociParams;
use crate::paran::horizon_horizon::solve_horizon_horizon;
use crate::paran::meridian_horizon::solve_meridian_horizon;
use crate::paran::{
    AngleKind, NoSolutionReason, ParanLine, ParanOutcome, ParanQuery, VisibilityMode,
};
use crate::visibility::passes_visibility;

const MERIDIAN_ANGLES: [AngleKind; 2] = [AngleKind::UpperCulm, AngleKind::LowerCulm];
const HORIZON_ANGLES: [AngleKind; 2] = [AngleKind::Rise, AngleKind::Set];

/// Solve a single paran query, dispatching on the angle kinds and applying
/// the query's visibility mode.
///
/// Return
/// ------
/// * The per-pair outcome. Solutions failing the visibility filter are
///   dropped (never moved); an outcome emptied by filtering collapses to
///   `NoSolution(OutOfDomain)`. Both-meridian queries are answered
///   `NoSolution(Degenerate)` without entering a solver.
pub fn solve_paran(
    batch: &BodyBatch,
    query: &ParanQuery,
    params: &LociParams,
) -> Result<ParanOutcome, AstroLociError> {
    let outcome = match (query.angle_a.is_meridian(), query.angle_b.is_meridian()) {
        (true, true) => ParanOutcome::NoSolution(NoSolutionReason::Degenerate),
        (true, false) => solve_meridian_horizon(
            batch,
            query.body_a,
            query.angle_a,
            query.body_b,
            query.angle_b,
            params,
        )?,
        (false, true) => solve_meridian_horizon(
            batch,
            query.body_b,
            query.angle_b,
            query.body_a,
            query.angle_a,
            params,
        )?,
        (false, false) => solve_horizon_horizon(
            batch,
            query.body_a,
            query.angle_a,
            query.body_b,
            query.angle_b,
            params,
        )?,
    };

    apply_visibility(batch, query, outcome, params)
}

/// Enumerate and solve every pair combination in the batch under the default
/// policy.
///
/// Arguments
/// ---------
/// * `batch`: validated ephemeris arena.
/// * `params`: numeric guards and the visibility threshold.
/// * `visibility`: filter mode stamped on every generated query.
/// * `topocentric`: passthrough flag stamped on every generated query.
///
/// Return
/// ------
/// * One [`ParanLine`] per ordered query, including the suppressed and
///   unsolved ones (their outcomes carry the reason codes).
pub fn solve_paran_batch(
    batch: &BodyBatch,
    params: &LociParams,
    visibility: VisibilityMode,
    topocentric: bool,
) -> Result<Vec<ParanLine>, AstroLociError> {
    let mut lines = Vec::new();

    for (a, b) in batch.ids().tuple_combinations() {
        // Meridian–horizon: each body takes the meridian role in turn.
        for (meridian, horizon) in [(a, b), (b, a)] {
            for m_angle in MERIDIAN_ANGLES {
                for h_angle in HORIZON_ANGLES {
                    let mut query = ParanQuery::new(meridian, m_angle, horizon, h_angle)
                        .with_visibility(visibility);
                    query.topocentric = topocentric;
                    let outcome = solve_paran(batch, &query, params)?;
                    lines.push(ParanLine { query, outcome });
                }
            }
        }

        // Both-horizon: numeric solver.
        for a_angle in HORIZON_ANGLES {
            for b_angle in HORIZON_ANGLES {
                let mut query =
                    ParanQuery::new(a, a_angle, b, b_angle).with_visibility(visibility);
                query.topocentric = topocentric;
                let outcome = solve_paran(batch, &query, params)?;
                lines.push(ParanLine { query, outcome });
            }
        }

        // Both-meridian: suppressed, never routed into a solver.
        for a_angle in MERIDIAN_ANGLES {
            for b_angle in MERIDIAN_ANGLES {
                let mut query =
                    ParanQuery::new(a, a_angle, b, b_angle).with_visibility(visibility);
                query.topocentric = topocentric;
                lines.push(ParanLine {
                    query,
                    outcome: ParanOutcome::NoSolution(NoSolutionReason::Degenerate),
                });
            }
        }
    }

    Ok(lines)
}

fn apply_visibility(
    batch: &BodyBatch,
    query: &ParanQuery,
    outcome: ParanOutcome,
    params: &LociParams,
) -> Result<ParanOutcome, AstroLociError> {
    let solutions = match outcome {
        ParanOutcome::Solved(solutions) => solutions,
        other => return Ok(other),
    };

    let mut kept = smallvec::SmallVec::new();
    for solution in solutions {
        if passes_visibility(batch, query, solution.latitude, params)? {
            kept.push(solution);
        }
    }

    if kept.is_empty() {
        Ok(ParanOutcome::NoSolution(NoSolutionReason::OutOfDomain))
    } else {
        Ok(ParanOutcome::Solved(kept))
    }
}
