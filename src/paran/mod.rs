//! # Paran solving
//!
//! A *paran* is a geographic latitude where two bodies simultaneously occupy
//! specified local angular positions — one rising while the other culminates,
//! both setting at once, and so on. This module defines the query/outcome
//! types and hosts the two solvers plus the batch orchestrator:
//!
//! - [`meridian_horizon`] — closed-form solution for the common case of one
//!   body on a meridian angle (MC/IC) against one on a horizon angle
//!   (rise/set),
//! - [`horizon_horizon`] — guarded numeric root-finding for the case with no
//!   closed form (both bodies on horizon angles),
//! - [`batch`] — enumeration of body/angle pairs, degeneracy suppression,
//!   and the visibility filter.
//!
//! ## Outcomes, not exceptions
//!
//! A configuration without a solution is a normal result
//! ([`ParanOutcome::NoSolution`] with a reason code), and a numeric budget
//! running dry is reported distinctly ([`ParanOutcome::NonConvergence`]) so a
//! caller can tell "provably none" from "solver gave up". Neither aborts a
//! batch. Only input-contract violations surface as hard errors, and those
//! are caught at [`BodyBatch`](crate::ephemeris::BodyBatch) construction.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{BodyId, Radian};

pub mod batch;
pub mod horizon_horizon;
pub mod meridian_horizon;

/// A local angular position: the four angles of astrocartography.
///
/// Each maps to a fixed hour-angle constant or sign:
/// upper culmination → H = 0, lower culmination → H = π,
/// rise → H = −H₀(φ, δ), set → H = +H₀(φ, δ).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AngleKind {
    /// Rising over the eastern horizon (ASC).
    Rise,
    /// Setting below the western horizon (DSC).
    Set,
    /// Upper culmination on the local meridian (MC).
    UpperCulm,
    /// Lower culmination, anti-meridian (IC).
    LowerCulm,
}

impl AngleKind {
    pub fn is_meridian(self) -> bool {
        matches!(self, AngleKind::UpperCulm | AngleKind::LowerCulm)
    }

    pub fn is_horizon(self) -> bool {
        matches!(self, AngleKind::Rise | AngleKind::Set)
    }

    /// Fixed meridian hour angle: 0 for MC, π for IC, `None` for horizon angles.
    pub fn meridian_hour_angle(self) -> Option<Radian> {
        match self {
            AngleKind::UpperCulm => Some(0.0),
            AngleKind::LowerCulm => Some(std::f64::consts::PI),
            _ => None,
        }
    }

    /// Horizon branch sign: −1 for rise, +1 for set, `None` for meridian angles.
    pub fn horizon_sign(self) -> Option<f64> {
        match self {
            AngleKind::Rise => Some(-1.0),
            AngleKind::Set => Some(1.0),
            _ => None,
        }
    }
}

/// Visibility constraint applied to solved parans. Selecting a mode never
/// changes a solved latitude — it only accepts or rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VisibilityMode {
    /// No filtering.
    #[default]
    All,
    /// Both bodies must clear the altitude threshold at the solved latitude.
    BothVisible,
    /// Only the meridian body's culmination altitude must clear the
    /// threshold. Passes horizon–horizon pairs unchanged (no meridian body).
    MeridianVisibleOnly,
}

/// One paran request: an ordered pair of (body, angle) constraints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParanQuery {
    pub body_a: BodyId,
    pub angle_a: AngleKind,
    pub body_b: BodyId,
    pub angle_b: AngleKind,
    pub visibility: VisibilityMode,
    /// Passthrough flag for the ephemeris layer; never computed here.
    pub topocentric: bool,
}

impl ParanQuery {
    pub fn new(body_a: BodyId, angle_a: AngleKind, body_b: BodyId, angle_b: AngleKind) -> Self {
        Self {
            body_a,
            angle_a,
            body_b,
            angle_b,
            visibility: VisibilityMode::All,
            topocentric: false,
        }
    }

    pub fn with_visibility(mut self, mode: VisibilityMode) -> Self {
        self.visibility = mode;
        self
    }
}

/// Which solving branch produced a latitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolvedBranch {
    /// Closed-form branch: `meridian` was on MC/IC, `horizon` on rise/set.
    MeridianHorizon { meridian: BodyId, horizon: BodyId },
    /// Numeric branch: both bodies on horizon angles.
    HorizonHorizon,
}

/// A solved paran latitude with its diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParanSolution {
    /// Solved latitude φ (radians). Independent of observer longitude.
    pub latitude: Radian,
    pub branch: SolvedBranch,
    /// Back-substitution residual of the simultaneity condition (radians).
    pub residual: Radian,
    /// True when the raw solution exceeded the polar guard and was clamped.
    pub pole_limited: bool,
}

impl ParanSolution {
    /// The solution as a geographic locus: a full parallel at the solved
    /// latitude (paran latitudes are independent of observer longitude).
    pub fn locus(&self) -> crate::lines::Locus {
        crate::lines::Locus::Parallel {
            latitude: self.latitude,
        }
    }
}

/// Reason code for a configuration with provably no solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoSolutionReason {
    /// Degenerate by construction (e.g. both bodies on meridian angles).
    Degenerate,
    /// The defined latitude band is empty — a body never crosses the horizon
    /// anywhere inside the polar guard.
    Circumpolar,
    /// The residual never crosses zero inside the defined band, or the
    /// requested horizon branch does not match the geometry.
    OutOfDomain,
}

/// Per-pair solving outcome.
///
/// Up to two latitudes can satisfy a horizon–horizon pair, so the solved
/// variant carries a small set rather than a single value; the closed-form
/// branch always yields exactly one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParanOutcome {
    Solved(SmallVec<[ParanSolution; 2]>),
    NoSolution(NoSolutionReason),
    /// The iteration budget ran out before any bracket converged. Distinct
    /// from [`ParanOutcome::NoSolution`]: the geometry may admit a solution.
    NonConvergence { best_residual: Radian },
}

impl ParanOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, ParanOutcome::Solved(_))
    }

    /// Borrow the solved latitudes, empty for unsolved outcomes.
    pub fn solutions(&self) -> &[ParanSolution] {
        match self {
            ParanOutcome::Solved(s) => s,
            _ => &[],
        }
    }

    /// The no-solution reason, if that is what this outcome is.
    pub fn reason(&self) -> Option<NoSolutionReason> {
        match self {
            ParanOutcome::NoSolution(r) => Some(*r),
            _ => None,
        }
    }
}

/// One batch output row: the originating query with its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParanLine {
    pub query: ParanQuery,
    pub outcome: ParanOutcome,
}
