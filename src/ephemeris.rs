//! # Ephemeris snapshot types
//!
//! The astroloci core never computes ephemerides: an external provider hands it
//! exact double-precision positions for one instant, and everything downstream
//! is pure geometry. This module defines that input surface:
//!
//! - [`BodyPosition`] — one body's apparent, geocentric, of-date coordinates,
//! - [`InstantFrame`] — the instant-level quantities (Greenwich sidereal time,
//!   obliquity, nutation in longitude),
//! - [`BodyBatch`] — the immutable arena of positions for one evaluation call,
//!   with per-batch precomputed declination trig passed by reference to the
//!   solvers (no process-wide cache).
//!
//! Input-contract validation happens exactly once, in [`BodyBatch::new`]: a
//! NaN or out-of-range declination is a hard error there, and the primitives
//! and solvers never re-check. This keeps the "one unsolved pair never aborts
//! the batch / bad input is fatal for its unit of work only" policy sharp.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use crate::angles::wrap_two_pi;
use crate::astroloci_errors::AstroLociError;
use crate::constants::{BodyId, Radian};

/// Apparent geocentric position of one body, true equator/equinox of date.
///
/// All angles in radians. `alpha`/`lambda` are normalized to [0, 2π) on batch
/// construction; `delta`/`beta` must lie in [−π/2, π/2].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    /// Caller-assigned body identifier, carried through to every output.
    pub id: BodyId,
    /// Right ascension α.
    pub alpha: Radian,
    /// Declination δ.
    pub delta: Radian,
    /// Ecliptic longitude λ.
    pub lambda: Radian,
    /// Ecliptic latitude β (≈ 0 for planets).
    pub beta: Radian,
}

/// Instant-level quantities shared by every body in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstantFrame {
    /// Greenwich apparent sidereal time θ_G.
    pub theta_g: Radian,
    /// True obliquity of the ecliptic ε.
    pub obliquity: Radian,
    /// Nutation in longitude Δψ (passed through for callers; the loci
    /// formulae consume apparent α/δ and θ_G directly).
    pub nutation_longitude: Radian,
}

/// Precomputed declination trig for one body, computed once per batch.
#[derive(Debug, Clone, Copy)]
pub struct DeclinationTrig {
    pub sin_delta: f64,
    pub cos_delta: f64,
    pub tan_delta: f64,
}

impl DeclinationTrig {
    fn new(delta: Radian) -> Self {
        Self {
            sin_delta: delta.sin(),
            cos_delta: delta.cos(),
            tan_delta: delta.tan(),
        }
    }
}

/// Immutable arena of body positions for one evaluation instant.
///
/// Construction validates the full input contract; afterwards every accessor
/// is infallible modulo unknown ids. The batch owns the only trig
/// precomputation in the crate — a value handed around by reference, never a
/// global cache.
#[derive(Debug, Clone)]
pub struct BodyBatch {
    frame: InstantFrame,
    bodies: Vec<BodyPosition>,
    trig: Vec<DeclinationTrig>,
}

impl BodyBatch {
    /// Build a validated batch from raw provider output.
    ///
    /// Arguments
    /// ---------
    /// * `frame`: instant-level sidereal time / obliquity / nutation.
    /// * `positions`: one entry per body, ids unique within the batch.
    ///
    /// Return
    /// ------
    /// * The arena with α/λ normalized to [0, 2π) and declination trig
    ///   precomputed, or the first contract violation found:
    ///   [`AstroLociError::NonFiniteFrame`],
    ///   [`AstroLociError::NonFiniteEphemeris`],
    ///   [`AstroLociError::DeclinationOutOfRange`],
    ///   [`AstroLociError::DuplicateBodyId`].
    pub fn new(
        frame: InstantFrame,
        positions: Vec<BodyPosition>,
    ) -> Result<Self, AstroLociError> {
        for (value, field) in [
            (frame.theta_g, "theta_g"),
            (frame.obliquity, "obliquity"),
            (frame.nutation_longitude, "nutation_longitude"),
        ] {
            if !value.is_finite() {
                return Err(AstroLociError::NonFiniteFrame(field));
            }
        }

        let mut bodies = Vec::with_capacity(positions.len());
        let mut trig = Vec::with_capacity(positions.len());

        for mut body in positions {
            for (value, field) in [
                (body.alpha, "alpha"),
                (body.delta, "delta"),
                (body.lambda, "lambda"),
                (body.beta, "beta"),
            ] {
                if !value.is_finite() {
                    return Err(AstroLociError::NonFiniteEphemeris {
                        body: body.id,
                        field,
                    });
                }
            }
            if body.delta.abs() > FRAC_PI_2 {
                return Err(AstroLociError::DeclinationOutOfRange {
                    body: body.id,
                    delta: body.delta,
                });
            }
            if bodies.iter().any(|b: &BodyPosition| b.id == body.id) {
                return Err(AstroLociError::DuplicateBodyId(body.id));
            }

            body.alpha = wrap_two_pi(body.alpha);
            body.lambda = wrap_two_pi(body.lambda);

            trig.push(DeclinationTrig::new(body.delta));
            bodies.push(body);
        }

        Ok(Self {
            frame,
            bodies,
            trig,
        })
    }

    pub fn frame(&self) -> &InstantFrame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Body ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = BodyId> + Clone + '_ {
        self.bodies.iter().map(|b| b.id)
    }

    pub fn position(&self, id: BodyId) -> Result<&BodyPosition, AstroLociError> {
        self.bodies
            .iter()
            .find(|b| b.id == id)
            .ok_or(AstroLociError::UnknownBody(id))
    }

    /// Precomputed declination trig for a body.
    pub fn trig(&self, id: BodyId) -> Result<&DeclinationTrig, AstroLociError> {
        let idx = self
            .bodies
            .iter()
            .position(|b| b.id == id)
            .ok_or(AstroLociError::UnknownBody(id))?;
        Ok(&self.trig[idx])
    }

    /// Iterate positions with their trig cache, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&BodyPosition, &DeclinationTrig)> {
        self.bodies.iter().zip(self.trig.iter())
    }
}
