//! # Angular and aspect line generation
//!
//! Single-body loci on the geographic sphere for one ephemeris instant:
//!
//! - [`angular`] — where a body stands on an angle: MC/IC loci are meridians
//!   (closed form, valid at every latitude), ASC/DSC loci are parametric
//!   curves swept in longitude,
//! - [`aspect`] — where a body's ecliptic longitude holds a fixed zodiacal
//!   aspect to a local angle's ecliptic longitude: closed-form meridians for
//!   MC/IC, marching-contour extraction for ASC/DSC,
//! - [`contour`] — the grid/refinement machinery behind the ASC/DSC aspect
//!   case, the one place in the crate with inherent approximation.

use serde::{Deserialize, Serialize};

use crate::constants::{BodyId, Radian};
use crate::paran::AngleKind;

pub mod angular;
pub mod aspect;
pub mod contour;

/// A point on the geographic sphere, radians, longitude in (−π, π]
/// (east-positive), latitude in [−π/2, π/2].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: Radian,
    pub latitude: Radian,
}

/// A solved locus on the sphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Locus {
    /// A full meridian: one longitude, every latitude valid.
    Meridian { longitude: Radian },
    /// A full parallel: one latitude, every longitude valid.
    Parallel { latitude: Radian },
    /// A sampled curve. Each segment is a contiguous run of valid points;
    /// breaks mark spans excluded as circumpolar or beyond the polar guard.
    Curve { segments: Vec<Vec<GeoPoint>> },
}

impl Locus {
    /// Total number of sampled points (0 for meridians and parallels).
    pub fn point_count(&self) -> usize {
        match self {
            Locus::Curve { segments } => segments.iter().map(Vec::len).sum(),
            _ => 0,
        }
    }
}

/// Zodiacal aspect between a body and a local angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectKind {
    Conjunction,
    Sextile,
    Square,
    Trine,
    Opposition,
}

impl AspectKind {
    /// The exact aspect angle Θ.
    pub fn angle(self) -> Radian {
        use std::f64::consts::PI;
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::Sextile => PI / 3.0,
            AspectKind::Square => PI / 2.0,
            AspectKind::Trine => 2.0 * PI / 3.0,
            AspectKind::Opposition => PI,
        }
    }

    /// Whether the aspect is applied on both sides of the angle
    /// (±Θ yield distinct loci for everything but 0 and π).
    pub fn is_two_sided(self) -> bool {
        !matches!(self, AspectKind::Conjunction | AspectKind::Opposition)
    }

    pub const ALL: [AspectKind; 5] = [
        AspectKind::Conjunction,
        AspectKind::Sextile,
        AspectKind::Square,
        AspectKind::Trine,
        AspectKind::Opposition,
    ];
}

/// A single-body angular line, tagged with its originating query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngularLine {
    pub body: BodyId,
    pub angle: AngleKind,
    pub locus: Locus,
}

/// An aspect-to-angle line, tagged with its originating query triple.
///
/// `offset` is the signed aspect angle actually applied (±Θ); `orb` the
/// acceptance tolerance used by the contour extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectLine {
    pub body: BodyId,
    pub angle: AngleKind,
    pub aspect: AspectKind,
    pub offset: Radian,
    pub orb: Radian,
    pub locus: Locus,
}
