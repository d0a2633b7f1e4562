use thiserror::Error;

use crate::constants::BodyId;

/// Errors surfaced by the astroloci core.
///
/// Only **input-contract violations** become errors: a geometric configuration
/// without a solution, or a numeric solver that exhausts its budget, are
/// ordinary per-pair outcomes (see
/// [`ParanOutcome`](crate::paran::ParanOutcome)) and never abort a batch.
#[derive(Error, Debug)]
pub enum AstroLociError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Non-finite ephemeris value for body {body}: field {field}")]
    NonFiniteEphemeris { body: BodyId, field: &'static str },

    #[error("Non-finite instant frame value: field {0}")]
    NonFiniteFrame(&'static str),

    #[error("Declination out of range for body {body}: {delta} rad")]
    DeclinationOutOfRange { body: BodyId, delta: f64 },

    #[error("Duplicate body id in batch: {0}")]
    DuplicateBodyId(BodyId),

    #[error("Unknown body id: {0}")]
    UnknownBody(BodyId),

    #[error("ROOTS finding error: {0}")]
    RootFindingError(#[from] roots::SearchError),
}

impl PartialEq for AstroLociError {
    fn eq(&self, other: &Self) -> bool {
        use AstroLociError::*;
        match (self, other) {
            (InvalidParameter(a), InvalidParameter(b)) => a == b,
            (
                NonFiniteEphemeris { body: a, field: fa },
                NonFiniteEphemeris { body: b, field: fb },
            ) => a == b && fa == fb,
            (NonFiniteFrame(a), NonFiniteFrame(b)) => a == b,
            (
                DeclinationOutOfRange { body: a, .. },
                DeclinationOutOfRange { body: b, .. },
            ) => a == b,
            (DuplicateBodyId(a), DuplicateBodyId(b)) => a == b,
            (UnknownBody(a), UnknownBody(b)) => a == b,

            // Not comparable beyond the variant
            (RootFindingError(_), RootFindingError(_)) => true,

            _ => false,
        }
    }
}
