pub mod angles;
pub mod astroloci_errors;
pub mod constants;
pub mod ephemeris;
pub mod lines;
pub mod params;
pub mod paran;
pub mod visibility;

pub use astroloci_errors::AstroLociError;
pub use constants::{BodyId, Degree, Radian};
pub use ephemeris::{BodyBatch, BodyPosition, InstantFrame};
pub use lines::angular::angular_line;
pub use lines::aspect::{aspect_line, aspect_lines_for_body};
pub use lines::{AngularLine, AspectKind, AspectLine, GeoPoint, Locus};
pub use params::LociParams;
pub use paran::batch::{solve_paran, solve_paran_batch};
pub use paran::{
    AngleKind, NoSolutionReason, ParanLine, ParanOutcome, ParanQuery, ParanSolution,
    SolvedBranch, VisibilityMode,
};
