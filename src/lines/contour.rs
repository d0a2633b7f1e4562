//! # Marching-contour extraction
//!
//! Zero-level extraction of a wrapped angular residual F(φ, λ_E) over a
//! latitude–longitude grid: evaluate the residual into a matrix, locate
//! sign-change cell edges, refine each crossing by 1-D bisection along its
//! edge, and accept points whose refined residual fits the orb tolerance.
//!
//! Grid resolution and refinement tolerance are explicit parameters
//! ([`LociParams::grid_step_deg`], [`LociParams::refine_tol`]) — this is the
//! one approximating component of the crate, so the accuracy/performance
//! trade-off stays in the caller's hands.
//!
//! Rows are evaluated in chunks with a cancellation predicate checked in
//! between, so a caller-imposed timeout can abort a long grid mid-way and
//! still receive every point produced so far.

use nalgebra::DMatrix;
use std::f64::consts::PI;

use crate::constants::{Radian, RADEG};
use crate::lines::GeoPoint;
use crate::params::LociParams;

/// Result of one contour extraction pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourResult {
    /// Refined crossing points, in (longitude, latitude) radians.
    pub points: Vec<GeoPoint>,
    /// False when the cancellation predicate fired before the grid finished;
    /// the points produced up to that moment are still valid.
    pub complete: bool,
}

/// Extract the zero contour of a wrapped residual.
///
/// Arguments
/// ---------
/// * `f`: residual as a function of (latitude, longitude), both radians;
///   must be wrapped into (−π, π] by the caller (sign-change detection
///   rejects brackets that jump across the ±π seam).
/// * `orb`: acceptance tolerance on the refined residual.
/// * `params`: grid step, refinement tolerance, polar guard, chunk size.
/// * `cancel`: checked between row chunks; return `true` to abort.
///
/// Return
/// ------
/// * Accepted points grouped in scan order (sorted by longitude, then
///   latitude), plus the completion flag.
pub fn extract_contour(
    f: &dyn Fn(Radian, Radian) -> Radian,
    orb: Radian,
    params: &LociParams,
    cancel: &mut dyn FnMut() -> bool,
) -> ContourResult {
    let step = params.grid_step_deg * RADEG;

    // Latitude rows span the polar guard exclusively: boundary cells are
    // excluded rather than refined into the guard band.
    let lat_max = params.polar_guard - step;
    let n_rows = (2.0 * lat_max / step).floor() as usize + 1;
    let n_cols = (2.0 * PI / step).round() as usize + 1;

    let lat = |i: usize| -lat_max + (i as f64) * step;
    let lon = |j: usize| -PI + (j as f64) * step;

    let mut values = DMatrix::<f64>::zeros(n_rows, n_cols);
    let mut rows_done = 0usize;
    let mut complete = true;

    while rows_done < n_rows {
        if cancel() {
            complete = false;
            break;
        }
        let end = (rows_done + params.chunk_rows).min(n_rows);
        for i in rows_done..end {
            for j in 0..n_cols {
                values[(i, j)] = f(lat(i), lon(j));
            }
        }
        rows_done = end;
    }

    let mut points: Vec<GeoPoint> = Vec::new();
    if rows_done >= 2 {
        for i in 0..rows_done - 1 {
            for j in 0..n_cols - 1 {
                // Bottom edge: along longitude at lat(i).
                if let Some(p) = refine_edge(
                    values[(i, j)],
                    values[(i, j + 1)],
                    |t| f(lat(i), lon(j) + t * step),
                    |t| GeoPoint {
                        longitude: lon(j) + t * step,
                        latitude: lat(i),
                    },
                    orb,
                    params,
                ) {
                    points.push(p);
                }
                // Left edge: along latitude at lon(j).
                if let Some(p) = refine_edge(
                    values[(i, j)],
                    values[(i + 1, j)],
                    |t| f(lat(i) + t * step, lon(j)),
                    |t| GeoPoint {
                        longitude: lon(j),
                        latitude: lat(i) + t * step,
                    },
                    orb,
                    params,
                ) {
                    points.push(p);
                }
            }
        }
    }

    points.sort_by(|a, b| {
        a.longitude
            .total_cmp(&b.longitude)
            .then(a.latitude.total_cmp(&b.latitude))
    });

    ContourResult { points, complete }
}

/// Group a sorted point cloud into contiguous segments, splitting where
/// consecutive points are farther apart than `gap` in either coordinate.
pub fn chain_segments(points: Vec<GeoPoint>, gap: Radian) -> Vec<Vec<GeoPoint>> {
    let mut segments: Vec<Vec<GeoPoint>> = Vec::new();
    let mut current: Vec<GeoPoint> = Vec::new();

    for point in points {
        if let Some(last) = current.last() {
            let jump = (point.longitude - last.longitude).abs() > gap
                || (point.latitude - last.latitude).abs() > gap;
            if jump {
                segments.push(std::mem::take(&mut current));
            }
        }
        current.push(point);
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Bisect one cell edge with a sign change down to the refinement tolerance.
///
/// Returns `None` when there is no usable crossing: same signs, a wrap jump
/// across the ±π seam (endpoint gap above π), or a refined residual outside
/// the orb.
fn refine_edge(
    f0: f64,
    f1: f64,
    f_at: impl Fn(f64) -> f64,
    point_at: impl Fn(f64) -> GeoPoint,
    orb: Radian,
    params: &LociParams,
) -> Option<GeoPoint> {
    if f0 == 0.0 {
        return accept(point_at(0.0), f0, orb);
    }
    if f0 * f1 >= 0.0 {
        return None;
    }
    if (f0 - f1).abs() > PI {
        return None;
    }

    let (mut lo, mut hi) = (0.0f64, 1.0f64);
    let mut f_lo = f0;
    for _ in 0..params.max_iter {
        let mid = 0.5 * (lo + hi);
        let f_mid = f_at(mid);
        if f_mid.abs() <= params.refine_tol {
            return accept(point_at(mid), f_mid, orb);
        }
        if f_lo * f_mid < 0.0 {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }
    let mid = 0.5 * (lo + hi);
    accept(point_at(mid), f_at(mid), orb)
}

fn accept(point: GeoPoint, residual: f64, orb: Radian) -> Option<GeoPoint> {
    (residual.abs() <= orb).then_some(point)
}

#[cfg(test)]
mod contour_test {
    use super::*;
    use crate::angles::angle_diff;

    fn params() -> LociParams {
        LociParams::builder().grid_step_deg(1.0).build().unwrap()
    }

    #[test]
    fn test_extracts_known_contour() {
        // F = wrapped difference between latitude and a tilted plane of
        // longitude: the zero contour is the line φ = 0.2·λ.
        let f = |lat: f64, lon: f64| angle_diff(lat, 0.2 * lon);
        let params = params();
        let result = extract_contour(&f, 1e-3, &params, &mut || false);
        assert!(result.complete);
        assert!(!result.points.is_empty());
        for p in &result.points {
            assert!((p.latitude - 0.2 * p.longitude).abs() < 1e-3);
        }
    }

    #[test]
    fn test_refinement_tolerance() {
        let f = |lat: f64, lon: f64| angle_diff(lat, 0.3 * lon.sin());
        let params = params();
        let result = extract_contour(&f, 1e-6, &params, &mut || false);
        assert!(!result.points.is_empty());
        for p in &result.points {
            assert!(f(p.latitude, p.longitude).abs() <= 1e-6);
        }
    }

    #[test]
    fn test_cancellation_yields_partial() {
        let f = |lat: f64, lon: f64| angle_diff(lat, 0.2 * lon);
        let params = params();
        let mut calls = 0usize;
        let mut cancel = || {
            calls += 1;
            calls > 2
        };
        let result = extract_contour(&f, 1e-3, &params, &mut cancel);
        assert!(!result.complete);
        // Only the earliest (southernmost) row chunks were evaluated, so the
        // partial point set is a strict subset of the full run.
        let full = extract_contour(&f, 1e-3, &params, &mut || false);
        assert!(result.points.len() < full.points.len());
    }

    #[test]
    fn test_wrap_jump_rejected() {
        // A residual with a ±π seam along the longitude axis must not
        // produce fake crossings there.
        let f = |_lat: f64, lon: f64| angle_diff(lon, std::f64::consts::PI);
        let params = params();
        let result = extract_contour(&f, 1e-3, &params, &mut || false);
        for p in &result.points {
            // genuine zeros only, not the seam at λ = 0 where F jumps
            assert!(f(0.0, p.longitude).abs() <= 1e-3);
        }
    }

    #[test]
    fn test_chain_segments() {
        let mk = |lon: f64, lat: f64| GeoPoint {
            longitude: lon,
            latitude: lat,
        };
        let segments = chain_segments(
            vec![mk(0.0, 0.0), mk(0.01, 0.0), mk(0.5, 0.0), mk(0.51, 0.0)],
            0.1,
        );
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len(), 2);
        assert_eq!(segments[1].len(), 2);
    }
}
