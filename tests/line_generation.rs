use std::f64::consts::PI;

use astroloci::angles::{altitude, angle_diff, wrap_pm_pi, wrap_two_pi};
use astroloci::lines::aspect::{aspect_line, lambda_asc, lambda_mc};
use astroloci::{
    angular_line, aspect_lines_for_body, AngleKind, AspectKind, BodyBatch, BodyPosition,
    InstantFrame, LociParams, Locus,
};

const OBLIQUITY: f64 = 0.40909280422232897;

fn batch(theta_g: f64, bodies: &[(u32, f64, f64, f64)]) -> BodyBatch {
    let frame = InstantFrame {
        theta_g,
        obliquity: OBLIQUITY,
        nutation_longitude: 0.0,
    };
    let positions = bodies
        .iter()
        .map(|&(id, alpha, delta, lambda)| BodyPosition {
            id,
            alpha,
            delta,
            lambda,
            beta: 0.0,
        })
        .collect();
    BodyBatch::new(frame, positions).unwrap()
}

/// The MC meridian is exactly where the body culminates: H = 0 there, and the
/// body's altitude matches the closed culmination form.
#[test]
fn mc_meridian_is_the_culmination_longitude() {
    let theta_g = 2.4;
    let alpha = 5.1;
    let delta = -0.15;
    let b = batch(theta_g, &[(1, alpha, delta, 0.0)]);
    let params = LociParams::default();

    let line = angular_line(&b, 1, AngleKind::UpperCulm, &params).unwrap();
    let Locus::Meridian { longitude } = line.locus else {
        panic!("MC locus must be a meridian");
    };
    let h = wrap_pm_pi(theta_g + longitude - alpha);
    assert!(h.abs() < 1e-12);

    // Altitude along that meridian peaks as π/2 − |φ − δ|.
    for phi in [-1.0, -0.3, 0.0, 0.6] {
        let expected = std::f64::consts::FRAC_PI_2 - (phi - delta).abs();
        assert!((altitude(phi, delta, h) - expected).abs() < 1e-12);
    }
}

/// Every sampled ASC/DSC point is a genuine horizon crossing: altitude zero.
#[test]
fn horizon_curve_points_sit_on_the_horizon() {
    let theta_g = 1.1;
    let alpha = 0.4;
    let delta = 0.45;
    let b = batch(theta_g, &[(1, alpha, delta, 0.0)]);
    let params = LociParams::default();

    for angle in [AngleKind::Rise, AngleKind::Set] {
        let line = angular_line(&b, 1, angle, &params).unwrap();
        let Locus::Curve { segments } = &line.locus else {
            panic!("horizon locus must be a curve");
        };
        assert!(!segments.is_empty());
        for p in segments.iter().flatten() {
            let h = wrap_pm_pi(theta_g + p.longitude - alpha);
            assert!(
                altitude(p.latitude, delta, h).abs() < 1e-9,
                "off-horizon point {p:?}"
            );
        }
    }
}

/// MC/IC aspect meridians: the angle's ecliptic longitude holds the aspect
/// exactly at the generated longitude, for every aspect of the family.
#[test]
fn meridian_aspect_family_holds_aspects() {
    let theta_g = 0.35;
    let lambda_p = 4.0;
    let b = batch(theta_g, &[(1, 1.0, 0.1, lambda_p)]);
    let params = LociParams::default();

    let lines =
        aspect_lines_for_body(&b, 1, AngleKind::UpperCulm, 1.0_f64.to_radians(), &params)
            .unwrap();
    assert_eq!(lines.len(), 8);

    for line in &lines {
        let Locus::Meridian { longitude } = line.locus else {
            panic!("MC aspect loci must be meridians");
        };
        let held = lambda_mc(theta_g + longitude, OBLIQUITY);
        let target = wrap_two_pi(lambda_p + line.offset);
        assert!(
            angle_diff(held, target).abs() < 1e-12,
            "aspect {:?} offset {:+.3} not held",
            line.aspect,
            line.offset
        );
    }
}

/// DSC aspect contour: points hold the aspect against the descendant (the
/// ascendant's antipode) within the orb.
#[test]
fn descendant_aspect_contour_within_orb() {
    let theta_g = 0.9;
    let lambda_p = 1.3;
    let b = batch(theta_g, &[(1, 0.7, 0.2, lambda_p)]);
    let params = LociParams::builder().grid_step_deg(2.0).build().unwrap();
    let orb = 0.5_f64.to_radians();

    let line = aspect_line(
        &b,
        1,
        AngleKind::Set,
        AspectKind::Sextile,
        -AspectKind::Sextile.angle(),
        orb,
        &params,
        &mut || false,
    )
    .unwrap();

    let Locus::Curve { segments } = &line.locus else {
        panic!("DSC aspect locus must be a curve");
    };
    assert!(!segments.is_empty());

    let target = wrap_two_pi(lambda_p - AspectKind::Sextile.angle() + PI);
    for p in segments.iter().flatten() {
        let held = lambda_asc(p.latitude, theta_g + p.longitude, OBLIQUITY);
        assert!(angle_diff(held, target).abs() <= orb);
    }
}

/// Cancellation mid-grid yields a valid partial result, never a panic or a
/// corrupted point set.
#[test]
fn aspect_contour_cancellation_is_clean() {
    let b = batch(0.2, &[(1, 0.7, 0.2, 2.0)]);
    let params = LociParams::builder()
        .grid_step_deg(1.0)
        .chunk_rows(16)
        .build()
        .unwrap();
    let orb = 1.0_f64.to_radians();

    let mut checks = 0usize;
    let full = aspect_line(
        &b,
        1,
        AngleKind::Rise,
        AspectKind::Conjunction,
        0.0,
        orb,
        &params,
        &mut || false,
    )
    .unwrap();
    let partial = aspect_line(
        &b,
        1,
        AngleKind::Rise,
        AspectKind::Conjunction,
        0.0,
        orb,
        &params,
        &mut || {
            checks += 1;
            checks > 3
        },
    )
    .unwrap();

    assert!(partial.locus.point_count() <= full.locus.point_count());

    // Partial points are still on the contour.
    let target = wrap_two_pi(2.0);
    if let Locus::Curve { segments } = &partial.locus {
        for p in segments.iter().flatten() {
            let held = lambda_asc(p.latitude, 0.2 + p.longitude, OBLIQUITY);
            assert!(angle_diff(held, target).abs() <= orb);
        }
    }
}
