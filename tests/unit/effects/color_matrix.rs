use super::*;

fn approx(a: [f32; 4], b: [f32; 4]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
}

#[test]
fn color_matrix_identity_is_identity() {
    let src = vec![10u8, 20, 30, 40, 50, 60, 70, 80];
    let mut dst = vec![0u8; src.len()];
    ColorMatrix::identity()
        .apply_rgba8_premul(&src, &mut dst)
        .unwrap();
    assert_eq!(src, dst);
}

#[test]
fn desaturate_averages_channels_and_keeps_alpha() {
    let out = ColorMatrix::desaturate().apply_straight([0.9, 0.3, 0.0, 0.5]);
    assert!(approx(out, [0.4, 0.4, 0.4, 0.5]));
}

#[test]
fn contrast_pivots_around_mid_grey() {
    let m = ColorMatrix::contrast(3.0);
    assert!(approx(m.apply_straight([0.5, 0.5, 0.5, 1.0]), [0.5, 0.5, 0.5, 1.0]));
    assert!(approx(m.apply_straight([0.3, 0.3, 0.3, 1.0]), [0.0, 0.0, 0.0, 1.0]));
    assert!(approx(m.apply_straight([0.6, 0.6, 0.6, 1.0]), [0.9, 0.9, 0.9, 1.0]));
}

#[test]
fn then_matches_sequential_application_in_range() {
    let a = ColorMatrix::contrast(0.5);
    let b = ColorMatrix::brightness(0.8);
    let px = [0.6, 0.4, 0.5, 1.0];
    let seq = b.apply_straight(a.apply_straight(px));
    let fused = a.then(b).apply_straight(px);
    assert!(approx(seq, fused));
}

#[test]
fn then_with_identity_is_noop() {
    let m = ColorMatrix::desaturate().then(ColorMatrix::contrast(2.0));
    assert_eq!(m.then(ColorMatrix::identity()), m);
    assert_eq!(ColorMatrix::identity().then(m), m);
}

#[test]
fn transparent_pixels_stay_transparent() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![9u8; 4];
    ColorMatrix::brightness(3.0)
        .apply_rgba8_premul(&src, &mut dst)
        .unwrap();
    assert_eq!(dst, vec![0, 0, 0, 0]);
}

#[test]
fn mismatched_buffers_are_rejected() {
    let src = vec![0u8; 8];
    let mut dst = vec![0u8; 4];
    assert!(
        ColorMatrix::identity()
            .apply_rgba8_premul(&src, &mut dst)
            .is_err()
    );
}
