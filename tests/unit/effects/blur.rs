use super::*;

#[test]
fn blur_tiny_sigma_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6];
    let out = gaussian_blur_gray(&src, 3, 2, 0.0, EdgeMode::Clamp).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_constant_plane_is_identity() {
    let src = vec![77u8; 6 * 5];
    for edge in [EdgeMode::Clamp, EdgeMode::Wrap] {
        let out = gaussian_blur_gray(&src, 6, 5, 3.0, edge).unwrap();
        assert_eq!(out, src);
    }
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let (w, h) = (9u32, 9u32);
    let mut src = vec![0u8; (w * h) as usize];
    src[(4 * w + 4) as usize] = 255;

    let out = gaussian_blur_gray(&src, w, h, 1.5, EdgeMode::Clamp).unwrap();
    let nonzero = out.iter().filter(|&&v| v != 0).count();
    assert!(nonzero > 1);
    assert!(out[(4 * w + 4) as usize] < 255);
    // symmetric around the impulse
    assert_eq!(out[(4 * w + 3) as usize], out[(4 * w + 5) as usize]);
    assert_eq!(out[(3 * w + 4) as usize], out[(5 * w + 4) as usize]);
}

#[test]
fn wrap_mode_bleeds_across_opposite_edge() {
    let (w, h) = (8u32, 1u32);
    let mut src = vec![0u8; w as usize];
    src[0] = 255;

    let wrapped = gaussian_blur_gray(&src, w, h, 1.0, EdgeMode::Wrap).unwrap();
    let clamped = gaussian_blur_gray(&src, w, h, 1.0, EdgeMode::Clamp).unwrap();
    assert!(wrapped[7] > 0);
    assert_eq!(clamped[7], 0);
}

#[test]
fn box_radii_grow_with_sigma() {
    let small: usize = box_radii_for_gaussian(2.0, 3).iter().sum();
    let large: usize = box_radii_for_gaussian(20.0, 3).iter().sum();
    assert!(large > small);
}

#[test]
fn mismatched_plane_is_rejected() {
    assert!(gaussian_blur_gray(&[0u8; 5], 2, 2, 1.0, EdgeMode::Clamp).is_err());
    assert!(gaussian_blur_gray(&[0u8; 4], 2, 2, f32::NAN, EdgeMode::Clamp).is_err());
}
