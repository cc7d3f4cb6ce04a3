use super::*;

fn px(buf: &[u8]) -> [u8; 4] {
    [buf[0], buf[1], buf[2], buf[3]]
}

#[test]
fn normal_opaque_src_replaces_dst() {
    let mut dst = vec![10u8, 20, 30, 255];
    composite_over(&mut dst, &[200, 100, 50, 255], 1.0, BlendMode::Normal).unwrap();
    assert_eq!(px(&dst), [200, 100, 50, 255]);
}

#[test]
fn zero_opacity_is_noop_for_every_mode() {
    for mode in [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::HardLight,
    ] {
        let mut dst = vec![10u8, 20, 30, 255];
        composite_over(&mut dst, &[200, 100, 50, 255], 0.0, mode).unwrap();
        assert_eq!(px(&dst), [10, 20, 30, 255], "{mode:?}");
    }
}

#[test]
fn multiply_by_white_keeps_dst() {
    let mut dst = vec![120u8, 60, 30, 255];
    composite_over(&mut dst, &[255, 255, 255, 255], 1.0, BlendMode::Multiply).unwrap();
    assert_eq!(px(&dst), [120, 60, 30, 255]);
}

#[test]
fn multiply_darkens_and_screen_lightens() {
    let mut m = vec![200u8, 200, 200, 255];
    composite_over(&mut m, &[128, 128, 128, 255], 1.0, BlendMode::Multiply).unwrap();
    assert!(m[0] < 200);

    let mut s = vec![100u8, 100, 100, 255];
    composite_over(&mut s, &[128, 128, 128, 255], 1.0, BlendMode::Screen).unwrap();
    assert!(s[0] > 100);
}

#[test]
fn screen_with_black_keeps_dst() {
    let mut dst = vec![90u8, 45, 180, 255];
    composite_over(&mut dst, &[0, 0, 0, 255], 1.0, BlendMode::Screen).unwrap();
    assert_eq!(px(&dst), [90, 45, 180, 255]);
}

#[test]
fn hard_light_mid_grey_is_near_identity() {
    let mut dst = vec![100u8, 150, 200, 255];
    composite_over(&mut dst, &[128, 128, 128, 255], 1.0, BlendMode::HardLight).unwrap();
    for (out, orig) in dst.iter().zip([100u8, 150, 200]) {
        assert!((i32::from(*out) - i32::from(orig)).abs() <= 2);
    }
}

#[test]
fn partial_opacity_interpolates() {
    let mut dst = vec![200u8, 200, 200, 255];
    composite_over(&mut dst, &[0, 0, 0, 255], 0.5, BlendMode::Multiply).unwrap();
    assert!((i32::from(dst[0]) - 100).abs() <= 1);
}

#[test]
fn tint_white_is_noop_and_black_zeroes_color() {
    let mut a = vec![10u8, 20, 30, 40];
    tint_in_place(&mut a, RgbColor::WHITE);
    assert_eq!(a, vec![10, 20, 30, 40]);

    let mut b = vec![10u8, 20, 30, 40];
    tint_in_place(&mut b, RgbColor::new(0, 0, 0));
    assert_eq!(b, vec![0, 0, 0, 40]);
}

#[test]
fn mismatched_buffers_are_rejected() {
    let mut dst = vec![0u8; 8];
    assert!(composite_over(&mut dst, &[0u8; 4], 1.0, BlendMode::Normal).is_err());
}
