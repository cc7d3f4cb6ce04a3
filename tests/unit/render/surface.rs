use std::sync::Arc;

use super::*;

fn image(w: u32, h: u32, px: [u8; 4]) -> PreparedImage {
    PreparedImage {
        width: w,
        height: h,
        rgba8_premul: Arc::new(px.repeat((w * h) as usize)),
    }
}

#[test]
fn new_surface_is_transparent() {
    let s = Surface::new(Canvas::new(3, 2).unwrap()).unwrap();
    assert_eq!(s.data.len(), 24);
    assert!(s.data.iter().all(|&v| v == 0));
}

#[test]
fn bilinear_at_pixel_center_returns_that_pixel() {
    let mut s = Surface::new(Canvas::new(2, 1).unwrap()).unwrap();
    s.data.copy_from_slice(&[255, 0, 0, 255, 0, 0, 255, 255]);
    assert_eq!(s.sample_bilinear(0.5, 0.5), [255.0, 0.0, 0.0, 255.0]);
    let mid = s.sample_bilinear(1.0, 0.5);
    assert_eq!(mid, [127.5, 0.0, 127.5, 255.0]);
}

#[test]
fn bilinear_fades_to_transparent_outside() {
    let s = Surface::from_image(&image(1, 1, [200, 200, 200, 200]));
    assert_eq!(s.sample_bilinear(-5.0, -5.0), [0.0; 4]);
    let edge = s.sample_bilinear(1.0, 0.5);
    assert!(edge[3] > 0.0 && edge[3] < 200.0);
}

#[test]
fn resample_same_size_is_copy_and_other_size_matches_target() {
    let img = image(4, 2, [10, 20, 30, 255]);
    let same = resample_image(&img, Canvas::new(4, 2).unwrap()).unwrap();
    assert_eq!(same.data, *img.rgba8_premul);

    let scaled = resample_image(&img, Canvas::new(8, 3).unwrap()).unwrap();
    assert_eq!((scaled.width, scaled.height), (8, 3));
    assert_eq!(scaled.pixel(5, 1), [10, 20, 30, 255]);
}
