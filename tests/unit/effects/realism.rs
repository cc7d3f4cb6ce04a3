use super::*;
use crate::foundation::core::Canvas;

fn solid(w: u32, h: u32, px: [u8; 4]) -> Surface {
    let mut s = Surface::new(Canvas::new(w, h).unwrap()).unwrap();
    for chunk in s.data.chunks_exact_mut(4) {
        chunk.copy_from_slice(&px);
    }
    s
}

#[test]
fn white_through_shadow_matrix_washes_out() {
    let out = RealismKind::Shadow
        .matrix()
        .apply_straight([1.0, 1.0, 1.0, 1.0]);
    for c in &out[..3] {
        assert!(c * 255.0 >= 254.0);
    }

    let stack = RealismLayerStack::build(&solid(2, 2, [255; 4]), 100, true).unwrap();
    let shadow = stack.layer(RealismKind::Shadow).unwrap();
    assert!(shadow.surface.data.iter().all(|&v| v >= 254));
}

#[test]
fn layer_alpha_ordering_holds() {
    assert!(SHADOW_MAX_ALPHA >= HIGHLIGHT_MAX_ALPHA);
    assert!(HIGHLIGHT_MAX_ALPHA > GRAIN_MAX_ALPHA);
    assert!((SHADOW_MAX_ALPHA + HIGHLIGHT_MAX_ALPHA - 0.75).abs() < 1e-6);
}

#[test]
fn opacity_scales_with_texture_strength() {
    assert_eq!(RealismKind::Grain.opacity(0), 0.0);
    assert!((RealismKind::Shadow.opacity(30) - 0.1125).abs() < 1e-6);
    assert!((RealismKind::Highlight.opacity(100) - HIGHLIGHT_MAX_ALPHA).abs() < 1e-6);
    assert_eq!(RealismKind::Grain.opacity(250), RealismKind::Grain.opacity(100));
}

#[test]
fn stack_is_ordered_shadow_grain_highlight_with_fixed_blends() {
    let stack = RealismLayerStack::build(&solid(1, 1, [128, 128, 128, 255]), 30, true).unwrap();
    let kinds: Vec<_> = stack.layers().iter().map(|l| l.kind).collect();
    assert_eq!(kinds, RealismKind::ALL.to_vec());
    assert_eq!(RealismKind::Shadow.blend(), BlendMode::Multiply);
    assert_eq!(RealismKind::Grain.blend(), BlendMode::HardLight);
    assert_eq!(RealismKind::Highlight.blend(), BlendMode::Screen);
}

#[test]
fn hidden_overlay_leaves_target_untouched() {
    let stack = RealismLayerStack::build(&solid(2, 2, [30, 30, 30, 255]), 100, false).unwrap();
    let mut dst = solid(2, 2, [200, 100, 50, 255]);
    let before = dst.clone();
    stack.composite_onto(&mut dst).unwrap();
    assert_eq!(dst, before);
}

#[test]
fn dark_folds_darken_the_design() {
    let stack = RealismLayerStack::build(&solid(2, 2, [20, 20, 20, 255]), 100, true).unwrap();
    let mut dst = solid(2, 2, [200, 200, 200, 255]);
    stack.composite_onto(&mut dst).unwrap();
    assert!(dst.pixel(0, 0)[0] < 200);
}

#[test]
fn update_changes_opacity_and_visibility_only() {
    let mut stack = RealismLayerStack::build(&solid(1, 1, [90, 90, 90, 255]), 30, true).unwrap();
    let pixels: Vec<_> = stack.layers().iter().map(|l| l.surface.clone()).collect();
    stack.update(60, false);
    for (layer, px) in stack.layers().iter().zip(pixels) {
        assert_eq!(layer.surface, px);
        assert!(!layer.visible);
        assert!((layer.opacity - layer.kind.max_alpha() * 0.6).abs() < 1e-6);
    }
}
