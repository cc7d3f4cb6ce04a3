use std::sync::Arc;

use super::*;

fn solid(w: u32, h: u32, px: [u8; 4]) -> PreparedImage {
    PreparedImage {
        width: w,
        height: h,
        rgba8_premul: Arc::new(px.repeat((w * h) as usize)),
    }
}

fn plain_settings() -> RenderSettings {
    RenderSettings {
        warp_strength: 0,
        show_overlay: false,
        ..RenderSettings::default()
    }
}

fn coverage(s: &Surface, px: [u8; 4]) -> usize {
    s.data.chunks_exact(4).filter(|p| *p == px).count()
}

#[test]
fn layer_roles_follow_fixed_z_order() {
    let stage =
        CompositorStage::preview(&solid(8, 8, [200; 4]), &plain_settings(), Canvas::new(8, 8).unwrap())
            .unwrap();
    assert_eq!(
        stage.stack().roles(),
        [
            LayerRole::Background,
            LayerRole::Displacement,
            LayerRole::DesignContainer,
            LayerRole::Shadow,
            LayerRole::Grain,
            LayerRole::Highlight,
        ]
    );
    assert!(!LayerRole::Displacement.is_drawn());
    assert_eq!(stage.kind(), StageKind::Preview);
    assert_eq!(stage.grid(), MeshGrid::PREVIEW);
}

#[test]
fn export_stage_uses_mockup_resolution_and_fine_grid() {
    let stage = CompositorStage::export(&solid(30, 20, [90, 90, 90, 255]), &plain_settings()).unwrap();
    assert_eq!(stage.canvas(), Canvas::new(30, 20).unwrap());
    assert_eq!(stage.kind(), StageKind::Export);
    assert_eq!(stage.grid(), MeshGrid::EXPORT);
}

#[test]
fn without_design_and_overlay_output_is_the_mockup() {
    let stage = CompositorStage::preview(
        &solid(10, 10, [40, 80, 120, 255]),
        &plain_settings(),
        Canvas::new(10, 10).unwrap(),
    )
    .unwrap();
    let out = stage.render(None).unwrap();
    assert_eq!(coverage(&out, [40, 80, 120, 255]), 100);
}

#[test]
fn design_is_drawn_at_its_transform() {
    let mockup = solid(100, 100, [255, 255, 255, 255]);
    let design = solid(10, 10, [255, 0, 0, 255]);
    let mut engine = TransformEngine::new();
    engine.reset_for_new_design(10, 10);

    let stage =
        CompositorStage::preview(&mockup, &plain_settings(), Canvas::new(100, 100).unwrap()).unwrap();
    let out = stage
        .render(Some(DesignLayer {
            texture: &design,
            placement: &engine,
        }))
        .unwrap();

    // 40% of 100 px wide, centered.
    assert_eq!(coverage(&out, [255, 0, 0, 255]), 40 * 40);
    assert_eq!(out.pixel(50, 50), [255, 0, 0, 255]);
    assert_eq!(out.pixel(5, 5), [255, 255, 255, 255]);
}

#[test]
fn design_footprint_scales_with_target_resolution() {
    let mockup = solid(200, 100, [255, 255, 255, 255]);
    let design = solid(20, 10, [0, 0, 255, 255]);
    let mut engine = TransformEngine::new();
    engine.reset_for_new_design(20, 10);
    engine.set_position(0.3, 0.6);
    engine.set_scale_percent(50.0);

    let small = CompositorStage::preview(&mockup, &plain_settings(), Canvas::new(200, 100).unwrap())
        .unwrap()
        .render(Some(DesignLayer {
            texture: &design,
            placement: &engine,
        }))
        .unwrap();
    let large = CompositorStage::preview(&mockup, &plain_settings(), Canvas::new(400, 200).unwrap())
        .unwrap()
        .render(Some(DesignLayer {
            texture: &design,
            placement: &engine,
        }))
        .unwrap();

    let a = coverage(&small, [0, 0, 255, 255]);
    let b = coverage(&large, [0, 0, 255, 255]);
    assert_eq!(a, 40 * 20);
    assert_eq!(b, a * 4);
}

#[test]
fn design_opacity_follows_settings() {
    let mockup = solid(50, 50, [0, 0, 0, 255]);
    let design = solid(5, 5, [255, 255, 255, 255]);
    let mut engine = TransformEngine::new();
    engine.reset_for_new_design(5, 5);
    let settings = RenderSettings {
        opacity: 50,
        ..plain_settings()
    };
    let stage = CompositorStage::preview(&mockup, &settings, Canvas::new(50, 50).unwrap()).unwrap();
    let out = stage
        .render(Some(DesignLayer {
            texture: &design,
            placement: &engine,
        }))
        .unwrap();
    let c = out.pixel(25, 25);
    assert!((i32::from(c[0]) - 128).abs() <= 1);
    assert_eq!(c[3], 255);
}

#[test]
fn update_settings_retints_without_rebuilding() {
    let mut stage = CompositorStage::preview(
        &solid(4, 4, [200, 200, 200, 255]),
        &plain_settings(),
        Canvas::new(4, 4).unwrap(),
    )
    .unwrap();
    let before_map = stage.stack().volume_map.clone();

    let tinted = RenderSettings {
        mockup_color: RgbColor::new(255, 0, 0),
        warp_strength: 25,
        ..plain_settings()
    };
    stage.update_settings(&tinted).unwrap();
    assert_eq!(stage.stack().background.pixel(1, 1), [200, 0, 0, 255]);
    assert_eq!(stage.stack().mockup.pixel(1, 1), [200, 200, 200, 255]);
    assert_eq!(stage.stack().volume_map, before_map);
    assert_eq!(stage.stack().displacement.strength, 25.0);
    assert_eq!(stage.settings().warp_strength, 25);

    stage.update_settings(&plain_settings()).unwrap();
    assert_eq!(stage.stack().background.pixel(1, 1), [200, 200, 200, 255]);
}

#[test]
fn transform_for_another_design_size_is_rejected() {
    let mockup = solid(20, 20, [255; 4]);
    let design = solid(4, 4, [255; 4]);
    let mut engine = TransformEngine::new();
    engine.reset_for_new_design(8, 8);
    let stage =
        CompositorStage::preview(&mockup, &plain_settings(), Canvas::new(20, 20).unwrap()).unwrap();
    assert!(
        stage
            .render(Some(DesignLayer {
                texture: &design,
                placement: &engine,
            }))
            .is_err()
    );
}
