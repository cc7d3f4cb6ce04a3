use super::*;

fn canvas() -> Canvas {
    Canvas::new(1000, 1000).unwrap()
}

/// 100x100 design centered on a 1000x1000 canvas: on-screen rect is 300..700 on both axes.
fn setup() -> (InteractionController, TransformEngine) {
    let mut engine = TransformEngine::new();
    engine.reset_for_new_design(100, 100);
    (InteractionController::new(), engine)
}

fn down(pos: (f64, f64)) -> PointerEvent {
    PointerEvent::Down {
        pos: Point::new(pos.0, pos.1),
        modifiers: Modifiers::default(),
    }
}

fn shift_down(pos: (f64, f64)) -> PointerEvent {
    PointerEvent::Down {
        pos: Point::new(pos.0, pos.1),
        modifiers: Modifiers { shift: true },
    }
}

fn mv(pos: (f64, f64)) -> PointerEvent {
    PointerEvent::Move {
        pos: Point::new(pos.0, pos.1),
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn drag_moves_by_screen_delta_over_canvas() {
    let (mut c, mut e) = setup();
    c.handle(down((500.0, 500.0)), &mut e, canvas()).unwrap();
    assert!(c.is_selected());
    assert!(matches!(c.gesture(), Gesture::Drag { .. }));

    assert!(c.handle(mv((600.0, 450.0)), &mut e, canvas()).unwrap());
    assert!(close(e.transform().position.x, 0.6));
    assert!(close(e.transform().position.y, 0.45));
}

#[test]
fn drag_snaps_inside_threshold_and_raises_guides() {
    let (mut c, mut e) = setup();
    c.handle(down((500.0, 500.0)), &mut e, canvas()).unwrap();

    c.handle(mv((519.0, 481.0)), &mut e, canvas()).unwrap();
    assert_eq!(e.transform().position, Point::new(0.5, 0.5));
    assert_eq!(
        c.guides(),
        Guides {
            vertical: true,
            horizontal: true
        }
    );

    c.handle(mv((521.0, 500.0)), &mut e, canvas()).unwrap();
    assert!(close(e.transform().position.x, 0.521));
    assert!(!c.guides().vertical);
    assert!(c.guides().horizontal);

    c.handle(PointerEvent::Up, &mut e, canvas()).unwrap();
    assert_eq!(c.gesture(), Gesture::None);
    assert_eq!(c.guides(), Guides::default());
}

#[test]
fn drag_clamps_to_canvas() {
    let (mut c, mut e) = setup();
    c.handle(down((500.0, 500.0)), &mut e, canvas()).unwrap();
    c.handle(mv((5000.0, -5000.0)), &mut e, canvas()).unwrap();
    assert_eq!(e.transform().position, Point::new(1.0, 0.0));
}

#[test]
fn corner_drag_resizes_proportionally_to_center_distance() {
    let (mut c, mut e) = setup();
    c.handle(down((500.0, 500.0)), &mut e, canvas()).unwrap();
    c.handle(PointerEvent::Up, &mut e, canvas()).unwrap();

    c.handle(down((705.0, 705.0)), &mut e, canvas()).unwrap();
    assert!(matches!(c.gesture(), Gesture::Resize { .. }));
    c.handle(mv((605.0, 605.0)), &mut e, canvas()).unwrap();
    let expected = (100.0_f64 * 105.0 / 205.0).round();
    assert!(close(e.transform().scale_percent(), expected));

    c.handle(mv((5000.0, 5000.0)), &mut e, canvas()).unwrap();
    assert!(close(e.transform().scale_percent(), 200.0));
}

#[test]
fn shift_drag_rotates_around_center() {
    let (mut c, mut e) = setup();
    c.handle(shift_down((600.0, 500.0)), &mut e, canvas()).unwrap();
    assert!(matches!(c.gesture(), Gesture::Rotate { .. }));
    c.handle(mv((500.0, 600.0)), &mut e, canvas()).unwrap();
    assert!(close(e.transform().rotation, std::f64::consts::FRAC_PI_2));
}

#[test]
fn click_outside_deselects_and_leaves_crop_mode() {
    let (mut c, mut e) = setup();
    c.handle(PointerEvent::DoubleClick, &mut e, canvas()).unwrap();
    assert!(c.is_cropping());
    c.handle(down((50.0, 50.0)), &mut e, canvas()).unwrap();
    assert!(!c.is_selected());
    assert!(!c.is_cropping());
    assert_eq!(c.gesture(), Gesture::None);
    assert!(c.handles(&e, canvas()).unwrap().is_none());
}

#[test]
fn double_click_enters_crop_mode_with_full_crop() {
    let (mut c, mut e) = setup();
    assert!(c.handle(PointerEvent::DoubleClick, &mut e, canvas()).unwrap());
    assert!(c.is_cropping() && c.is_selected());
    assert_eq!(e.crop(), Some(CropRect::full(100, 100)));

    // leaving keeps the crop
    assert!(!c.handle(PointerEvent::DoubleClick, &mut e, canvas()).unwrap());
    assert!(!c.is_cropping());
    assert!(e.crop().is_some());
}

#[test]
fn crop_corner_drag_converts_screen_delta_to_design_pixels() {
    let (mut c, mut e) = setup();
    c.handle(PointerEvent::DoubleClick, &mut e, canvas()).unwrap();

    c.handle(down((301.0, 301.0)), &mut e, canvas()).unwrap();
    assert!(matches!(
        c.gesture(),
        Gesture::CropResize {
            corner: Corner::TopLeft,
            ..
        }
    ));
    c.handle(mv((341.0, 381.0)), &mut e, canvas()).unwrap();
    let crop = e.crop().unwrap();
    assert!(close(crop.x, 10.0) && close(crop.y, 20.0));
    assert!(close(crop.width, 90.0) && close(crop.height, 80.0));

    // handles follow the crop
    let corners = c.handles(&e, canvas()).unwrap().unwrap();
    assert!(close(corners[0].x, 340.0) && close(corners[0].y, 380.0));
}

#[test]
fn crop_resize_undoes_rotation_and_floors_size() {
    let (mut c, mut e) = setup();
    e.set_rotation_degrees(90.0);
    c.handle(PointerEvent::DoubleClick, &mut e, canvas()).unwrap();

    // With a quarter turn the top-left corner sits at the top-right of the screen.
    c.handle(down((700.0, 300.0)), &mut e, canvas()).unwrap();
    c.handle(mv((700.0, 340.0)), &mut e, canvas()).unwrap();
    let crop = e.crop().unwrap();
    assert!((crop.x - 10.0).abs() < 1e-6);
    assert!(crop.y.abs() < 1e-6);
    assert!((crop.width - 90.0).abs() < 1e-6);

    c.handle(mv((700.0, 5000.0)), &mut e, canvas()).unwrap();
    assert!(close(e.crop().unwrap().width, 10.0));
}

#[test]
fn events_without_design_are_ignored() {
    let mut c = InteractionController::new();
    let mut e = TransformEngine::new();
    assert!(!c.handle(down((1.0, 1.0)), &mut e, canvas()).unwrap());
    assert!(!c.handle(PointerEvent::DoubleClick, &mut e, canvas()).unwrap());
    assert_eq!(c.gesture(), Gesture::None);
}

#[test]
fn snap_is_strict_at_threshold_edge() {
    assert_eq!(snap_to_center(0.5 + SNAP_THRESHOLD * 0.99), (0.5, true));
    let (v, snapped) = snap_to_center(0.5 + SNAP_THRESHOLD * 1.01);
    assert!(!snapped);
    assert!(v > 0.52);
}
