//! Pointer state machine for moving, rotating, resizing and cropping the design on the preview.

use crate::{
    foundation::{
        core::{Canvas, Point, Vec2},
        error::MockupResult,
    },
    transform::{CropRect, TransformEngine},
};

/// Grab radius around a corner handle, in screen pixels (independent of zoom).
pub const HANDLE_HIT_RADIUS: f64 = 20.0;
/// Normalized distance from the canvas center at which an axis snaps to 0.5.
pub const SNAP_THRESHOLD: f64 = 0.02;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
}

/// Pointer input in preview-canvas pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down { pos: Point, modifiers: Modifiers },
    Move { pos: Point },
    Up,
    Leave,
    DoubleClick,
}

/// Corners in the order they are reported by [`InteractionController::handles`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomRight,
        Self::BottomLeft,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    None,
    Drag {
        start: Point,
        start_position: Point,
    },
    Rotate {
        start_angle: f64,
        start_rotation: f64,
    },
    Resize {
        start: Point,
        start_percent: f64,
    },
    CropResize {
        start: Point,
        initial: CropRect,
        corner: Corner,
    },
}

/// Center lines shown while a drag is snapped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Guides {
    /// Vertical line at `x = 0.5`.
    pub vertical: bool,
    /// Horizontal line at `y = 0.5`.
    pub horizontal: bool,
}

#[derive(Clone, Debug)]
pub struct InteractionController {
    gesture: Gesture,
    selected: bool,
    cropping: bool,
    guides: Guides,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            gesture: Gesture::None,
            selected: false,
            cropping: false,
            guides: Guides::default(),
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_cropping(&self) -> bool {
        self.cropping
    }

    pub fn guides(&self) -> Guides {
        self.guides
    }

    /// A new design was loaded: it starts selected, outside crop mode.
    pub fn select_new_design(&mut self) {
        self.gesture = Gesture::None;
        self.selected = true;
        self.cropping = false;
        self.guides = Guides::default();
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feed one pointer event. Returns whether the placement (transform or crop) changed.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        engine: &mut TransformEngine,
        canvas: Canvas,
    ) -> MockupResult<bool> {
        if engine.design_size().is_none() {
            self.gesture = Gesture::None;
            return Ok(false);
        }
        match event {
            PointerEvent::Down { pos, modifiers } => {
                self.pointer_down(pos, modifiers, engine, canvas)?;
                Ok(false)
            }
            PointerEvent::Move { pos } => self.pointer_move(pos, engine, canvas),
            PointerEvent::Up | PointerEvent::Leave => {
                self.gesture = Gesture::None;
                self.guides = Guides::default();
                Ok(false)
            }
            PointerEvent::DoubleClick => Ok(self.toggle_crop_mode(engine)),
        }
    }

    /// Enter or leave crop mode. Entering selects the design and initializes the crop to the
    /// full design when none is set. Returns whether the crop changed.
    pub fn toggle_crop_mode(&mut self, engine: &mut TransformEngine) -> bool {
        self.cropping = !self.cropping;
        if !self.cropping {
            return false;
        }
        self.selected = true;
        match (engine.crop(), engine.design_size()) {
            (None, Some((w, h))) => {
                engine.set_crop(CropRect::full(w, h));
                true
            }
            _ => false,
        }
    }

    /// On-screen corners of the active frame (crop rect in crop mode, else the visible
    /// rect), or `None` when nothing is selected.
    pub fn handles(
        &self,
        engine: &TransformEngine,
        canvas: Canvas,
    ) -> MockupResult<Option<[Point; 4]>> {
        if !self.selected && !self.cropping {
            return Ok(None);
        }
        let Some(visible) = engine.mask_bounds() else {
            return Ok(None);
        };
        let geometry = engine.apply_transform(canvas)?;
        Ok(Some(geometry.corners_of(visible)))
    }

    fn pointer_down(
        &mut self,
        pos: Point,
        modifiers: Modifiers,
        engine: &mut TransformEngine,
        canvas: Canvas,
    ) -> MockupResult<()> {
        if let Some(corners) = self.handles(engine, canvas)? {
            if let Some(corner) = hit_corner(&corners, pos) {
                if self.cropping {
                    if let Some(initial) = engine.crop() {
                        self.gesture = Gesture::CropResize {
                            start: pos,
                            initial,
                            corner,
                        };
                        return Ok(());
                    }
                } else {
                    self.gesture = Gesture::Resize {
                        start: pos,
                        start_percent: engine.transform().scale_percent(),
                    };
                    return Ok(());
                }
            }
        }

        let geometry = engine.apply_transform(canvas)?;
        let bounds = geometry.bounds();
        let hit = pos.x >= bounds.x0 && pos.x <= bounds.x1 && pos.y >= bounds.y0 && pos.y <= bounds.y1;
        if !hit {
            self.selected = false;
            self.cropping = false;
            self.gesture = Gesture::None;
            return Ok(());
        }

        self.selected = true;
        self.gesture = if modifiers.shift && !self.cropping {
            Gesture::Rotate {
                start_angle: angle_from(geometry.center, pos),
                start_rotation: engine.transform().rotation,
            }
        } else {
            Gesture::Drag {
                start: pos,
                start_position: engine.transform().position,
            }
        };
        Ok(())
    }

    fn pointer_move(
        &mut self,
        pos: Point,
        engine: &mut TransformEngine,
        canvas: Canvas,
    ) -> MockupResult<bool> {
        match self.gesture {
            Gesture::None => Ok(false),
            Gesture::Drag {
                start,
                start_position,
            } => {
                let delta = pos - start;
                let (x, snap_x) = snap_to_center(start_position.x + delta.x / canvas.width_f64());
                let (y, snap_y) = snap_to_center(start_position.y + delta.y / canvas.height_f64());
                self.guides = Guides {
                    vertical: snap_x,
                    horizontal: snap_y,
                };
                engine.set_position(x, y);
                Ok(true)
            }
            Gesture::Rotate {
                start_angle,
                start_rotation,
            } => {
                let center = engine.apply_transform(canvas)?.center;
                engine.set_rotation(start_rotation + angle_from(center, pos) - start_angle);
                Ok(true)
            }
            Gesture::Resize {
                start,
                start_percent,
            } => {
                let center = engine.apply_transform(canvas)?.center;
                let start_dist = (start - center).hypot();
                if start_dist <= f64::EPSILON {
                    return Ok(false);
                }
                let factor = (pos - center).hypot() / start_dist;
                let percent = (start_percent * factor).clamp(
                    crate::transform::engine::MIN_SCALE_PERCENT,
                    crate::transform::engine::MAX_SCALE_PERCENT,
                );
                engine.set_scale_percent(percent.round());
                Ok(true)
            }
            Gesture::CropResize {
                start,
                initial,
                corner,
            } => {
                let geometry = engine.apply_transform(canvas)?;
                let local = screen_delta_to_local(pos - start, geometry.rotation, geometry.texture_scale());
                engine.set_crop(resize_crop(initial, corner, local));
                Ok(true)
            }
        }
    }
}

fn hit_corner(corners: &[Point; 4], pos: Point) -> Option<Corner> {
    corners
        .iter()
        .zip(Corner::ALL)
        .find(|(p, _)| (pos - **p).hypot2() < HANDLE_HIT_RADIUS * HANDLE_HIT_RADIUS)
        .map(|(_, corner)| corner)
}

fn angle_from(center: Point, pos: Point) -> f64 {
    let d = pos - center;
    d.y.atan2(d.x)
}

/// Snap a normalized coordinate to the center when within [`SNAP_THRESHOLD`].
pub fn snap_to_center(v: f64) -> (f64, bool) {
    if (v - 0.5).abs() < SNAP_THRESHOLD {
        (0.5, true)
    } else {
        (v, false)
    }
}

/// Undo the sprite rotation and per-axis texture scale on a screen-space delta.
fn screen_delta_to_local(delta: Vec2, rotation: f64, texture_scale: Vec2) -> Vec2 {
    let (sin, cos) = (-rotation).sin_cos();
    let rx = delta.x * cos - delta.y * sin;
    let ry = delta.x * sin + delta.y * cos;
    let sx = if texture_scale.x != 0.0 { texture_scale.x } else { 1.0 };
    let sy = if texture_scale.y != 0.0 { texture_scale.y } else { 1.0 };
    Vec2::new(rx / sx, ry / sy)
}

fn resize_crop(initial: CropRect, corner: Corner, d: Vec2) -> CropRect {
    let CropRect {
        mut x,
        mut y,
        mut width,
        mut height,
    } = initial;
    match corner {
        Corner::TopLeft => {
            x += d.x;
            y += d.y;
            width -= d.x;
            height -= d.y;
        }
        Corner::TopRight => {
            y += d.y;
            width += d.x;
            height -= d.y;
        }
        Corner::BottomRight => {
            width += d.x;
            height += d.y;
        }
        Corner::BottomLeft => {
            x += d.x;
            width -= d.x;
            height += d.y;
        }
    }
    CropRect::new(x, y, width, height)
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/controller.rs"]
mod tests;
