use serde::{Deserialize, Serialize};

use crate::foundation::{
    core::{Affine, Canvas, Point, Rect, Vec2},
    error::{MockupError, MockupResult},
};

/// Base design width as a fraction of the canvas width, before `scale`.
pub const BASE_FIT_FRACTION: f64 = 0.40;
pub const MIN_SCALE_PERCENT: f64 = 10.0;
pub const MAX_SCALE_PERCENT: f64 = 200.0;
/// Scale step (percentage points) per wheel notch.
pub const WHEEL_ZOOM_STEP_PERCENT: f64 = 5.0;
/// Smallest crop edge in design pixels.
pub const MIN_CROP_SIZE: f64 = 10.0;

/// Resolution-independent placement of the design on the mockup.
///
/// `position` is normalized to the canvas, `scale` multiplies the base fit width, `rotation`
/// is in radians around the design's own center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub position: Point,
    pub scale: f64,
    pub rotation: f64,
    pub opacity: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Point::new(0.5, 0.5),
            scale: 1.0,
            rotation: 0.0,
            opacity: 1.0,
        }
    }
}

impl Transform {
    /// Scale as an integer-ish percentage (`1.0` is `100`).
    pub fn scale_percent(&self) -> f64 {
        self.scale * 100.0
    }
}

/// Crop rectangle in design pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    /// Build a crop, flooring width and height at [`MIN_CROP_SIZE`].
    ///
    /// The origin is not clamped: a crop that leaves the design renders a partial or empty
    /// mask.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(MIN_CROP_SIZE),
            height: height.max(MIN_CROP_SIZE),
        }
    }

    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, f64::from(width), f64::from(height))
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// Canvas-space placement derived from a [`Transform`] for one canvas size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteGeometry {
    pub center: Point,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    /// Source texture size the local space is expressed in.
    pub texture_width: f64,
    pub texture_height: f64,
}

impl SpriteGeometry {
    /// Canvas pixels per texture pixel along each local axis.
    pub fn texture_scale(&self) -> Vec2 {
        Vec2::new(
            self.width / self.texture_width,
            self.height / self.texture_height,
        )
    }

    /// Maps texture pixel coordinates to canvas pixels, pivoting at the texture center.
    pub fn local_to_canvas(&self) -> Affine {
        let s = self.texture_scale();
        Affine::translate(self.center.to_vec2())
            * Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(s.x, s.y)
            * Affine::translate((-self.texture_width / 2.0, -self.texture_height / 2.0))
    }

    pub fn canvas_to_local(&self) -> Affine {
        self.local_to_canvas().inverse()
    }

    /// Canvas positions of the corners of a texture-space rect: tl, tr, br, bl.
    pub fn corners_of(&self, local: Rect) -> [Point; 4] {
        let m = self.local_to_canvas();
        [
            m * Point::new(local.x0, local.y0),
            m * Point::new(local.x1, local.y0),
            m * Point::new(local.x1, local.y1),
            m * Point::new(local.x0, local.y1),
        ]
    }

    /// Axis-aligned canvas bounds of the whole (uncropped) sprite.
    pub fn bounds(&self) -> Rect {
        let corners = self.corners_of(Rect::new(
            0.0,
            0.0,
            self.texture_width,
            self.texture_height,
        ));
        let mut r = Rect::from_points(corners[0], corners[1]);
        for p in &corners[2..] {
            r = r.union_pt(*p);
        }
        r
    }
}

/// Source of truth for where the design sits, independent of any canvas resolution.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformEngine {
    transform: Transform,
    design_size: Option<(u32, u32)>,
    crop: Option<CropRect>,
}

impl TransformEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Replace the whole placement, clamping every field into range.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.set_position(transform.position.x, transform.position.y);
        self.set_scale_percent(transform.scale_percent());
        self.set_opacity(transform.opacity);
    }

    pub fn design_size(&self) -> Option<(u32, u32)> {
        self.design_size
    }

    /// A different design was loaded: back to the default placement, crop cleared.
    pub fn reset_for_new_design(&mut self, width: u32, height: u32) {
        let opacity = self.transform.opacity;
        self.transform = Transform {
            opacity,
            ..Transform::default()
        };
        self.crop = None;
        self.design_size = Some((width, height));
    }

    /// The same design was re-applied: placement and crop are kept.
    pub fn reapply_design(&mut self, width: u32, height: u32) {
        self.design_size = Some((width, height));
    }

    pub fn clear_design(&mut self) {
        self.design_size = None;
        self.crop = None;
    }

    fn require_design(&self) -> MockupResult<(u32, u32)> {
        match self.design_size {
            Some((w, h)) if w > 0 && h > 0 => Ok((w, h)),
            Some(_) => Err(MockupError::validation("design has zero dimension")),
            None => Err(MockupError::validation("no design loaded")),
        }
    }

    /// Design size at scale 1.0 on `canvas`: 40% of the canvas width, aspect preserved.
    pub fn base_size(&self, canvas: Canvas) -> MockupResult<(f64, f64)> {
        let (w, h) = self.require_design()?;
        let aspect = f64::from(w) / f64::from(h);
        let base_w = canvas.width_f64() * BASE_FIT_FRACTION;
        Ok((base_w, base_w / aspect))
    }

    /// Resolve the placement against a concrete canvas.
    ///
    /// Pure: calling it twice, or at a different resolution and scaling back, yields the same
    /// geometry.
    pub fn apply_transform(&self, canvas: Canvas) -> MockupResult<SpriteGeometry> {
        let (tw, th) = self.require_design()?;
        let (base_w, base_h) = self.base_size(canvas)?;
        let t = &self.transform;
        Ok(SpriteGeometry {
            center: Point::new(
                canvas.width_f64() * t.position.x,
                canvas.height_f64() * t.position.y,
            ),
            width: base_w * t.scale,
            height: base_h * t.scale,
            rotation: t.rotation,
            texture_width: f64::from(tw),
            texture_height: f64::from(th),
        })
    }

    pub fn set_crop(&mut self, rect: CropRect) {
        self.crop = Some(CropRect::new(rect.x, rect.y, rect.width, rect.height));
    }

    pub fn clear_crop(&mut self) {
        self.crop = None;
    }

    pub fn crop(&self) -> Option<CropRect> {
        self.crop
    }

    /// Visible region in design pixel space: the crop, or the full design.
    pub fn mask_bounds(&self) -> Option<Rect> {
        match (self.crop, self.design_size) {
            (Some(c), _) => Some(c.to_rect()),
            (None, Some((w, h))) => Some(CropRect::full(w, h).to_rect()),
            (None, None) => None,
        }
    }

    pub fn set_scale_percent(&mut self, percent: f64) {
        let p = if percent.is_finite() { percent } else { 100.0 };
        self.transform.scale = p.clamp(MIN_SCALE_PERCENT, MAX_SCALE_PERCENT) / 100.0;
    }

    /// Wheel zoom: scrolling down (`delta_y > 0`) shrinks, up grows, one step per event.
    pub fn zoom_by_wheel(&mut self, delta_y: f64) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        let step = if delta_y > 0.0 {
            -WHEEL_ZOOM_STEP_PERCENT
        } else {
            WHEEL_ZOOM_STEP_PERCENT
        };
        let current = self.transform.scale_percent().round();
        self.set_scale_percent(current + step);
    }

    pub fn set_rotation(&mut self, radians: f64) {
        if radians.is_finite() {
            self.transform.rotation = radians;
        }
    }

    pub fn set_rotation_degrees(&mut self, degrees: f64) {
        self.set_rotation(degrees.to_radians());
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        let o = if opacity.is_finite() { opacity } else { 1.0 };
        self.transform.opacity = o.clamp(0.0, 1.0);
    }

    /// Set the normalized position, clamped to the canvas on both axes.
    pub fn set_position(&mut self, x: f64, y: f64) {
        let clamp = |v: f64, prev: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { prev };
        self.transform.position = Point::new(
            clamp(x, self.transform.position.x),
            clamp(y, self.transform.position.y),
        );
    }

    /// Move by whole pixels of `canvas` (keyboard arrows use the full-resolution mockup).
    pub fn nudge(&mut self, dx_px: i32, dy_px: i32, canvas: Canvas) {
        let p = self.transform.position;
        self.set_position(
            p.x + f64::from(dx_px) / canvas.width_f64(),
            p.y + f64::from(dy_px) / canvas.height_f64(),
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/engine.rs"]
mod tests;
