//! 4x5 color matrices applied to premultiplied RGBA8 buffers.
//!
//! Rows are r, g, b, a; columns are r, g, b, a and a constant offset in normalized `0..1`
//! units. Matrices compose with [`ColorMatrix::then`] without intermediate clamping, so a
//! chain like `desaturate -> contrast -> brightness` behaves like a single filter.

use crate::foundation::error::{MockupError, MockupResult};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMatrix(pub [f32; 20]);

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl ColorMatrix {
    pub const fn identity() -> Self {
        Self([
            1.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0, //
        ])
    }

    /// Replace every color channel with the channel average.
    pub fn desaturate() -> Self {
        let t = 1.0 / 3.0;
        Self([
            t, t, t, 0.0, 0.0, //
            t, t, t, 0.0, 0.0, //
            t, t, t, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0, //
        ])
    }

    /// Stretch color channels around mid-grey. `amount = 0` is identity.
    pub fn contrast(amount: f32) -> Self {
        let v = amount + 1.0;
        let o = -0.5 * (v - 1.0);
        Self([
            v, 0.0, 0.0, 0.0, o, //
            0.0, v, 0.0, 0.0, o, //
            0.0, 0.0, v, 0.0, o, //
            0.0, 0.0, 0.0, 1.0, 0.0, //
        ])
    }

    /// Scale color channels. `b = 1` is identity.
    pub fn brightness(b: f32) -> Self {
        Self([
            b, 0.0, 0.0, 0.0, 0.0, //
            0.0, b, 0.0, 0.0, 0.0, //
            0.0, 0.0, b, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0, //
        ])
    }

    /// Compose: the result applies `self` first, then `next`.
    pub fn then(self, next: Self) -> Self {
        let a = &self.0;
        let b = &next.0;
        let mut out = [0.0f32; 20];
        for row in 0..4 {
            for col in 0..5 {
                let mut acc = 0.0;
                for k in 0..4 {
                    acc += b[row * 5 + k] * a[k * 5 + col];
                }
                if col == 4 {
                    acc += b[row * 5 + 4];
                }
                out[row * 5 + col] = acc;
            }
        }
        Self(out)
    }

    /// Apply to one straight-alpha pixel in `0..1`, clamping the result.
    pub fn apply_straight(&self, px: [f32; 4]) -> [f32; 4] {
        let m = &self.0;
        let [r, g, b, a] = px;
        let mut out = [0.0f32; 4];
        for (row, o) in out.iter_mut().enumerate() {
            let i = row * 5;
            *o = (m[i] * r + m[i + 1] * g + m[i + 2] * b + m[i + 3] * a + m[i + 4]).clamp(0.0, 1.0);
        }
        out
    }

    /// Apply to premultiplied RGBA8 pixels.
    pub fn apply_rgba8_premul(&self, src: &[u8], dst: &mut [u8]) -> MockupResult<()> {
        if src.len() != dst.len() || !src.len().is_multiple_of(4) {
            return Err(MockupError::render(
                "color matrix expects equal-length rgba8 buffers",
            ));
        }
        for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
            let pa = s[3] as f32 / 255.0;

            // premul -> straight
            let inv_a = if pa > 0.0 { 1.0 / pa } else { 0.0 };
            let straight = [
                s[0] as f32 / 255.0 * inv_a,
                s[1] as f32 / 255.0 * inv_a,
                s[2] as f32 / 255.0 * inv_a,
                pa,
            ];
            let [r, g, b, a] = self.apply_straight(straight);

            // straight -> premul
            d[0] = to_u8(r * a);
            d[1] = to_u8(g * a);
            d[2] = to_u8(b * a);
            d[3] = to_u8(a);
        }
        Ok(())
    }

    pub fn apply_in_place(&self, buf: &mut [u8]) -> MockupResult<()> {
        let src = buf.to_vec();
        self.apply_rgba8_premul(&src, buf)
    }
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/color_matrix.rs"]
mod tests;
