use crate::foundation::error::{MockupError, MockupResult};

/// How samples beyond the plane border are addressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeMode {
    /// Repeat the nearest border sample.
    Clamp,
    /// Tile the plane (repeat addressing).
    Wrap,
}

/// Number of box passes used to approximate a Gaussian.
const BOX_PASSES: usize = 3;

/// Gaussian blur of a single-channel 8-bit plane.
///
/// Implemented as three successive box blurs per axis, which keeps the cost independent of
/// `sigma` (large radii are the common case for volume maps) and has no ringing.
pub fn gaussian_blur_gray(
    src: &[u8],
    width: u32,
    height: u32,
    sigma: f32,
    edge: EdgeMode,
) -> MockupResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| MockupError::render("blur plane size overflow"))?;
    if src.len() != expected_len {
        return Err(MockupError::render(
            "gaussian_blur_gray expects src matching width*height",
        ));
    }
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(MockupError::validation("blur sigma must be finite and >= 0"));
    }
    if sigma < 0.5 || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let radii = box_radii_for_gaussian(sigma, BOX_PASSES);
    let mut a: Vec<u16> = src.iter().map(|&v| u16::from(v) << 8).collect();
    let mut b = vec![0u16; expected_len];

    for &r in &radii {
        box_pass_horizontal(&a, &mut b, width as usize, height as usize, r, edge);
        box_pass_vertical(&b, &mut a, width as usize, height as usize, r, edge);
    }

    Ok(a.iter().map(|&v| ((u32::from(v) + 128) >> 8).min(255) as u8).collect())
}

/// Box radii whose successive application approximates a Gaussian of `sigma`.
fn box_radii_for_gaussian(sigma: f32, passes: usize) -> Vec<usize> {
    let n = passes as f32;
    let w_ideal = ((12.0 * sigma * sigma / n) + 1.0).sqrt();
    let mut wl = w_ideal.floor() as i64;
    if wl % 2 == 0 {
        wl -= 1;
    }
    let wl = wl.max(1);
    let wu = wl + 2;
    let wl_f = wl as f32;
    let m_ideal = (12.0 * sigma * sigma - n * wl_f * wl_f - 4.0 * n * wl_f - 3.0 * n)
        / (-4.0 * wl_f - 4.0);
    let m = m_ideal.round().max(0.0) as usize;

    (0..passes)
        .map(|i| {
            let w = if i < m { wl } else { wu };
            ((w - 1) / 2) as usize
        })
        .collect()
}

fn edge_index(i: i64, len: usize, edge: EdgeMode) -> usize {
    let len_i = len as i64;
    match edge {
        EdgeMode::Clamp => i.clamp(0, len_i - 1) as usize,
        EdgeMode::Wrap => i.rem_euclid(len_i) as usize,
    }
}

fn box_pass_horizontal(
    src: &[u16],
    dst: &mut [u16],
    width: usize,
    height: usize,
    radius: usize,
    edge: EdgeMode,
) {
    if radius == 0 {
        dst.copy_from_slice(src);
        return;
    }
    let r = radius as i64;
    let span = (2 * radius + 1) as u64;
    for y in 0..height {
        let row = &src[y * width..(y + 1) * width];
        let out = &mut dst[y * width..(y + 1) * width];
        let mut acc: u64 = (-r..=r)
            .map(|dx| u64::from(row[edge_index(dx, width, edge)]))
            .sum();
        for (x, o) in out.iter_mut().enumerate() {
            *o = ((acc + span / 2) / span) as u16;
            let x = x as i64;
            let add = row[edge_index(x + r + 1, width, edge)];
            let sub = row[edge_index(x - r, width, edge)];
            acc = acc + u64::from(add) - u64::from(sub);
        }
    }
}

fn box_pass_vertical(
    src: &[u16],
    dst: &mut [u16],
    width: usize,
    height: usize,
    radius: usize,
    edge: EdgeMode,
) {
    if radius == 0 {
        dst.copy_from_slice(src);
        return;
    }
    let r = radius as i64;
    let span = (2 * radius + 1) as u64;
    for x in 0..width {
        let at = |y: i64| u64::from(src[edge_index(y, height, edge) * width + x]);
        let mut acc: u64 = (-r..=r).map(at).sum();
        for y in 0..height {
            dst[y * width + x] = ((acc + span / 2) / span) as u16;
            let yi = y as i64;
            acc = acc + at(yi + r + 1) - at(yi - r);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
