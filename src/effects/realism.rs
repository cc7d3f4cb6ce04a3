//! Shadow, grain and highlight overlays re-derived from the mockup photo.

use crate::{
    effects::{
        blend::{BlendMode, composite_over},
        color_matrix::ColorMatrix,
    },
    foundation::error::MockupResult,
    render::surface::Surface,
};

/// Shadow layer alpha at `texture_strength = 100`.
///
/// The calibrated pair is 0.35 shadow / 0.4 highlight, which puts the highlight above the
/// shadow. Shadow and highlight share their combined 0.75 so the shadow never drops below
/// the highlight.
pub const SHADOW_MAX_ALPHA: f32 = 0.375;
/// Grain layer alpha at `texture_strength = 100`.
pub const GRAIN_MAX_ALPHA: f32 = 0.15;
/// Highlight layer alpha at `texture_strength = 100`. Capped at [`SHADOW_MAX_ALPHA`].
pub const HIGHLIGHT_MAX_ALPHA: f32 = 0.375;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RealismKind {
    Shadow,
    Grain,
    Highlight,
}

impl RealismKind {
    /// Z-order, bottom to top.
    pub const ALL: [Self; 3] = [Self::Shadow, Self::Grain, Self::Highlight];

    pub fn matrix(self) -> ColorMatrix {
        match self {
            // Crushed to black-or-white so multiply only darkens the creases.
            Self::Shadow => ColorMatrix::desaturate()
                .then(ColorMatrix::contrast(3.0))
                .then(ColorMatrix::brightness(3.0)),
            Self::Grain => ColorMatrix::desaturate().then(ColorMatrix::contrast(2.0)),
            Self::Highlight => ColorMatrix::contrast(2.0).then(ColorMatrix::brightness(0.6)),
        }
    }

    pub fn blend(self) -> BlendMode {
        match self {
            Self::Shadow => BlendMode::Multiply,
            Self::Grain => BlendMode::HardLight,
            Self::Highlight => BlendMode::Screen,
        }
    }

    pub fn max_alpha(self) -> f32 {
        match self {
            Self::Shadow => SHADOW_MAX_ALPHA,
            Self::Grain => GRAIN_MAX_ALPHA,
            Self::Highlight => HIGHLIGHT_MAX_ALPHA,
        }
    }

    /// Layer alpha for a `texture_strength` percentage.
    pub fn opacity(self, texture_strength: u8) -> f32 {
        self.max_alpha() * f32::from(texture_strength.min(100)) / 100.0
    }
}

#[derive(Clone, Debug)]
pub struct RealismLayer {
    pub kind: RealismKind,
    pub surface: Surface,
    pub opacity: f32,
    pub visible: bool,
}

/// The three overlay layers for one mockup at one resolution.
#[derive(Clone, Debug)]
pub struct RealismLayerStack {
    layers: Vec<RealismLayer>,
}

impl RealismLayerStack {
    /// Derive the overlays from a mockup already resampled to the stage size.
    pub fn build(mockup: &Surface, texture_strength: u8, show_overlay: bool) -> MockupResult<Self> {
        let mut layers = Vec::with_capacity(RealismKind::ALL.len());
        for kind in RealismKind::ALL {
            let mut surface = mockup.clone();
            kind.matrix().apply_in_place(&mut surface.data)?;
            layers.push(RealismLayer {
                kind,
                surface,
                opacity: kind.opacity(texture_strength),
                visible: show_overlay,
            });
        }
        Ok(Self { layers })
    }

    /// Re-derive opacity and visibility without touching pixels.
    pub fn update(&mut self, texture_strength: u8, show_overlay: bool) {
        for layer in &mut self.layers {
            layer.opacity = layer.kind.opacity(texture_strength);
            layer.visible = show_overlay;
        }
    }

    pub fn layers(&self) -> &[RealismLayer] {
        &self.layers
    }

    pub fn layer(&self, kind: RealismKind) -> Option<&RealismLayer> {
        self.layers.iter().find(|l| l.kind == kind)
    }

    /// Blend every visible layer onto `dst`, bottom to top.
    pub fn composite_onto(&self, dst: &mut Surface) -> MockupResult<()> {
        for layer in &self.layers {
            if !layer.visible || layer.opacity <= 0.0 {
                continue;
            }
            composite_over(
                &mut dst.data,
                &layer.surface.data,
                layer.opacity,
                layer.kind.blend(),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/realism.rs"]
mod tests;
